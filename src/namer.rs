use crate::scanner::{NodeKind, ScannedElement};
use serde::Serialize;
use std::collections::HashMap;

/// A scanned element together with the CSS class name generated for it.
///
/// Nodes are only built by [`SemanticNamer`], so the name is fixed before any
/// resolution or rewriting happens and cannot change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementNode {
    kind: NodeKind,
    tag_name: String,
    raw_classes: String,
    source_line: usize,
    semantic_name: String,
}

impl ElementNode {
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn raw_classes(&self) -> &str {
        &self.raw_classes
    }

    pub fn source_line(&self) -> usize {
        self.source_line
    }

    pub fn semantic_name(&self) -> &str {
        &self.semantic_name
    }

    /// Class tokens of this node, empty tokens dropped
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.raw_classes.split_whitespace()
    }
}

/// Assigns semantic names to scanned elements.
///
/// Components are named after their (last) tag segment, lowercased and with
/// `-` mapped to `_` so the name stays a valid member access
/// (`<Ui.Foo-Bar>` becomes `foo_bar`). Plain elements get `{prefix}{n}` from
/// a counter owned by this namer. Two components whose
/// names lowercase to the same text share one name unless disambiguation is
/// switched on, in which case later ones get a `_2`, `_3`, ... suffix.
#[derive(Debug)]
pub struct SemanticNamer {
    prefix: String,
    plain_counter: usize,
    disambiguate: bool,
    component_uses: HashMap<String, usize>,
}

impl SemanticNamer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            plain_counter: 0,
            disambiguate: false,
            component_uses: HashMap::new(),
        }
    }

    pub fn with_disambiguation(mut self, enabled: bool) -> Self {
        self.disambiguate = enabled;
        self
    }

    /// Name every element, in order
    pub fn name_all(mut self, elements: Vec<ScannedElement>) -> Vec<ElementNode> {
        elements.into_iter().map(|element| self.name(element)).collect()
    }

    fn name(&mut self, element: ScannedElement) -> ElementNode {
        let semantic_name = match element.kind {
            NodeKind::Component => self.component_name(&element.tag_name),
            NodeKind::PlainElement => {
                let name = format!("{}{}", self.prefix, self.plain_counter);
                self.plain_counter += 1;
                name
            }
        };

        ElementNode {
            kind: element.kind,
            tag_name: element.tag_name,
            raw_classes: element.raw_classes,
            source_line: element.source_line,
            semantic_name,
        }
    }

    fn component_name(&mut self, tag_name: &str) -> String {
        let base = tag_name
            .rsplit('.')
            .next()
            .unwrap_or(tag_name)
            .to_lowercase()
            .replace('-', "_");

        if !self.disambiguate {
            return base;
        }

        let uses = self.component_uses.entry(base.clone()).or_insert(0);
        *uses += 1;
        if *uses == 1 {
            base
        } else {
            format!("{}_{}", base, uses)
        }
    }
}

impl Default for SemanticNamer {
    fn default() -> Self {
        Self::new("node")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan_elements;

    const CHECKBOX: &str = r#"
<Checkbox.Root>
  <div class="flex items-center gap-2">
    <Checkbox.Trigger class="size-[25px] rounded-lg">
      <Checkbox.Indicator class="justify-center items-center">
      </Checkbox.Indicator>
    </Checkbox.Trigger>
    <label class="text-sm">x</label>
  </div>
</Checkbox.Root>
"#;

    fn names(nodes: &[ElementNode]) -> Vec<&str> {
        nodes.iter().map(ElementNode::semantic_name).collect()
    }

    #[test]
    fn test_namespaced_components_use_last_segment() {
        let nodes = SemanticNamer::default().name_all(scan_elements(CHECKBOX));
        assert_eq!(names(&nodes), vec!["node0", "trigger", "indicator", "node1"]);
    }

    #[test]
    fn test_hyphenated_component_names() {
        let source = r#"<Foo-Bar class="p-2"></Foo-Bar><Ui.Icon-Button class="p-1"></Ui.Icon-Button>"#;
        let nodes = SemanticNamer::default().name_all(scan_elements(source));
        assert_eq!(names(&nodes), vec!["foo_bar", "icon_button"]);
    }

    #[test]
    fn test_naming_is_deterministic() {
        let first = SemanticNamer::default().name_all(scan_elements(CHECKBOX));
        let second = SemanticNamer::default().name_all(scan_elements(CHECKBOX));
        assert_eq!(first, second);
    }

    #[test]
    fn test_plain_elements_never_share_a_name() {
        let source = r#"<div class="a"></div><div class="a"></div><p class="b"></p>"#;
        let nodes = SemanticNamer::default().name_all(scan_elements(source));
        assert_eq!(names(&nodes), vec!["node0", "node1", "node2"]);
    }

    #[test]
    fn test_component_names_collide() {
        let source = r#"
<Button class="p-2"></Button>
<Button class="p-4"></Button>
<Radio.Indicator class="flex"></Radio.Indicator>
<Checkbox.INDICATOR class="block"></Checkbox.INDICATOR>
"#;
        let nodes = SemanticNamer::default().name_all(scan_elements(source));
        assert_eq!(names(&nodes), vec!["button", "button", "indicator", "indicator"]);
    }

    #[test]
    fn test_opt_in_disambiguation() {
        let source = r#"
<Button class="p-2"></Button>
<Button class="p-4"></Button>
<Radio.Indicator class="flex"></Radio.Indicator>
<Checkbox.Indicator class="block"></Checkbox.Indicator>
<div class="m-1"></div>
"#;
        let nodes = SemanticNamer::default()
            .with_disambiguation(true)
            .name_all(scan_elements(source));
        assert_eq!(
            names(&nodes),
            vec!["button", "button_2", "indicator", "indicator_2", "node0"]
        );
    }

    #[test]
    fn test_custom_prefix_and_fresh_counter() {
        let source = r#"<span class="a"></span><span class="b"></span>"#;
        let nodes = SemanticNamer::new("el").name_all(scan_elements(source));
        assert_eq!(names(&nodes), vec!["el0", "el1"]);

        // A new namer starts counting from zero again
        let again = SemanticNamer::new("el").name_all(scan_elements(source));
        assert_eq!(again[0].semantic_name(), "el0");
    }

    #[test]
    fn test_node_fields_carried_over() {
        let nodes = SemanticNamer::default().name_all(scan_elements(CHECKBOX));
        let trigger = &nodes[1];
        assert_eq!(trigger.kind(), NodeKind::Component);
        assert_eq!(trigger.tag_name(), "Checkbox.Trigger");
        assert_eq!(trigger.source_line(), 4);
        assert_eq!(trigger.tokens().collect::<Vec<_>>(), vec!["size-[25px]", "rounded-lg"]);
    }
}
