use crate::namer::ElementNode;
use crate::scanner::{line_at, normalize_classes};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::OnceLock;

/// Kind of edit made to the markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeKind {
    ImportAdded,
    ClassReplacement,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::ImportAdded => "import-added",
            ChangeKind::ClassReplacement => "class-replacement",
        }
    }
}

/// One edit made by the rewriter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub kind: ChangeKind,
    /// Line of the import in the rewritten text, or of the element's opening
    /// tag in the original text
    pub line: usize,
    pub original: String,
    pub modified: String,
    /// Class tokens that were replaced; empty for the import
    pub css_class: String,
    pub semantic_name: String,
}

/// How the generated stylesheet is brought into the component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleImport {
    /// Identifier the module is bound to, e.g. `styles`
    pub binding: String,
    /// Module specifier, e.g. `./button.module.css`
    pub specifier: String,
}

impl StyleImport {
    pub fn new(binding: impl Into<String>, specifier: impl Into<String>) -> Self {
        Self { binding: binding.into(), specifier: specifier.into() }
    }

    pub fn statement(&self) -> String {
        format!("import {} from '{}';", self.binding, self.specifier)
    }
}

/// Rewritten markup and the edits that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenMarkup {
    pub content: String,
    pub changes: Vec<ChangeRecord>,
}

struct Edit {
    range: Range<usize>,
    replacement: String,
    record: ChangeRecord,
}

fn import_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?m)^import\b[^\n]*?\bfrom\s*['"][^'"\n]*['"][ \t]*;?"#)
            .expect("import pattern is valid")
    })
}

/// Pattern for one node's class attribute: its own tag, either attribute
/// spelling, the same tokens separated by any whitespace.
fn node_attribute_regex(node: &ElementNode) -> Option<Regex> {
    let tag = regex::escape(node.tag_name());
    let value = node.tokens().map(regex::escape).collect::<Vec<_>>().join(r"\s+");
    let pattern = format!(r#"<{tag}\s(?:[^>]*?\s)?(className|class)=["']\s*{value}\s*["']"#);
    Regex::new(&pattern).ok()
}

fn import_edit(source: &str, import: &StyleImport) -> Edit {
    let statement = import.statement();
    let record = |line| ChangeRecord {
        kind: ChangeKind::ImportAdded,
        line,
        original: String::new(),
        modified: statement.clone(),
        css_class: String::new(),
        semantic_name: format!("{}-import", import.binding),
    };

    match import_regex().find_iter(source).last() {
        Some(last) => Edit {
            range: last.end()..last.end(),
            replacement: format!("\n{}", statement),
            record: record(line_at(source, last.end()) + 1),
        },
        None => Edit {
            range: 0..0,
            replacement: format!("{}\n", statement),
            record: record(1),
        },
    }
}

/// Replace each node's class attribute with a reference into the imported
/// stylesheet module and add the import.
///
/// Every occurrence of a node's tag with the node's class value is rewritten
/// to that node's name, not just the occurrence the node was scanned from.
/// Later nodes with the same tag and value find their occurrences already
/// taken and change nothing. Edits are computed against `source` and applied
/// in one pass, so text outside the replaced attributes is kept byte for byte.
pub fn rewrite_markup(source: &str, nodes: &[ElementNode], import: &StyleImport) -> RewrittenMarkup {
    let mut edits: Vec<Edit> = Vec::new();

    for node in nodes {
        let Some(pattern) = node_attribute_regex(node) else {
            tracing::warn!("Could not build a rewrite pattern for <{}>", node.tag_name());
            continue;
        };

        for caps in pattern.captures_iter(source) {
            let (Some(whole), Some(attr)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let range = attr.start()..whole.end();
            let taken = edits
                .iter()
                .any(|e| e.range.start < range.end && range.start < e.range.end);
            if taken {
                continue;
            }

            let replacement = format!(
                "{}={{{}.{}}}",
                attr.as_str(),
                import.binding,
                node.semantic_name()
            );
            edits.push(Edit {
                record: ChangeRecord {
                    kind: ChangeKind::ClassReplacement,
                    line: line_at(source, whole.start()),
                    original: normalize_classes(&source[range.clone()]),
                    modified: replacement.clone(),
                    css_class: node.raw_classes().to_string(),
                    semantic_name: node.semantic_name().to_string(),
                },
                range,
                replacement,
            });
        }
    }

    let import = import_edit(source, import);
    let import_record = import.record.clone();
    let mut class_records: Vec<ChangeRecord> = edits.iter().map(|e| e.record.clone()).collect();
    class_records.sort_by_key(|r| r.line);

    edits.push(import);
    edits.sort_by_key(|e| e.range.start);

    let mut content = String::with_capacity(source.len() + 64 * edits.len());
    let mut cursor = 0;
    for edit in &edits {
        content.push_str(&source[cursor..edit.range.start]);
        content.push_str(&edit.replacement);
        cursor = edit.range.end;
    }
    content.push_str(&source[cursor..]);

    let mut changes = Vec::with_capacity(class_records.len() + 1);
    changes.push(import_record);
    changes.extend(class_records);

    RewrittenMarkup { content, changes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namer::SemanticNamer;
    use crate::scanner::scan_elements;

    fn rewrite(source: &str) -> RewrittenMarkup {
        let nodes = SemanticNamer::default().name_all(scan_elements(source));
        rewrite_markup(source, &nodes, &StyleImport::new("styles", "./checkbox.module.css"))
    }

    #[test]
    fn test_round_trip_single_div() {
        let out = rewrite(r#"<div className="flex items-center">x</div>"#);
        assert_eq!(
            out.content,
            "import styles from './checkbox.module.css';\n<div className={styles.node0}>x</div>"
        );
    }

    #[test]
    fn test_import_after_last_import() {
        let source = "import { component$ } from \"@builder.io/qwik\";\n\
                      import { Checkbox } from \"@kunai-consulting/qwik\";\n\
                      \n\
                      export default component$(() => <div class=\"flex\" />);\n";
        let out = rewrite(source);
        assert_eq!(
            out.content,
            "import { component$ } from \"@builder.io/qwik\";\n\
             import { Checkbox } from \"@kunai-consulting/qwik\";\n\
             import styles from './checkbox.module.css';\n\
             \n\
             export default component$(() => <div class={styles.node0} />);\n"
        );

        let import = &out.changes[0];
        assert_eq!(import.kind, ChangeKind::ImportAdded);
        assert_eq!(import.line, 3);
        assert_eq!(import.modified, "import styles from './checkbox.module.css';");
    }

    #[test]
    fn test_multiline_attribute_replaced() {
        let source = "<Checkbox.Root>\n  <Checkbox.Trigger\n    class=\"size-[25px] rounded-lg\n           bg-gray-500\"\n  >\n  </Checkbox.Trigger>\n</Checkbox.Root>";
        let out = rewrite(source);
        assert!(out.content.contains("<Checkbox.Trigger\n    class={styles.trigger}\n  >"));

        let replaced = &out.changes[1];
        assert_eq!(replaced.kind, ChangeKind::ClassReplacement);
        assert_eq!(replaced.line, 2);
        assert_eq!(replaced.original, "class=\"size-[25px] rounded-lg bg-gray-500\"");
        assert_eq!(replaced.css_class, "size-[25px] rounded-lg bg-gray-500");
        assert_eq!(replaced.semantic_name, "trigger");
    }

    #[test]
    fn test_namespace_separator_is_literal() {
        // `Checkbox.Root` must not match `CheckboxXRoot`
        let source = r#"<CheckboxXRoot class="p-2"></CheckboxXRoot><Checkbox.Root class="p-2"></Checkbox.Root>"#;
        let nodes = SemanticNamer::default().name_all(scan_elements(source));
        let only_namespaced: Vec<ElementNode> =
            nodes.into_iter().filter(|n| n.tag_name() == "Checkbox.Root").collect();

        let out = rewrite_markup(source, &only_namespaced, &StyleImport::new("styles", "./x.module.css"));
        assert!(out.content.contains(r#"<CheckboxXRoot class="p-2">"#));
        assert!(out.content.contains("<Checkbox.Root class={styles.root}>"));
    }

    #[test]
    fn test_same_tag_and_value_rewritten_with_first_name() {
        // Global substitution per tag and value: both divs take node0
        let source = "<div class=\"p-4\"></div>\n<div class=\"p-4\"></div>\n<div class=\"m-2\"></div>";
        let out = rewrite(source);
        assert_eq!(
            out.content,
            "import styles from './checkbox.module.css';\n\
             <div class={styles.node0}></div>\n\
             <div class={styles.node0}></div>\n\
             <div class={styles.node2}></div>"
        );

        let replacements: Vec<(&str, usize)> = out.changes[1..]
            .iter()
            .map(|c| (c.semantic_name.as_str(), c.line))
            .collect();
        assert_eq!(replacements, vec![("node0", 1), ("node0", 2), ("node2", 3)]);
    }

    #[test]
    fn test_other_tags_with_same_value_untouched() {
        let source = "<span class=\"text-sm\"></span>";
        let node_source = "<p class=\"text-sm\"></p>";
        let nodes = SemanticNamer::default().name_all(scan_elements(node_source));

        let out = rewrite_markup(source, &nodes, &StyleImport::new("styles", "./x.module.css"));
        assert!(out.content.ends_with("<span class=\"text-sm\"></span>"));
        assert_eq!(out.changes.len(), 1);
    }

    #[test]
    fn test_attribute_spelling_and_surrounding_text_preserved() {
        let source = "<button type=\"button\"  className='px-4 py-2'   disabled>Go</button>";
        let out = rewrite(source);
        assert!(out
            .content
            .ends_with("<button type=\"button\"  className={styles.node0}   disabled>Go</button>"));
    }

    #[test]
    fn test_zero_nodes_only_adds_import() {
        let source = "const x = 1;\n";
        let out = rewrite_markup(source, &[], &StyleImport::new("css", "./x.module.css"));
        assert_eq!(out.content, "import css from './x.module.css';\nconst x = 1;\n");
        assert_eq!(out.changes.len(), 1);
        assert_eq!(out.changes[0].line, 1);
    }

    #[test]
    fn test_import_without_semicolon() {
        let source = "import React from 'react'\n<div class=\"flex\"></div>";
        let out = rewrite(source);
        assert!(out
            .content
            .starts_with("import React from 'react'\nimport styles from './checkbox.module.css';\n<div"));
    }
}
