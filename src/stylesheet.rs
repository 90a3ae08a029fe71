use crate::resolver::GeneratedRule;

/// An assembled CSS Modules stylesheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stylesheet {
    pub content: String,
    /// Number of rule blocks written (base and variant blocks)
    pub block_count: usize,
}

fn header() -> String {
    format!(
        "/* Generated CSS Modules from Tailwind classes by {} v{}. DO NOT EDIT. */\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )
}

fn write_block(out: &mut String, selector: &str, declarations: &[String]) {
    out.push('\n');
    out.push_str(selector);
    out.push_str(" {\n");
    for declaration in declarations {
        out.push_str("  ");
        out.push_str(declaration);
        out.push_str(";\n");
    }
    out.push_str("}\n");
}

/// Build the stylesheet for `rules`, keeping their order.
///
/// Each rule yields a `.name { ... }` block when it has base declarations,
/// followed by one `.name:pseudo { ... }` block per variant. Rules with
/// neither are left out.
pub fn assemble_stylesheet(rules: &[GeneratedRule]) -> Stylesheet {
    let mut content = header();
    let mut block_count = 0;

    for rule in rules.iter().filter(|rule| !rule.is_empty()) {
        if !rule.base_declarations().is_empty() {
            write_block(&mut content, &format!(".{}", rule.selector()), rule.base_declarations());
            block_count += 1;
        }
        for (pseudo, declarations) in rule.variants() {
            if declarations.is_empty() {
                continue;
            }
            write_block(&mut content, &format!(".{}:{}", rule.selector(), pseudo), declarations);
            block_count += 1;
        }
    }

    Stylesheet { content, block_count }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stylesheet_layout() {
        let rules = vec![
            GeneratedRule::from_layer_css(
                "trigger",
                r".rounded-lg{border-radius:.5rem}.hover\:bg-gray-100:hover{background-color:#f3f4f6}.p-4{padding:1rem}",
            )
            .unwrap(),
            GeneratedRule::from_layer_css("node0", ".flex{display:flex}.items-center{align-items:center}").unwrap(),
        ];

        let stylesheet = assemble_stylesheet(&rules);
        assert_eq!(stylesheet.block_count, 3);
        insta::assert_snapshot!(stylesheet.content.trim_end(), @r"
        /* Generated CSS Modules from Tailwind classes by tailwind-css-modules v0.1.0. DO NOT EDIT. */

        .trigger {
          border-radius: .5rem;
          padding: 1rem;
        }

        .trigger:hover {
          background-color: #f3f4f6;
        }

        .node0 {
          display: flex;
          align-items: center;
        }
        ");
    }

    #[test]
    fn test_empty_rules_are_skipped() {
        let rules = vec![
            GeneratedRule::from_layer_css("empty", "").unwrap(),
            GeneratedRule::from_layer_css("media", "@media print{.x{display:none}}").unwrap(),
            GeneratedRule::from_layer_css("hoveronly", ".x:hover{cursor:pointer}").unwrap(),
        ];

        let stylesheet = assemble_stylesheet(&rules);
        assert!(!stylesheet.content.contains(".empty"));
        assert!(!stylesheet.content.contains(".media"));
        assert!(!stylesheet.content.contains(".hoveronly {"));
        assert!(stylesheet.content.contains(".hoveronly:hover {\n  cursor: pointer;\n}"));
        assert_eq!(stylesheet.block_count, 1);
    }

    #[test]
    fn test_no_rules_gives_header_only() {
        let stylesheet = assemble_stylesheet(&[]);
        assert!(stylesheet.content.starts_with("/* Generated CSS Modules"));
        assert_eq!(stylesheet.content.lines().count(), 1);
        assert_eq!(stylesheet.block_count, 0);
    }

    #[test]
    fn test_colliding_selectors_are_both_emitted() {
        let rules = vec![
            GeneratedRule::from_layer_css("button", ".p-2{padding:.5rem}").unwrap(),
            GeneratedRule::from_layer_css("button", ".p-4{padding:1rem}").unwrap(),
        ];
        let stylesheet = assemble_stylesheet(&rules);
        assert_eq!(stylesheet.content.matches(".button {").count(), 2);
    }
}
