use crate::rewriter::{ChangeKind, ChangeRecord};
use chrono::{DateTime, Utc};
use html_escape::encode_double_quoted_attribute;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Aggregate counts for one conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSummary {
    /// Elements found by the scanner
    pub total_nodes: usize,

    /// Class attributes that were replaced
    pub classes_converted: usize,

    /// Import statements added
    pub imports_added: usize,

    /// Rule blocks written to the stylesheet
    pub css_rules_generated: usize,
}

/// Everything that changed during one conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeReport {
    pub original_file: String,
    pub modified_file: String,
    pub css_modules_file: String,

    /// Timestamp when the report was generated
    pub generated_at: DateTime<Utc>,

    /// Converter version
    pub converter_version: String,

    pub changes: Vec<ChangeRecord>,
    pub summary: ChangeSummary,
}

impl ChangeReport {
    pub fn new(
        original_file: impl Into<String>,
        modified_file: impl Into<String>,
        css_modules_file: impl Into<String>,
        total_nodes: usize,
        css_rules_generated: usize,
        changes: Vec<ChangeRecord>,
    ) -> Self {
        let count = |kind: ChangeKind| changes.iter().filter(|c| c.kind == kind).count();
        let summary = ChangeSummary {
            total_nodes,
            classes_converted: count(ChangeKind::ClassReplacement),
            imports_added: count(ChangeKind::ImportAdded),
            css_rules_generated,
        };

        Self {
            original_file: original_file.into(),
            modified_file: modified_file.into(),
            css_modules_file: css_modules_file.into(),
            generated_at: Utc::now(),
            converter_version: env!("CARGO_PKG_VERSION").to_string(),
            changes,
            summary,
        }
    }

    /// Convert report to pretty JSON string
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Plain-text summary for the terminal
    pub fn to_console(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\nConversion summary:");
        let _ = writeln!(out, "   Elements: {}", self.summary.total_nodes);
        let _ = writeln!(out, "   Classes converted: {}", self.summary.classes_converted);
        let _ = writeln!(out, "   CSS rules: {}", self.summary.css_rules_generated);
        let _ = writeln!(out, "\nChanges made:");

        for change in &self.changes {
            let _ = writeln!(out, "\n   Line {}: {}", change.line, change.kind.as_str());
            if !change.original.is_empty() {
                let _ = writeln!(out, "   - {}", change.original);
            }
            let _ = writeln!(out, "   + {}", change.modified);
            if change.kind == ChangeKind::ClassReplacement {
                let _ = writeln!(out, "     -> .{}", change.semantic_name);
            }
        }
        out
    }

    /// Self-contained HTML page describing the conversion
    pub fn to_html(&self) -> String {
        let mut items = String::new();
        for change in &self.changes {
            let _ = write!(
                items,
                "\n      <div class=\"change-item\">\n        <div class=\"change-type {kind}\">{label}</div>\n        <div class=\"line-number\">Line {line}</div>\n",
                kind = change.kind.as_str(),
                label = change.kind.as_str().replace('-', " "),
                line = change.line,
            );
            if !change.original.is_empty() {
                let _ = writeln!(
                    items,
                    "        <div class=\"code removed\">- {}</div>",
                    encode_double_quoted_attribute(&change.original)
                );
            }
            let _ = writeln!(items, "        <div class=\"code added\">+ {}</div>", encode_double_quoted_attribute(&change.modified));
            if change.kind == ChangeKind::ClassReplacement {
                let _ = writeln!(
                    items,
                    "        <div class=\"css-class\">CSS class: <code>.{}</code> from <code>{}</code></div>",
                    encode_double_quoted_attribute(&change.semantic_name),
                    encode_double_quoted_attribute(&change.css_class)
                );
            }
            items.push_str("      </div>");
        }

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Tailwind to CSS Modules Conversion Report</title>
  <style>
    body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 20px; background: #f8fafc; }}
    .header, .diff-container {{ background: white; padding: 20px; border-radius: 8px; margin-bottom: 20px; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }}
    .summary {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 16px; margin: 20px 0; }}
    .stat {{ background: #f1f5f9; padding: 16px; border-radius: 8px; text-align: center; }}
    .stat-value {{ font-size: 24px; font-weight: bold; color: #0f172a; }}
    .stat-label {{ font-size: 14px; color: #64748b; margin-top: 4px; }}
    .change-item {{ margin-bottom: 16px; padding: 12px; border-radius: 6px; border: 1px solid #e2e8f0; }}
    .change-type {{ font-size: 12px; font-weight: 600; text-transform: uppercase; margin-bottom: 8px; }}
    .change-type.class-replacement {{ color: #0369a1; }}
    .change-type.import-added {{ color: #059669; }}
    .code {{ font-family: 'SF Mono', Monaco, monospace; font-size: 14px; padding: 8px 12px; border-radius: 4px; overflow-x: auto; white-space: pre-wrap; }}
    .code.removed {{ background: #fee2e2; color: #991b1b; }}
    .code.added {{ background: #dcfce7; color: #166534; }}
    .line-number, .css-class {{ color: #64748b; font-size: 12px; margin: 4px 0; }}
    .file-path {{ font-family: monospace; color: #64748b; font-size: 14px; }}
  </style>
</head>
<body>
  <div class="header">
    <h1>Tailwind &rarr; CSS Modules Conversion</h1>
    <p class="file-path">{original}</p>
    <p class="file-path">{modified} + {css}</p>
  </div>

  <h2>Conversion Summary</h2>
  <div class="summary">
    <div class="stat"><div class="stat-value">{nodes}</div><div class="stat-label">Elements Processed</div></div>
    <div class="stat"><div class="stat-value">{converted}</div><div class="stat-label">Classes Converted</div></div>
    <div class="stat"><div class="stat-value">{imports}</div><div class="stat-label">Imports Added</div></div>
    <div class="stat"><div class="stat-value">{rules}</div><div class="stat-label">CSS Rules Generated</div></div>
  </div>

  <div class="diff-container">
    <h2>Changes Made</h2>{items}
  </div>

  <p class="file-path">Generated {generated} by tailwind-css-modules v{version}</p>
</body>
</html>
"#,
            original = encode_double_quoted_attribute(&self.original_file),
            modified = encode_double_quoted_attribute(&self.modified_file),
            css = encode_double_quoted_attribute(&self.css_modules_file),
            nodes = self.summary.total_nodes,
            converted = self.summary.classes_converted,
            imports = self.summary.imports_added,
            rules = self.summary.css_rules_generated,
            items = items,
            generated = self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            version = encode_double_quoted_attribute(&self.converter_version),
        )
    }
}
