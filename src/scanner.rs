//! Text-level scanner for elements that carry a `class` or `className`
//! attribute.
//!
//! This is deliberately not a parser. An opening tag is located with a single
//! regular expression whose attribute span is `[^>]*`, which has some known
//! consequences callers must tolerate:
//!
//! - tags inside comments or string literals are captured like any other tag;
//! - a `>` inside an attribute that precedes the class attribute (for example
//!   an arrow function in `onClick={() => ...}`) ends the tag early, so that
//!   element is not found;
//! - only quoted literal values are recognized, `className={...}` expressions
//!   are ignored.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Whether a tag names a framework component or a plain element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Component,
    PlainElement,
}

impl NodeKind {
    /// Component when the tag starts with an uppercase letter or is namespaced
    pub fn of_tag(tag_name: &str) -> Self {
        let starts_upper = tag_name.chars().next().is_some_and(char::is_uppercase);
        if starts_upper || tag_name.contains('.') {
            NodeKind::Component
        } else {
            NodeKind::PlainElement
        }
    }
}

/// An element found by the scanner, before it has been given a name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedElement {
    pub kind: NodeKind,
    pub tag_name: String,
    /// Whitespace-collapsed class tokens
    pub raw_classes: String,
    /// 1-based line of the opening tag
    pub source_line: usize,
}

fn class_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `[^>]` and `[^"']` both match newlines, so multi-line tags and values
    // need no extra flags.
    RE.get_or_init(|| {
        Regex::new(
            r#"<([A-Za-z_][\w-]*(?:\.[A-Za-z_][\w-]*)?)\s(?:[^>]*?\s)?(?:className|class)=["']([^"']+)["'][^>]*>"#,
        )
        .expect("class tag pattern is valid")
    })
}

/// Collapse whitespace runs to a single space and trim
pub fn normalize_classes(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 1-based line number of a byte offset, counted from the start of `text`
pub fn line_at(text: &str, offset: usize) -> usize {
    text.as_bytes()[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}

/// Scan `source` for class-bearing opening tags in document order
pub fn scan_elements(source: &str) -> Vec<ScannedElement> {
    class_tag_regex()
        .captures_iter(source)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let tag_name = caps.get(1)?.as_str();
            let raw_classes = normalize_classes(caps.get(2)?.as_str());
            if raw_classes.is_empty() {
                return None;
            }

            Some(ScannedElement {
                kind: NodeKind::of_tag(tag_name),
                tag_name: tag_name.to_string(),
                raw_classes,
                // Recomputed from the match offset every time
                source_line: line_at(source, whole.start()),
            })
        })
        .collect()
}
