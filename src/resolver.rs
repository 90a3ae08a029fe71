use crate::engine::AtomicCssEngine;
use crate::errors::{ConverterError, Result};
use crate::namer::ElementNode;
use indexmap::IndexMap;
use lightningcss::declaration::DeclarationBlock;
use lightningcss::rules::CssRule;
use lightningcss::selector::{Component, SelectorList};
use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::traits::ToCss;
use std::collections::BTreeSet;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Resolved styling for one element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedRule {
    selector: String,
    base_declarations: Vec<String>,
    variants: IndexMap<String, Vec<String>>,
}

impl GeneratedRule {
    /// Classify the rules of a default-layer stylesheet.
    ///
    /// A `.class:pseudo` rule lands in the variant for `pseudo`; every other
    /// style rule contributes to the base declarations. At-rules are dropped.
    pub fn from_layer_css(selector: impl Into<String>, css: &str) -> Result<Self> {
        let selector = selector.into();
        let options = ParserOptions { error_recovery: true, ..ParserOptions::default() };
        let sheet = StyleSheet::parse(css, options)
            .map_err(|e| ConverterError::EngineError(format!("Failed to parse CSS for .{}: {}", selector, e)))?;

        let mut base_declarations = Vec::new();
        let mut variants: IndexMap<String, Vec<String>> = IndexMap::new();

        for rule in &sheet.rules.0 {
            let CssRule::Style(style) = rule else {
                debug!(selector = %selector, "skipping at-rule");
                continue;
            };

            let declarations = declarations_of(&style.declarations)?;
            match pseudo_class_of(&style.selectors)? {
                Some(pseudo) => variants.entry(pseudo).or_default().extend(declarations),
                None => base_declarations.extend(declarations),
            }
            if !style.rules.0.is_empty() {
                debug!(selector = %selector, "skipping nested rules");
            }
        }

        Ok(Self { selector, base_declarations, variants })
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn base_declarations(&self) -> &[String] {
        &self.base_declarations
    }

    pub fn variants(&self) -> &IndexMap<String, Vec<String>> {
        &self.variants
    }

    /// No base declarations and no non-empty variant
    pub fn is_empty(&self) -> bool {
        self.base_declarations.is_empty() && self.variants.values().all(Vec::is_empty)
    }
}

/// `prop: value` for every declaration, `!important` ones last
fn declarations_of(block: &DeclarationBlock) -> Result<Vec<String>> {
    let normal = block.declarations.iter().map(|property| (property, false));
    let important = block.important_declarations.iter().map(|property| (property, true));

    normal
        .chain(important)
        .map(|(property, important)| {
            property
                .to_css_string(important, PrinterOptions::default())
                .map_err(|e| ConverterError::EngineError(format!("Failed to print declaration: {}", e)))
        })
        .collect()
}

/// The pseudo-class of a selector made of exactly one class and one
/// pseudo-class, e.g. `hover` for `.hover\:underline:hover`.
fn pseudo_class_of(selectors: &SelectorList) -> Result<Option<String>> {
    let [selector] = selectors.0.as_slice() else {
        return Ok(None);
    };

    let (mut classes, mut pseudo_classes) = (0, 0);
    for component in selector.iter_raw_match_order() {
        match component {
            Component::Class(_) => classes += 1,
            Component::NonTSPseudoClass(_) => pseudo_classes += 1,
            _ => return Ok(None),
        }
    }
    if classes != 1 || pseudo_classes != 1 {
        return Ok(None);
    }

    let printed = selectors
        .to_css_string(PrinterOptions::default())
        .map_err(|e| ConverterError::EngineError(format!("Failed to print selector: {}", e)))?;
    Ok(unescaped_suffix(&printed).map(str::to_string))
}

/// Text after the last `:` that is not escaped with a backslash
fn unescaped_suffix(selector: &str) -> Option<&str> {
    let bytes = selector.as_bytes();
    (1..bytes.len())
        .rev()
        .find(|&i| bytes[i] == b':' && bytes[..i].iter().rev().take_while(|&&b| b == b'\\').count() % 2 == 0)
        .map(|i| &selector[i + 1..])
        .filter(|pseudo| !pseudo.is_empty())
}

/// Runs an [`AtomicCssEngine`] over element nodes.
///
/// The engine's setup is awaited lazily and at most once per resolver; a
/// failed setup is attempted again on the next call.
pub struct CssResolver<E> {
    engine: E,
    ready: OnceCell<()>,
}

impl<E: AtomicCssEngine> CssResolver<E> {
    pub fn new(engine: E) -> Self {
        Self { engine, ready: OnceCell::new() }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn is_ready(&self) -> bool {
        self.ready.initialized()
    }

    pub async fn ensure_ready(&self) -> Result<()> {
        self.ready.get_or_try_init(|| self.engine.setup()).await?;
        Ok(())
    }

    /// Resolve a single node. `Ok(None)` when the engine had no CSS for it.
    pub async fn resolve_node(&self, node: &ElementNode) -> Result<Option<GeneratedRule>> {
        self.ensure_ready().await?;

        let tokens: BTreeSet<String> = node.tokens().map(str::to_string).collect();
        if tokens.is_empty() {
            return Ok(None);
        }

        let output = self.engine.generate(&tokens).await?;

        let unmatched: Vec<&str> = tokens
            .iter()
            .filter(|t| !output.matched.contains(*t))
            .map(String::as_str)
            .collect();
        if !unmatched.is_empty() {
            debug!(node = node.semantic_name(), ?unmatched, "engine did not recognize some classes");
        }

        let Some(css) = output.layers.default_layer().filter(|css| !css.trim().is_empty()) else {
            return Ok(None);
        };

        GeneratedRule::from_layer_css(node.semantic_name(), css).map(Some)
    }

    /// Resolve every node in document order.
    ///
    /// A node whose resolution fails is logged and skipped; the returned rules
    /// keep the relative order of the nodes that succeeded.
    pub async fn resolve_all(&self, nodes: &[ElementNode]) -> Result<Vec<GeneratedRule>> {
        self.ensure_ready().await?;

        let mut rules = Vec::with_capacity(nodes.len());
        for node in nodes {
            debug!(tag = node.tag_name(), name = node.semantic_name(), "generating CSS");
            match self.resolve_node(node).await {
                Ok(Some(rule)) => rules.push(rule),
                Ok(None) => warn!(
                    "No CSS generated for <{}> (line {}, classes \"{}\")",
                    node.tag_name(),
                    node.source_line(),
                    node.raw_classes()
                ),
                Err(e) => warn!(
                    "Failed to generate CSS for <{}> (line {}): {}",
                    node.tag_name(),
                    node.source_line(),
                    e
                ),
            }
        }
        Ok(rules)
    }
}
