use crate::errors::{ConverterError, Result};
use indexmap::IndexMap;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;
use tailwind_rs::TailwindBuilder;

/// Name of the layer holding the utility declarations
pub const DEFAULT_LAYER: &str = "default";

/// Name of the layer holding the reset styles
pub const PREFLIGHT_LAYER: &str = "preflight";

/// CSS text grouped by cascade layer, in the order the engine produced it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayeredCss {
    layers: IndexMap<String, String>,
}

impl LayeredCss {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `css` to the named layer, creating it if needed
    pub fn push(&mut self, name: impl Into<String>, css: &str) {
        let layer = self.layers.entry(name.into()).or_default();
        if !layer.is_empty() && !css.is_empty() {
            layer.push('\n');
        }
        layer.push_str(css);
    }

    pub fn with_layer(mut self, name: impl Into<String>, css: &str) -> Self {
        self.push(name, css);
        self
    }

    pub fn layer(&self, name: &str) -> Option<&str> {
        self.layers.get(name).map(String::as_str)
    }

    pub fn default_layer(&self) -> Option<&str> {
        self.layer(DEFAULT_LAYER)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    /// Parse flat CSS text whose layers are introduced by
    /// `/* layer: NAME */` marker comments.
    ///
    /// Text before the first marker belongs to no layer and is dropped.
    pub fn parse(text: &str) -> Self {
        static MARKER: OnceLock<Regex> = OnceLock::new();
        let marker = MARKER.get_or_init(|| {
            Regex::new(r"/\*\s*layer:\s*([\w-]+)\s*\*/").expect("layer marker pattern is valid")
        });

        let mut layers = Self::new();
        let mut current: Option<(&str, usize)> = None;
        for caps in marker.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if let Some((prev, start)) = current {
                layers.push(prev, text[start..whole.start()].trim());
            }
            current = Some((name.as_str(), whole.end()));
        }
        if let Some((prev, start)) = current {
            layers.push(prev, text[start..].trim());
        }
        layers
    }
}

/// What the engine returns for one set of class tokens
#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    pub layers: LayeredCss,
    /// Tokens the engine recognized
    pub matched: BTreeSet<String>,
}

/// An atomic-CSS generator: class tokens in, layered CSS out.
///
/// `setup` runs at most once per [`CssResolver`](crate::resolver::CssResolver)
/// before the first `generate` call.
#[allow(async_fn_in_trait)]
pub trait AtomicCssEngine {
    async fn setup(&self) -> Result<()> {
        Ok(())
    }

    async fn generate(&self, tokens: &BTreeSet<String>) -> Result<EngineOutput>;
}

/// [`AtomicCssEngine`] backed by tailwind-rs.
///
/// Every `generate` call uses a fresh [`TailwindBuilder`] so that one node's
/// classes never leak into another node's CSS.
#[derive(Debug, Default)]
pub struct TailwindEngine {
    include_preflight: bool,
    preflight: OnceLock<String>,
}

impl TailwindEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also report the preflight layer (it is still never emitted)
    pub fn with_preflight(mut self, include: bool) -> Self {
        self.include_preflight = include;
        self
    }

    fn build_preflight() -> Result<String> {
        let mut builder = TailwindBuilder::default();
        builder.preflight.disable = false;
        builder
            .bundle()
            .map_err(|e| ConverterError::EngineError(format!("Failed to generate preflight: {}", e)))
    }
}

impl AtomicCssEngine for TailwindEngine {
    async fn setup(&self) -> Result<()> {
        if self.include_preflight && self.preflight.get().is_none() {
            let css = Self::build_preflight()?;
            let _ = self.preflight.set(css);
            tracing::debug!("tailwind preflight layer prepared");
        }
        Ok(())
    }

    async fn generate(&self, tokens: &BTreeSet<String>) -> Result<EngineOutput> {
        let mut builder = TailwindBuilder::default();
        builder.preflight.disable = true;

        let mut matched = BTreeSet::new();
        for token in tokens {
            if builder.trace(token, false).is_ok() {
                matched.insert(token.clone());
            }
        }

        let css = builder
            .bundle()
            .map_err(|e| ConverterError::EngineError(format!("Failed to generate CSS: {}", e)))?;

        let mut layers = LayeredCss::new();
        if let Some(preflight) = self.preflight.get() {
            layers.push(PREFLIGHT_LAYER, preflight);
        }
        layers.push(DEFAULT_LAYER, &css);

        Ok(EngineOutput { layers, matched })
    }
}
