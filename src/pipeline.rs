use crate::config::ConverterConfig;
use crate::engine::{AtomicCssEngine, TailwindEngine};
use crate::errors::{ConverterError, Result};
use crate::namer::{ElementNode, SemanticNamer};
use crate::resolver::{CssResolver, GeneratedRule};
use crate::rewriter::{rewrite_markup, RewrittenMarkup, StyleImport};
use crate::scanner::scan_elements;
use crate::stylesheet::{assemble_stylesheet, Stylesheet};
use tracing::debug;

/// Scan `source` and name its elements using the naming settings in `config`
pub fn name_elements(source: &str, config: &ConverterConfig) -> Vec<ElementNode> {
    SemanticNamer::new(config.plain_element_prefix.clone())
        .with_disambiguation(config.disambiguate_components)
        .name_all(scan_elements(source))
}

/// Output of converting one markup source
#[derive(Debug, Clone)]
pub struct Conversion {
    pub nodes: Vec<ElementNode>,
    pub rules: Vec<GeneratedRule>,
    pub stylesheet: Stylesheet,
    pub markup: RewrittenMarkup,
    /// File name the rewritten markup imports, e.g. `checkbox.module.css`
    pub stylesheet_file_name: String,
}

/// Turns Tailwind-styled markup into a CSS Modules stylesheet plus the
/// rewritten markup.
///
/// The engine is set up once per converter and shared by every source it
/// converts.
pub struct Converter<E> {
    config: ConverterConfig,
    resolver: CssResolver<E>,
}

impl Converter<TailwindEngine> {
    pub fn with_tailwind(config: ConverterConfig) -> Self {
        let engine = TailwindEngine::new().with_preflight(config.include_preflight);
        Self::new(engine, config)
    }
}

impl<E: AtomicCssEngine> Converter<E> {
    pub fn new(engine: E, config: ConverterConfig) -> Self {
        Self { config, resolver: CssResolver::new(engine) }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    pub fn resolver(&self) -> &CssResolver<E> {
        &self.resolver
    }

    /// Find and name every element carrying a class attribute
    pub fn scan(&self, source: &str) -> Vec<ElementNode> {
        name_elements(source, &self.config)
    }

    /// Convert `source`, whose stylesheet will be written as
    /// `<base_name>.<module_extension>`.
    ///
    /// Fails with [`ConverterError::NoClassElements`] when nothing in the
    /// source carries a class attribute; `source_name` is used in that error.
    pub async fn convert_source(&self, source: &str, base_name: &str, source_name: &str) -> Result<Conversion> {
        let nodes = self.scan(source);
        if nodes.is_empty() {
            return Err(ConverterError::NoClassElements { path: source_name.to_string() });
        }
        debug!(source = source_name, nodes = nodes.len(), "scanned markup");

        let rules = self.resolver.resolve_all(&nodes).await?;
        let stylesheet = assemble_stylesheet(&rules);

        let stylesheet_file_name = self.config.stylesheet_file_name(base_name);
        let import = StyleImport::new(self.config.style_binding.clone(), format!("./{}", stylesheet_file_name));
        let markup = rewrite_markup(source, &nodes, &import);

        Ok(Conversion { nodes, rules, stylesheet, markup, stylesheet_file_name })
    }
}
