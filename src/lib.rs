pub mod args;
pub mod config;
pub mod engine;
pub mod errors;
pub mod namer;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod rewriter;
pub mod scanner;
pub mod stylesheet;

pub use args::{Cli, Commands, ConvertArgs, ScanArgs};
pub use config::ConverterConfig;
pub use engine::{AtomicCssEngine, EngineOutput, LayeredCss, TailwindEngine};
pub use errors::{ConverterError, Result};
pub use namer::{ElementNode, SemanticNamer};
pub use pipeline::{name_elements, Conversion, Converter};
pub use report::{ChangeReport, ChangeSummary};
pub use resolver::{CssResolver, GeneratedRule};
pub use rewriter::{ChangeKind, ChangeRecord, StyleImport};
pub use scanner::NodeKind;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What to produce besides the stylesheet and the rewritten component
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputOptions {
    /// Build a [`ChangeReport`]
    pub report: bool,
    /// Write `<base>.diff.html`
    pub html_diff: bool,
    /// Write `<base>.changes.json`
    pub json_report: bool,
    /// Convert without writing anything
    pub dry_run: bool,
}

impl From<&ConvertArgs> for OutputOptions {
    fn from(args: &ConvertArgs) -> Self {
        Self {
            report: args.wants_report(),
            html_diff: args.html_diff,
            json_report: args.json_report,
            dry_run: args.dry_run,
        }
    }
}

/// Result of converting one file
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub input_path: PathBuf,
    pub css_modules_path: PathBuf,
    pub component_path: PathBuf,
    pub html_diff_path: Option<PathBuf>,
    pub json_report_path: Option<PathBuf>,
    pub css_content: String,
    pub updated_component: String,
    pub nodes_found: usize,
    pub rules_generated: usize,
    pub change_report: Option<ChangeReport>,
}

/// Load the configuration file if one was given, otherwise the defaults
pub fn load_config(path: Option<&Path>) -> Result<ConverterConfig> {
    match path {
        Some(path) => ConverterConfig::from_file(path),
        None => Ok(ConverterConfig::default()),
    }
}

/// Expand input paths and glob patterns into a de-duplicated file list,
/// keeping the order they were given in.
pub fn collect_input_files(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut seen = HashSet::new();

    for pattern in patterns.iter().filter(|p| !p.trim().is_empty()) {
        for entry in glob::glob(pattern)? {
            let path = entry?;
            if path.is_dir() {
                continue;
            }
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    if files.is_empty() {
        return Err(ConverterError::NoInputFiles);
    }
    Ok(files)
}

/// Every input writes `<stem>.*` into the same output directory, so two
/// inputs sharing a file stem would overwrite each other's outputs.
pub fn check_output_collisions(files: &[PathBuf]) -> Result<()> {
    let mut stems: HashMap<&std::ffi::OsStr, &PathBuf> = HashMap::new();
    for file in files {
        let Some(stem) = file.file_stem() else {
            continue;
        };
        if let Some(previous) = stems.insert(stem, file) {
            return Err(ConverterError::InvalidInput(format!(
                "{} and {} would both write {}.* into the output directory",
                previous.display(),
                file.display(),
                stem.to_string_lossy()
            )));
        }
    }
    Ok(())
}

/// Convert one component file into `output_dir`.
///
/// Nothing is created (not even `output_dir`) unless the conversion itself
/// succeeds, and every output is staged next to its destination before the
/// first one is renamed into place.
pub async fn convert_file<E: AtomicCssEngine>(
    converter: &Converter<E>,
    input: &Path,
    output_dir: &Path,
    options: OutputOptions,
) -> Result<ConversionResult> {
    let source = fs::read_to_string(input)
        .map_err(|e| ConverterError::InputError(format!("Failed to read {}: {}", input.display(), e)))?;

    let base_name = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .ok_or_else(|| ConverterError::InvalidInput(format!("{} has no file name", input.display())))?;
    let component_file_name = match input.extension() {
        Some(ext) => format!("{}.{}", base_name, ext.to_string_lossy()),
        None => base_name.clone(),
    };

    let conversion = converter
        .convert_source(&source, &base_name, &input.display().to_string())
        .await?;

    let css_modules_path = output_dir.join(&conversion.stylesheet_file_name);
    let component_path = output_dir.join(component_file_name);
    let html_diff_path = options.html_diff.then(|| output_dir.join(format!("{}.diff.html", base_name)));
    let json_report_path = options.json_report.then(|| output_dir.join(format!("{}.changes.json", base_name)));

    let change_report = options.report.then(|| {
        ChangeReport::new(
            input.display().to_string(),
            component_path.display().to_string(),
            css_modules_path.display().to_string(),
            conversion.nodes.len(),
            conversion.stylesheet.block_count,
            conversion.markup.changes.clone(),
        )
    });

    if !options.dry_run {
        fs::create_dir_all(output_dir).map_err(|e| output_error(output_dir, e))?;

        let mut staged = StagedFiles::default();
        staged.stage(&css_modules_path, &conversion.stylesheet.content)?;
        staged.stage(&component_path, &conversion.markup.content)?;
        if let (Some(path), Some(report)) = (&html_diff_path, &change_report) {
            staged.stage(path, &report.to_html())?;
        }
        if let (Some(path), Some(report)) = (&json_report_path, &change_report) {
            staged.stage(path, &report.to_pretty_json()?)?;
        }
        staged.commit()?;

        info!("Wrote {} and {}", css_modules_path.display(), component_path.display());
    }

    Ok(ConversionResult {
        input_path: input.to_path_buf(),
        css_modules_path,
        component_path,
        html_diff_path,
        json_report_path,
        css_content: conversion.stylesheet.content,
        updated_component: conversion.markup.content,
        nodes_found: conversion.nodes.len(),
        rules_generated: conversion.stylesheet.block_count,
        change_report,
    })
}

/// Run the convert command, calling `on_file(index, total, path)` before each
/// file is converted.
///
/// Files are converted one after another with a single engine; the first
/// failing file stops the run.
pub async fn convert_with_progress<F>(args: &ConvertArgs, mut on_file: F) -> Result<Vec<ConversionResult>>
where
    F: FnMut(usize, usize, &Path),
{
    args.validate().map_err(ConverterError::InvalidInput)?;

    let config = load_config(args.config.as_deref())?;
    config.validate()?;

    let files = collect_input_files(&args.input)?;
    check_output_collisions(&files)?;
    info!("Converting {} file(s) into {}", files.len(), args.output.display());

    let converter = Converter::with_tailwind(config);
    let options = OutputOptions::from(args);

    let mut results = Vec::with_capacity(files.len());
    for (index, file) in files.iter().enumerate() {
        on_file(index, files.len(), file);
        let result = convert_file(&converter, file, &args.output, options).await?;
        info!(
            "{}: {} element(s), {} CSS rule(s)",
            file.display(),
            result.nodes_found,
            result.rules_generated
        );
        results.push(result);
    }

    Ok(results)
}

/// Main converter entry point
pub async fn convert(args: &ConvertArgs) -> Result<Vec<ConversionResult>> {
    convert_with_progress(args, |_, _, _| {}).await
}

/// Run the scan command: name every element without resolving any CSS
pub fn scan_file(args: &ScanArgs) -> Result<Vec<ElementNode>> {
    let config = load_config(args.config.as_deref())?;
    config.validate()?;

    let source = fs::read_to_string(&args.input)
        .map_err(|e| ConverterError::InputError(format!("Failed to read {}: {}", args.input.display(), e)))?;

    let nodes = name_elements(&source, &config);
    debug!("{}: {} element(s)", args.input.display(), nodes.len());
    Ok(nodes)
}

fn output_error(path: &Path, e: std::io::Error) -> ConverterError {
    ConverterError::OutputError { path: path.display().to_string(), message: e.to_string() }
}

/// Outputs written to temporary siblings, renamed into place on commit.
/// Whatever is still staged when this is dropped gets removed.
#[derive(Default)]
struct StagedFiles {
    staged: Vec<(PathBuf, PathBuf)>,
}

impl StagedFiles {
    fn stage(&mut self, path: &Path, content: &str) -> Result<()> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

        // Track before writing so a half-written temp file is cleaned up too
        self.staged.push((temp_path.clone(), path.to_path_buf()));
        write_synced(&temp_path, content).map_err(|e| output_error(path, e))
    }

    fn commit(mut self) -> Result<()> {
        while !self.staged.is_empty() {
            let (temp_path, path) = self.staged.remove(0);
            if let Err(e) = fs::rename(&temp_path, &path) {
                let _ = fs::remove_file(&temp_path);
                return Err(output_error(&path, e));
            }
        }
        Ok(())
    }
}

impl Drop for StagedFiles {
    fn drop(&mut self) {
        for (temp_path, _) in &self.staged {
            let _ = fs::remove_file(temp_path);
        }
    }
}

fn write_synced(path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()
}
