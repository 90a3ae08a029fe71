use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tailwind to CSS Modules CLI - Moves utility classes out of component markup
/// into a generated CSS Modules stylesheet
#[derive(Parser, Debug)]
#[command(name = "tailwind-css-modules")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert component files to CSS Modules
    Convert(ConvertArgs),
    /// Print the named elements of a component file as JSON
    Scan(ScanArgs),
}

impl Commands {
    pub fn verbose(&self) -> bool {
        match self {
            Commands::Convert(args) => args.verbose,
            Commands::Scan(_) => false,
        }
    }
}

/// Arguments for the convert command
#[derive(Parser, Debug, Clone)]
pub struct ConvertArgs {
    /// Input files (glob patterns supported)
    #[arg(
        short = 'i',
        long = "input",
        value_name = "PATTERN",
        required = true,
        num_args = 1..,
        help = "Component files or glob patterns to convert"
    )]
    pub input: Vec<String>,

    /// Output directory
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        required = true,
        help = "Directory where the stylesheet and rewritten component are written"
    )]
    pub output: PathBuf,

    /// Configuration file path (YAML or JSON)
    #[arg(
        short = 'c',
        long = "config",
        value_name = "PATH",
        help = "Path to configuration file (YAML or JSON format)"
    )]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(
        short = 'v',
        long = "verbose",
        default_value_t = false,
        help = "Enable verbose output"
    )]
    pub verbose: bool,

    /// Print the change report to the terminal
    #[arg(
        short = 'd',
        long = "diff",
        default_value_t = false,
        help = "Show a summary of every change made"
    )]
    pub diff: bool,

    /// Write an HTML change report next to the outputs (implies --diff)
    #[arg(
        long = "html-diff",
        default_value_t = false,
        help = "Also write <name>.diff.html into the output directory"
    )]
    pub html_diff: bool,

    /// Write the change report as JSON next to the outputs
    #[arg(
        long = "json-report",
        default_value_t = false,
        help = "Also write <name>.changes.json into the output directory"
    )]
    pub json_report: bool,

    /// Dry run (don't write output files)
    #[arg(
        long = "dry-run",
        default_value_t = false,
        help = "Perform the conversion but don't write output files"
    )]
    pub dry_run: bool,
}

/// Arguments for the scan command
#[derive(Parser, Debug, Clone)]
pub struct ScanArgs {
    /// Component file to scan
    #[arg(short = 'i', long = "input", value_name = "FILE", required = true)]
    pub input: PathBuf,

    /// Configuration file path (YAML or JSON)
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl ConvertArgs {
    /// Validate that the arguments are consistent
    pub fn validate(&self) -> Result<(), String> {
        if self.input.iter().all(|pattern| pattern.trim().is_empty()) {
            return Err("At least one input file must be provided".to_string());
        }

        if self.output.as_os_str().is_empty() {
            return Err("Output directory must not be empty".to_string());
        }

        Ok(())
    }

    /// Print the console report
    pub fn show_diff(&self) -> bool {
        self.diff || self.html_diff
    }

    /// Whether a change report has to be built at all
    pub fn wants_report(&self) -> bool {
        self.show_diff() || self.json_report
    }
}
