use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tailwind_css_modules::{convert_with_progress, scan_file, Cli, Commands, ConvertArgs, ScanArgs};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    let verbose = cli.command.verbose();
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let outcome = match cli.command {
        Commands::Convert(args) => run_convert(&args).await,
        Commands::Scan(args) => run_scan(&args),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run_convert(args: &ConvertArgs) -> anyhow::Result<()> {
    let progress_bar = (!args.verbose).then(|| {
        let pb = ProgressBar::new(0);
        let style = ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
        pb
    });

    let results = convert_with_progress(args, |index, total, path| {
        if let Some(pb) = &progress_bar {
            pb.set_length(total as u64);
            pb.set_position(index as u64);
            pb.set_message(
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            );
        }
    })
    .await;

    if let Some(pb) = &progress_bar {
        pb.finish_and_clear();
    }
    let results = results.context("Conversion failed")?;

    for result in &results {
        if args.dry_run {
            println!("Converted {} (dry run, nothing written)", result.input_path.display());
        } else {
            println!("Converted {}", result.input_path.display());
            println!("  - CSS Module: {}", result.css_modules_path.display());
            println!("  - Component: {}", result.component_path.display());
            if let Some(path) = &result.html_diff_path {
                println!("  - HTML diff: {}", path.display());
            }
            if let Some(path) = &result.json_report_path {
                println!("  - Change report: {}", path.display());
            }
        }

        if args.show_diff() {
            if let Some(report) = &result.change_report {
                println!("{}", report.to_console());
            }
        }
    }
    Ok(())
}

fn run_scan(args: &ScanArgs) -> anyhow::Result<()> {
    let nodes = scan_file(args).with_context(|| format!("Failed to scan {}", args.input.display()))?;
    println!("{}", serde_json::to_string_pretty(&nodes)?);
    Ok(())
}
