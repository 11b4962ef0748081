//! pdfsift CLI - batch PDF field extraction tool

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfsift::batch::{DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR};
use pdfsift::{BatchConfig, BatchDriver, BatchEvent, BatchReport, JsonFormat, OutputFormats};

#[derive(Parser)]
#[command(name = "pdfsift")]
#[command(version)]
#[command(about = "Extract structured fields from a directory of PDFs to JSON and CSV", long_about = None)]
struct Cli {
    /// Directory containing the PDFs to process
    #[arg(value_name = "INPUT_DIR", env = "PDFSIFT_INPUT", default_value = DEFAULT_INPUT_DIR)]
    input: PathBuf,

    /// Directory receiving the results (created if missing)
    #[arg(value_name = "OUTPUT_DIR", env = "PDFSIFT_OUTPUT", default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: Format,

    /// Write compact JSON
    #[arg(long)]
    compact: bool,

    /// Also write every record into one records.json
    #[arg(long)]
    aggregate: bool,

    /// Write a JSON report of the run to FILE
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Hide the progress bar and the per-file listing
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One JSON file per document
    Json,
    /// One records.csv for the run
    Csv,
    /// Both JSON files and records.csv
    Both,
}

impl From<Format> for OutputFormats {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormats::JSON,
            Format::Csv => OutputFormats::CSV,
            Format::Both => OutputFormats::BOTH,
        }
    }
}

impl Cli {
    fn config(&self) -> BatchConfig {
        let json_format = if self.compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        };

        let mut config = BatchConfig::new(&self.input, &self.output)
            .with_formats(self.format.into())
            .with_json_format(json_format)
            .with_aggregate(self.aggregate);
        if let Some(report) = &self.report {
            config = config.with_report(report);
        }
        config
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if let Err(e) = cmd_batch(&cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_batch(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let driver = BatchDriver::new(cli.config())?;

    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
        .progress_chars("#>-");
    let mut progress: Option<ProgressBar> = None;

    let report = driver.run_with(|event| match event {
        BatchEvent::Discovered { total } if !cli.quiet => {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(style.clone());
            progress = Some(pb);
        }
        BatchEvent::Started(path) => {
            if let Some(pb) = &progress {
                let name = path.file_name().unwrap_or_default().to_string_lossy();
                pb.set_message(name.to_string());
            }
        }
        BatchEvent::Finished(_) => {
            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }
        _ => {}
    })?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    print_summary(&report, cli.quiet);
    Ok(())
}

fn print_summary(report: &BatchReport, quiet: bool) {
    if !quiet {
        println!("{}", "Batch Summary".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());

        for outcome in report.successes() {
            println!("  {} {}", "✓".green(), outcome.file_name);
        }
        for outcome in report.failures() {
            let kind = outcome
                .error_kind
                .map(|k| k.to_string())
                .unwrap_or_default();
            println!(
                "  {} {} {}",
                "✗".red(),
                outcome.file_name,
                format!("({}: {})", kind, outcome.message.as_deref().unwrap_or("")).dimmed()
            );
        }
        for artifact in &report.artifacts {
            println!("  {} {}", "└─".dimmed(), artifact.display());
        }
        println!();
    }

    let failed = if report.failed > 0 {
        format!("{} failed", report.failed).red().bold()
    } else {
        format!("{} failed", report.failed).normal()
    };
    println!(
        "{} {} succeeded, {}",
        "Done!".green().bold(),
        report.succeeded,
        failed
    );

    for error in &report.errors {
        eprintln!("{}: {}", "Warning".yellow().bold(), error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_positional_dirs_and_flags() {
        let cli = Cli::try_parse_from([
            "pdfsift", "in", "out", "--format", "both", "--compact", "--aggregate", "-q",
        ])
        .unwrap();
        let config = cli.config();

        assert_eq!(config.input_dir, PathBuf::from("in"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.formats, OutputFormats::BOTH);
        assert_eq!(config.json_format, JsonFormat::Compact);
        assert!(config.aggregate);
        assert!(cli.quiet);
    }

    #[test]
    fn test_batch_on_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        std::fs::create_dir(&input).unwrap();

        let cli = Cli::try_parse_from([
            "pdfsift".as_ref(),
            input.as_os_str(),
            output.as_os_str(),
            "-q".as_ref(),
        ])
        .unwrap();
        cmd_batch(&cli).unwrap();

        assert!(output.is_dir());
        assert_eq!(std::fs::read_dir(&output).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_input_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "pdfsift".as_ref(),
            dir.path().join("absent").as_os_str(),
            dir.path().join("out").as_os_str(),
            "-q".as_ref(),
        ])
        .unwrap();
        assert!(cmd_batch(&cli).is_err());
    }
}
