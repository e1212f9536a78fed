//! chdigest CLI - reshape a story-tracker CSV export
//!
//! ```bash
//! chdigest stories.csv digest.csv
//! chdigest --omit description stories.csv digest.csv
//! chdigest --registry columns.json --delimiter ';' in.csv out.csv
//! ```
//!
//! Exit status: 0 on success, 2 for usage and configuration errors, 1 for
//! any other failure.

use chdigest::{digest_file, logging, DigestOptions, PipelineError};
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Exit status for invalid invocations, matching clap's usage errors.
const USAGE_EXIT_CODE: i32 = 2;

#[derive(Parser)]
#[command(name = "chdigest")]
#[command(about = "Reorder, rename and expand the columns of a CSV export", long_about = None)]
#[command(override_usage = "chdigest [OPTIONS] SOURCE.csv DEST.csv")]
struct Cli {
    /// Input CSV file
    #[arg(value_name = "SOURCE.csv")]
    source: PathBuf,

    /// Output CSV file
    #[arg(value_name = "DEST.csv")]
    dest: PathBuf,

    /// Blank the values of this output column (repeatable)
    #[arg(long = "omit", value_name = "COLUMN")]
    omit: Vec<String>,

    /// JSON transform registry to use instead of the built-in one
    #[arg(long)]
    registry: Option<PathBuf>,

    /// JSON options file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Field delimiter for input and output (default: ',')
    #[arg(short, long)]
    delimiter: Option<char>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Options file first, then command-line flags on top.
    fn options(&self) -> Result<DigestOptions, PipelineError> {
        let mut options = match &self.config {
            Some(path) => DigestOptions::load(path)?,
            None => DigestOptions::default(),
        };
        options.omitting_values_of.extend(self.omit.iter().cloned());
        if let Some(registry) = &self.registry {
            options.registry = Some(registry.clone());
        }
        if let Some(delimiter) = self.delimiter {
            options.delimiter = delimiter;
        }
        Ok(options)
    }
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("❌ Error: {}", e);
        let code = if e.is_usage_error() { USAGE_EXIT_CODE } else { 1 };
        std::process::exit(code);
    }
}

fn run(cli: &Cli) -> Result<(), PipelineError> {
    let options = cli.options()?;
    let summary = digest_file(&cli.source, &cli.dest, &options)?;
    eprintln!(
        "✅ Wrote {} rows × {} columns to {}",
        summary.rows,
        summary.headers.len(),
        summary.destination.display()
    );
    Ok(())
}
