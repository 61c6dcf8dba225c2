use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the artifact validator.
///
/// The validator checks forensic artifact definition files for errors,
/// inconsistencies and other flaws. Flags control which severities are
/// shown and whether flaws fail the process.
#[derive(Parser, Debug)]
#[clap(
    name = "artifact-validator",
    about = "Validate forensic artifact definition files"
)]
pub struct Args {
    /// Definition files or directories to validate; directories are
    /// searched recursively for *.yaml files
    #[clap(required = true)]
    pub paths: Vec<PathBuf>,

    /// Show common flaws as well
    #[clap(short, long)]
    pub verbose: bool,

    /// Hide informational flaws
    #[clap(short, long)]
    pub quiet: bool,

    /// Show a summary of the validated definitions
    #[clap(short, long)]
    pub summary: bool,

    /// Exit successfully even when flaws were found
    #[clap(long)]
    pub no_fail: bool,

    /// Tolerate unknown fields in definition files
    #[clap(long)]
    pub no_strict: bool,

    /// Print flaws as JSON instead of log lines
    #[clap(long)]
    pub json: bool,
}
