use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, info, warn, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use walkdir::WalkDir;

use rust_artifacts::cli::Args;
use rust_artifacts::decode::Decoder;
use rust_artifacts::definitions::ArtifactDefinition;
use rust_artifacts::validate::{validate_files_with, Flaw, Severity};

fn main() -> Result<()> {
    let args = Args::parse();
    initialize_logging(&args)?;

    let files = collect_definition_files(&args.paths);
    let decoder = Decoder::with_strict(!args.no_strict);

    let flaws = validate_files_with(&files, &decoder);
    let flaws = filter_by_severity(flaws, &args);

    let failed = !flaws.is_empty();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&flaws)?);
    } else {
        print_flaws(&flaws);
    }

    if args.summary {
        print_summary(&files, &decoder)?;
    }

    if failed && !args.no_fail {
        std::process::exit(1);
    }
    Ok(())
}

/// Initialize logging with the verbosity level the flags ask for
fn initialize_logging(args: &Args) -> Result<()> {
    let log_level = if args.verbose {
        LevelFilter::Debug
    } else if args.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .context("Failed to initialize logger")?;
    Ok(())
}

/// Resolve the positional arguments into definition files. Directories
/// are searched recursively for `*.yaml` files; plain file arguments are
/// kept as given so validation can report unreadable ones.
fn collect_definition_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|path| path.extension().map(|ext| ext == "yaml").unwrap_or(false))
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    files
}

/// Reduce the flaw list to the severities the flags ask for: everything
/// with `--verbose`, warnings and above with `--quiet`, informational and
/// above otherwise.
fn filter_by_severity(flaws: Vec<Flaw>, args: &Args) -> Vec<Flaw> {
    if args.verbose {
        return flaws;
    }
    flaws
        .into_iter()
        .filter(|flaw| {
            flaw.severity >= Severity::Warning || (!args.quiet && flaw.severity == Severity::Info)
        })
        .collect()
}

fn print_flaws(flaws: &[Flaw]) {
    for flaw in flaws {
        let line = format!("{:<60} {:<30} {}", flaw.file, flaw.artifact, flaw.message);
        match flaw.severity {
            Severity::Common => debug!("{line}"),
            Severity::Info => info!("{line}"),
            Severity::Warning => warn!("{line}"),
            Severity::Error => error!("{line}"),
        }
    }
}

/// Print corpus counts: artifacts overall and per source type, OS and
/// label.
fn print_summary(files: &[PathBuf], decoder: &Decoder) -> Result<()> {
    let mut definitions: Vec<ArtifactDefinition> = Vec::new();
    for file in files {
        let (decoded, _) = decoder.decode_file(file)?;
        definitions.extend(decoded);
    }

    println!("\nFound {} artifacts", definitions.len());
    if definitions.is_empty() {
        return Ok(());
    }

    let mut source_types: BTreeMap<String, usize> = BTreeMap::new();
    let mut oses: BTreeMap<String, usize> = BTreeMap::new();
    let mut labels: BTreeMap<String, usize> = BTreeMap::new();
    for definition in &definitions {
        for source in &definition.sources {
            *source_types
                .entry(source.source_type.to_string())
                .or_default() += 1;
        }
        for supported_os in &definition.supported_os {
            *oses.entry(supported_os.clone()).or_default() += 1;
        }
        for label in &definition.labels {
            *labels.entry(label.clone()).or_default() += 1;
        }
    }

    print_counts("Artifact definitions by type", &source_types);
    print_counts("Artifact definitions by OS", &oses);
    print_counts("Artifact definitions by label", &labels);
    Ok(())
}

fn print_counts(caption: &str, counts: &BTreeMap<String, usize>) {
    println!("\n{caption}");
    for (key, count) in counts {
        println!("  {key:<30} {count}");
    }
}
