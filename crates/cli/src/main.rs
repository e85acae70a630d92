//! CLI tool for filling PowerPoint templates with intended content.

use anyhow::{Context, Result};
use clap::Parser;
use deckfill_core::{Engine, EngineConfig, IntendedContent, RunReport, VerificationStatus};
use deckfill_pptx::PptxPackage;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Fill a PowerPoint deck with intended content, verify it and repair
/// mismatches.
#[derive(Parser, Debug)]
#[command(name = "deckfill")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Template deck (.pptx)
    deck: PathBuf,

    /// Intended content (JSON)
    intent: PathBuf,

    /// Output deck (default: <stem>.filled.pptx next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Engine configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Repair critical mismatches after verification
    #[arg(short, long)]
    repair: bool,

    /// Write the full run report as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    /// Process slides in parallel
    #[arg(short, long)]
    parallel: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let intent = IntendedContent::load(&args.intent)
        .with_context(|| format!("Failed to load intent {}", args.intent.display()))?;

    let mut package = PptxPackage::open_path(&args.deck)
        .with_context(|| format!("Failed to open {}", args.deck.display()))?;
    if args.verbose {
        eprintln!("Loaded {} slides from {}", package.document().len(), args.deck.display());
    }

    let engine = Engine::new(config);
    let report = if args.parallel {
        engine.run_parallel(package.document_mut(), &intent, args.repair)
    } else {
        engine.run(package.document_mut(), &intent, args.repair)
    };

    let output_path = get_output_path(&args.deck, args.output.as_ref());
    package
        .save_path(&output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    eprintln!("Written to: {}", output_path.display());

    if let Some(path) = &args.report {
        write_report(path, &report)?;
        if args.verbose {
            eprintln!("Report written to: {}", path.display());
        }
    }

    print_summary(&report, args.verbose);

    Ok(match report.final_report().status {
        VerificationStatus::Fail => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

/// Determine the output path for the filled deck.
fn get_output_path(deck: &Path, output: Option<&PathBuf>) -> PathBuf {
    if let Some(path) = output {
        return path.clone();
    }

    let stem = deck
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let filename = format!("{}.filled.pptx", stem);

    match deck.parent() {
        Some(parent) => parent.join(filename),
        None => PathBuf::from(filename),
    }
}

/// Write the run report as pretty JSON.
fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .with_context(|| format!("Failed to write to {}", path.display()))?;
    Ok(())
}

fn print_summary(report: &RunReport, verbose: bool) {
    eprintln!(
        "Matched {} items, {} unmatched",
        report.fill.matched_count(),
        report.fill.unmatched_count()
    );
    for annotation in &report.fill.annotations {
        log::warn!("{:?}", annotation);
    }

    let verification = &report.verification;
    eprintln!(
        "Verification: {}/{} passed ({:.1}%), {} critical, {} warnings",
        verification.passed,
        verification.total_items,
        verification.success_rate * 100.0,
        verification.critical_count(),
        verification.warning_count()
    );

    if let Some(repair) = &report.repair {
        eprintln!(
            "Repair: {}/{} fixed, success rate {:.1}% -> {:.1}%",
            repair.successful_count(),
            repair.attempted_count(),
            repair.pre_success_rate * 100.0,
            repair.post_success_rate * 100.0
        );
        for (strategy, count) in &repair.strategy_breakdown {
            eprintln!("  {}: {}", strategy, count);
        }
    }

    let last = report.final_report();
    if verbose {
        for mismatch in last.mismatches() {
            eprintln!(
                "  slide {} item {}: {:?} {:?} (expected {:?}, found {:?})",
                mismatch.slide_index + 1,
                mismatch.item,
                mismatch.severity,
                mismatch.kind,
                mismatch.expected,
                mismatch.actual
            );
        }
    }
    eprintln!("Status: {:?}", last.status);
}
