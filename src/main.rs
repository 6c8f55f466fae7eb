use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use person_resolve::logging::configure_logging;
use person_resolve::scanner::{scan_documents, PendingDocument};
use person_resolve::{Engine, EngineConfig, NameGenderTable};
use person_types::{DocumentReport, Gender};

const OUTPUT_DIR: &str = "output";

#[derive(Parser)]
#[command(
    name = "person_resolve",
    about = "Resolve people, gender and quotes from annotated news text"
)]
struct Cli {
    /// Engine configuration (JSON); defaults apply to missing keys
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// First-name gender dictionary (JSON), used for people with no other evidence
    #[arg(long, global = true)]
    names: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one annotation document and print the report
    Analyze {
        /// Annotation JSON with `sentences` and `corefs`
        file: PathBuf,
    },
    /// Analyze every document in a directory or annotated TSV file
    Batch {
        /// Directory of *.json annotations, or a .tsv of id/article/annotation rows
        path: PathBuf,
        /// Where per-document reports are written
        #[arg(long, default_value = OUTPUT_DIR)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    configure_logging();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_path(path)
            .with_context(|| format!("cannot load config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let engine = Engine::new(config).context("invalid engine configuration")?;

    let names = match &cli.names {
        Some(path) => {
            let table = NameGenderTable::from_path(path)
                .with_context(|| format!("cannot load name table {}", path.display()))?;
            info!("loaded {} name entries from {}", table.len(), path.display());
            Some(table)
        }
        None => None,
    };

    match cli.command {
        Command::Analyze { file } => run_analyze(&engine, names.as_ref(), &file),
        Command::Batch { path, output } => run_batch(&engine, names.as_ref(), &path, &output),
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  SINGLE DOCUMENT
// ═══════════════════════════════════════════════════════════════════════

fn run_analyze(engine: &Engine, names: Option<&NameGenderTable>, file: &Path) -> Result<()> {
    let json = std::fs::read_to_string(file)
        .with_context(|| format!("cannot read {}", file.display()))?;
    let report = analyze_one(engine, names, &json)
        .with_context(|| format!("cannot analyze {}", file.display()))?;

    log_summary(&file.display().to_string(), &report);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn analyze_one(
    engine: &Engine,
    names: Option<&NameGenderTable>,
    json: &str,
) -> person_resolve::Result<DocumentReport> {
    let mut report = engine.analyze_json(json)?;
    if let Some(table) = names {
        table.apply(&mut report);
    }
    Ok(report)
}

// ═══════════════════════════════════════════════════════════════════════
//  BATCH MODE: one report file per document, failures isolated
// ═══════════════════════════════════════════════════════════════════════

fn run_batch(engine: &Engine, names: Option<&NameGenderTable>, path: &Path, output: &Path) -> Result<()> {
    let docs = scan_documents(path).with_context(|| format!("cannot scan {}", path.display()))?;
    info!("found {} documents in {}", docs.len(), path.display());

    std::fs::create_dir_all(output)
        .with_context(|| format!("cannot create {}", output.display()))?;

    let mut stats = BatchStats::default();
    for doc in &docs {
        match process_document(engine, names, doc, output) {
            Ok(report) => stats.record(&report),
            Err(e) => {
                error!("document {} failed: {e:#}", doc.id);
                stats.failed += 1;
            }
        }
    }

    info!(
        "done: {} ok, {} failed; {} people ({} female, {} male, {} unknown), {} speakers",
        stats.ok, stats.failed, stats.people, stats.female, stats.male, stats.unknown, stats.speakers
    );
    Ok(())
}

fn process_document(
    engine: &Engine,
    names: Option<&NameGenderTable>,
    doc: &PendingDocument,
    output: &Path,
) -> Result<DocumentReport> {
    let json = doc.load()?;
    let report = analyze_one(engine, names, &json)?;
    write_json(&output.join(format!("{}.json", doc.id)), &report)?;
    log_summary(&doc.id, &report);
    Ok(report)
}

#[derive(Debug, Default)]
struct BatchStats {
    ok: usize,
    failed: usize,
    people: usize,
    female: usize,
    male: usize,
    unknown: usize,
    speakers: usize,
}

impl BatchStats {
    fn record(&mut self, report: &DocumentReport) {
        self.ok += 1;
        for entity in report.entities.values() {
            self.people += 1;
            match entity.gender {
                Gender::Female => self.female += 1,
                Gender::Male => self.male += 1,
                Gender::Unknown => self.unknown += 1,
            }
        }
        self.speakers += report.speakers().count();
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  OUTPUT HELPERS
// ═══════════════════════════════════════════════════════════════════════

fn write_json<T: serde::Serialize>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(data)?;
    std::fs::write(path, &json).with_context(|| format!("cannot write {}", path.display()))?;
    Ok(())
}

fn log_summary(id: &str, report: &DocumentReport) {
    info!(
        "{id}: {} people, {} mentions, {} speakers, {} unattributed quote tokens",
        report.entities.len(),
        report.total_mentions(),
        report.speakers().count(),
        report.unattributed_quote_tokens
    );
}
