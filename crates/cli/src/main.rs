use anyhow::Context;
use clap::{Parser, Subcommand};
use hc_core::{
    normalize, process_bytes, render, BillingSummary, DocumentExtractor, ExportFormat,
    ExtractionConfig, ExtractionMode, PlainTextSource, ProcessedDocument, TextSource,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "hc")]
#[command(about = "Billing extraction for clinical records")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the billing document from a plain-text clinical record
    Extract {
        /// Path to the record (plain text, pages separated by form feeds)
        file: PathBuf,
        /// Output format: json or yaml
        #[arg(long, default_value = "json")]
        format: ExportFormat,
        /// Extraction mode (pattern_based or ai_assisted)
        #[arg(long, default_value = "pattern_based")]
        mode: ExtractionMode,
        /// Lines scanned after an anchor for satellite attributes
        #[arg(long, default_value_t = hc_core::constants::DEFAULT_SATELLITE_WINDOW)]
        window: usize,
    },
    /// Print the billing summary of a record
    Summary {
        /// Path to the record
        file: PathBuf,
    },
    /// Print the normalised text the extractors see
    Normalize {
        /// Path to the record
        file: PathBuf,
    },
    /// Write the extracted document to a directory
    Export {
        /// Path to the record
        file: PathBuf,
        /// Output format: json, yaml or csv
        #[arg(long)]
        format: ExportFormat,
        /// Output directory (created if missing)
        #[arg(long)]
        out: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(command) => {
            let stdout = std::io::stdout();
            if let Err(e) = run(command, &mut stdout.lock()) {
                eprintln!("Error: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Use 'hc --help' for commands");
        }
    }
}

fn run(command: Commands, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Commands::Extract {
            file,
            format,
            mode,
            window,
        } => {
            let config = ExtractionConfig::new(
                mode,
                window,
                ExtractionConfig::default().ai_timeout(),
            )?;
            if format == ExportFormat::Csv {
                anyhow::bail!("csv produces several files, use 'hc export --format csv'");
            }
            let processed = process_file(&file, &DocumentExtractor::new(config))?;
            let files = render(&processed.document, format)?;
            for rendered in files {
                out.write_all(&rendered.bytes)?;
            }
            writeln!(out)?;
        }
        Commands::Summary { file } => {
            let processed = process_file(&file, &DocumentExtractor::new(Default::default()))?;
            let summary = BillingSummary::from_document(&processed.document);
            writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
        }
        Commands::Normalize { file } => {
            let bytes = read_file(&file)?;
            let source = PlainTextSource::new(ExtractionConfig::default().max_pages());
            let decoded = source.extract_text(&bytes)?;
            writeln!(out, "{}", normalize(Some(&decoded.text)))?;
        }
        Commands::Export {
            file,
            format,
            out: dir,
        } => {
            let processed = process_file(&file, &DocumentExtractor::new(Default::default()))?;
            std::fs::create_dir_all(&dir)?;
            for rendered in render(&processed.document, format)? {
                let path = dir.join(&rendered.file_name);
                std::fs::write(&path, &rendered.bytes)?;
                writeln!(out, "Wrote {}", path.display())?;
            }
        }
    }
    Ok(())
}

fn process_file(
    path: &Path,
    extractor: &DocumentExtractor,
) -> anyhow::Result<Arc<ProcessedDocument>> {
    let bytes = read_file(path)?;
    let source = PlainTextSource::new(extractor.config().max_pages());
    Ok(process_bytes(&source, &bytes, extractor, None)?)
}

fn read_file(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}
