use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use lexfold::dataset::{document_label_counts, read_jsonl_file, write_jsonl_file};
use lexfold::folds::{compute_folds, expand_to_rows, splits};
use lexfold::ingest::load_directory;
use lexfold::pipeline::preprocess;
use lexfold::Config;

#[derive(Parser, Debug)]
#[command(name = "lexfold")]
#[command(about = "Legal case corpus preprocessing and balanced cross-validation folds")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the labeled dataset from XML case directories
    Preprocess {
        /// Input directories holding XML case files (one document per file)
        #[arg(short, long, required = true)]
        input: Vec<PathBuf>,

        /// Output dataset path (JSON Lines)
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Partition a previously extracted dataset into balanced folds
    Folds {
        /// Dataset path (JSON Lines, from `preprocess`)
        #[arg(short, long)]
        input: PathBuf,

        /// Output fold report path (JSON)
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Everything downstream model code needs: document- and row-level masks
/// plus per-fold train/test row indices.
#[derive(Serialize)]
struct FoldReport {
    num_folds: usize,
    objective: f64,
    proved_optimal: bool,
    document_masks: Vec<Vec<bool>>,
    row_masks: Vec<Vec<bool>>,
    splits: Vec<Split>,
}

#[derive(Serialize)]
struct Split {
    train: Vec<usize>,
    test: Vec<usize>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Command::Preprocess { input, output } => run_preprocess(&config, &input, &output),
        Command::Folds { input, output } => run_folds(&config, &input, &output),
    }
}

fn run_preprocess(config: &Config, inputs: &[PathBuf], output: &PathBuf) -> Result<()> {
    let mut documents = Vec::new();
    for directory in inputs {
        documents.extend(
            load_directory(directory)
                .with_context(|| format!("Failed to load {}", directory.display()))?,
        );
    }
    log::info!("Loaded {} documents total", documents.len());

    let rows = preprocess(documents, config)?;
    write_jsonl_file(&rows, output)?;
    Ok(())
}

fn run_folds(config: &Config, input: &PathBuf, output: &PathBuf) -> Result<()> {
    let rows = read_jsonl_file(input)
        .with_context(|| format!("Failed to read dataset {}", input.display()))?;
    log::info!("Read {} rows from {}", rows.len(), input.display());

    let counts = document_label_counts(&rows);
    let assignment = compute_folds(&counts, &config.folds)?;

    let row_documents: Vec<usize> = rows.iter().map(|row| row.document_index).collect();
    let row_masks = expand_to_rows(&assignment.masks, &row_documents);
    let pairs = splits(&row_masks);

    let report = FoldReport {
        num_folds: assignment.num_folds(),
        objective: assignment.objective,
        proved_optimal: assignment.proved_optimal,
        document_masks: assignment.masks,
        row_masks,
        splits: pairs
            .into_iter()
            .map(|(train, test)| Split { train, test })
            .collect(),
    };

    let file = std::fs::File::create(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    serde_json::to_writer_pretty(file, &report)?;
    log::info!("Wrote fold report to {}", output.display());
    Ok(())
}
