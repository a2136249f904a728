mod input;

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use rte_distance::{DistanceResult, FeatureIndex, FixedWeightEditDistance};
use rte_protocol::AlignmentMap;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::input::PairRecord;

#[derive(Parser)]
#[command(author, version, about = "Tree edit distance between Text and Hypothesis dependency parses")]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare one pair of CoNLL-X files.
    Pair {
        #[arg(short, long, value_name = "FILE")]
        text: PathBuf,

        #[arg(short = 'H', long, value_name = "FILE")]
        hypothesis: PathBuf,

        /// Also print the rendered features of the enabled kinds.
        #[arg(long)]
        features: bool,

        #[command(flatten)]
        shared: Shared,
    },
    /// Compare every pair of a JSON-lines file, one result per line.
    Batch {
        #[arg(short, long, value_name = "FILE")]
        pairs: PathBuf,

        /// Write the feature index learned from all pairs.
        #[arg(long, value_name = "FILE", conflicts_with = "read_index")]
        write_index: Option<PathBuf>,

        /// Encode each pair against an existing feature index.
        #[arg(long, value_name = "FILE")]
        read_index: Option<PathBuf>,

        #[command(flatten)]
        shared: Shared,
    },
}

#[derive(Args)]
struct Shared {
    /// Aligner output: a JSON array of { key: "T__H", link_info, strength, direction }.
    #[arg(short, long, value_name = "FILE")]
    alignments: Option<PathBuf>,

    /// Manual alignment list, `form_POS<TAB>form_POS` per line.
    #[arg(short, long, value_name = "FILE")]
    manual: Option<PathBuf>,

    /// JSON distance configuration.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Shared {
    fn component(&self) -> Result<FixedWeightEditDistance> {
        let config = input::load_config(self.config.as_deref())?;
        let manual = input::load_manual(self.manual.as_deref())?;
        tracing::info!(mode = %config.alignment_mode, manual = manual.len(), "distance component ready");
        Ok(FixedWeightEditDistance::new(config).with_manual_alignments(manual))
    }
}

#[derive(Serialize)]
struct PairOutput<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(flatten)]
    result: &'a DistanceResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    encoded: Option<Vec<usize>>,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Pair {
            text,
            hypothesis,
            features,
            shared,
        } => run_pair(&text, &hypothesis, features, &shared),
        Command::Batch {
            pairs,
            write_index,
            read_index,
            shared,
        } => run_batch(&pairs, write_index, read_index, &shared),
    }
}

fn run_pair(text: &Path, hypothesis: &Path, features: bool, shared: &Shared) -> Result<()> {
    let component = shared.component()?;
    let config = component.config();

    let t = input::fragment(&input::read_file(text)?, config)
        .with_context(|| format!("malformed text {}", text.display()))?;
    let h = input::fragment(&input::read_file(hypothesis)?, config)
        .with_context(|| format!("malformed hypothesis {}", hypothesis.display()))?;
    let alignments = input::alignment_map(&input::load_alignments(shared.alignments.as_deref())?)?;

    let result = component.calculate(&t, &h, &alignments)?;
    let output = PairOutput {
        id: None,
        result: &result,
        features: features.then(|| result.features(config.enabled)),
        encoded: None,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &output)?;
    writeln!(out)?;
    Ok(())
}

/// Pair-specific alignments are consulted before the global ones.
fn measure(
    component: &FixedWeightEditDistance,
    record: &PairRecord,
    global: &AlignmentMap,
) -> Result<DistanceResult> {
    let config = component.config();
    let t = input::fragment(&record.text, config).context("malformed text")?;
    let h = input::fragment(&record.hypothesis, config).context("malformed hypothesis")?;
    let alignments = input::pair_alignments(&record.alignments, global).context("malformed pair alignments")?;
    Ok(component.calculate(&t, &h, &alignments)?)
}

fn run_batch(
    pairs: &Path,
    write_index: Option<PathBuf>,
    read_index: Option<PathBuf>,
    shared: &Shared,
) -> Result<()> {
    let component = shared.component()?;
    let config = component.config();
    let global = input::alignment_map(&input::load_alignments(shared.alignments.as_deref())?)
        .context("invalid global alignments")?;
    tracing::debug!(alignments = global.len(), "global alignments loaded");
    let index: Option<FeatureIndex> = match &read_index {
        Some(path) => Some(
            serde_json::from_str(&input::read_file(path)?)
                .with_context(|| format!("invalid feature index in {}", path.display()))?,
        ),
        None => None,
    };

    let content = input::read_file(pairs)?;
    let records: Vec<(usize, PairRecord)> = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(number, line)| match serde_json::from_str(line) {
            Ok(record) => Some((number + 1, record)),
            Err(err) => {
                tracing::warn!(line = number + 1, error = %err, "skipping unreadable pair");
                None
            }
        })
        .collect();
    tracing::info!(pairs = records.len(), "batch loaded");

    let results: Vec<Option<(PairRecord, DistanceResult)>> = records
        .into_par_iter()
        .map(|(line, record)| {
            match measure(&component, &record, &global) {
                Ok(result) => Some((record, result)),
                Err(err) => {
                    tracing::warn!(line, id = %record.id, error = %format!("{:#}", err), "skipping pair");
                    None
                }
            }
        })
        .collect();

    let mut learned = FeatureIndex::new();
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut written = 0;
    for (record, result) in results.iter().flatten() {
        if write_index.is_some() {
            learned.observe(result, config.enabled);
        }
        let output = PairOutput {
            id: Some(record.id.as_str()),
            result,
            features: None,
            encoded: index.as_ref().map(|index| index.encode(result, config.enabled)),
        };
        serde_json::to_writer(&mut out, &output)?;
        writeln!(out)?;
        written += 1;
    }
    out.flush()?;

    if let Some(path) = write_index {
        tracing::info!(features = learned.len() - 1, "writing feature index");
        fs::write(&path, serde_json::to_string_pretty(&learned)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    tracing::info!(written, skipped = results.len() - written, "batch done");
    Ok(())
}
