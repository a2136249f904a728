use std::borrow::Cow;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rte_conllx::{merge_sentences, read_manual_alignments, read_sentences, remove_punctuation};
use rte_distance::DistanceConfig;
use rte_protocol::{AlignmentEntry, AlignmentMap, Fragment, ManualAlignments};
use serde::Deserialize;

/// One aligner judgment as stored on disk, keyed `T__H`.
#[derive(Debug, Clone, Deserialize)]
pub struct AlignmentRecord {
    pub key: String,
    #[serde(flatten)]
    pub entry: AlignmentEntry,
}

/// One line of a batch file.
#[derive(Debug, Clone, Deserialize)]
pub struct PairRecord {
    pub id: String,
    pub text: String,
    pub hypothesis: String,
    #[serde(default)]
    pub alignments: Vec<AlignmentRecord>,
}

pub fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn load_config(path: Option<&Path>) -> Result<DistanceConfig> {
    match path {
        Some(path) => serde_json::from_str(&read_file(path)?)
            .with_context(|| format!("invalid configuration in {}", path.display())),
        None => Ok(DistanceConfig::default()),
    }
}

pub fn load_manual(path: Option<&Path>) -> Result<ManualAlignments> {
    match path {
        Some(path) => read_manual_alignments(&read_file(path)?)
            .with_context(|| format!("invalid manual alignments in {}", path.display())),
        None => Ok(ManualAlignments::new()),
    }
}

pub fn load_alignments(path: Option<&Path>) -> Result<Vec<AlignmentRecord>> {
    match path {
        Some(path) => serde_json::from_str(&read_file(path)?)
            .with_context(|| format!("invalid alignments in {}", path.display())),
        None => Ok(Vec::new()),
    }
}

/// Builds the lookup map; earlier records win over later ones for the same pair.
pub fn alignment_map<'a, I>(records: I) -> Result<AlignmentMap>
where
    I: IntoIterator<Item = &'a AlignmentRecord>,
{
    let mut map = AlignmentMap::new();
    for record in records {
        if !map.insert_keyed(&record.key, record.entry.clone())? {
            tracing::debug!(key = %record.key, "duplicate alignment ignored");
        }
    }
    Ok(map)
}

/// Alignments for one pair: its own records, then whatever `global` holds
/// for pairs the records do not cover. Borrows `global` when the pair has no
/// records of its own.
pub fn pair_alignments<'a>(records: &[AlignmentRecord], global: &'a AlignmentMap) -> Result<Cow<'a, AlignmentMap>> {
    if records.is_empty() {
        return Ok(Cow::Borrowed(global));
    }
    let mut map = alignment_map(records)?;
    map.fill_from(global);
    Ok(Cow::Owned(map))
}

/// Reads a CoNLL-X text, optionally without punctuation, merged into one tree.
pub fn fragment(conllx: &str, config: &DistanceConfig) -> Result<Fragment> {
    let sentences = read_sentences(conllx)?;
    let sentences = sentences.into_iter().map(|sentence| {
        if config.remove_punctuation {
            remove_punctuation(&sentence)
        } else {
            sentence
        }
    });
    Ok(merge_sentences(sentences))
}
