use core::fmt;

use rte_protocol::{AlignmentMap, Direction, ManualAlignments, Token};
use serde::{Deserialize, Serialize};

/// Local relation between a T token and the H token replacing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum Judgment {
    LocalEntailment,
    LocalContradiction,
    Unknown,
}

impl fmt::Display for Judgment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Judgment::LocalEntailment => f.write_str("LOCAL-ENTAILMENT"),
            Judgment::LocalContradiction => f.write_str("LOCAL-CONTRADICTION"),
            Judgment::Unknown => f.write_str("UNKNOWN"),
        }
    }
}

/// A judgment and, when the aligner supplied it, `<link info>:<direction>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAlignment {
    pub judgment: Judgment,
    pub info: Option<String>,
}

/// Three-way judge over token pairs, backed by the aligner output and the
/// user's manual list.
#[derive(Debug, Clone, Copy)]
pub struct AlignmentClassifier<'a> {
    alignments: &'a AlignmentMap,
    manual: &'a ManualAlignments,
}

impl<'a> AlignmentClassifier<'a> {
    pub fn new(alignments: &'a AlignmentMap, manual: &'a ManualAlignments) -> Self {
        Self { alignments, manual }
    }

    /// `None` when the relations differ or nothing is known about the pair.
    ///
    /// Same lemma (ignoring case) or a manual pair is entailment. Otherwise
    /// an aligner entry decides: H→T is unknown, an antonym link is
    /// contradiction, anything else entailment.
    pub fn classify(&self, t: &Token, h: &Token) -> Option<LocalAlignment> {
        if t.deprel() != h.deprel() {
            return None;
        }

        if lexically_identical(t, h) || self.manual.contains(t, h) {
            return Some(LocalAlignment {
                judgment: Judgment::LocalEntailment,
                info: None,
            });
        }

        let entry = self.alignments.lookup(t, h)?;
        let judgment = if entry.direction == Direction::HtoT {
            Judgment::Unknown
        } else if entry.is_antonym() {
            Judgment::LocalContradiction
        } else {
            Judgment::LocalEntailment
        };

        Some(LocalAlignment {
            judgment,
            info: Some(entry.describe()),
        })
    }

    pub fn entails(&self, t: &Token, h: &Token) -> bool {
        matches!(
            self.classify(t, h),
            Some(LocalAlignment {
                judgment: Judgment::LocalEntailment,
                ..
            })
        )
    }
}

/// Same relation and same lemma, case aside.
pub fn lexically_identical(t: &Token, h: &Token) -> bool {
    t.deprel() == h.deprel() && t.lemma().to_lowercase() == h.lemma().to_lowercase()
}
