//! Entailment distance between a Text and a Hypothesis.
//!
//! [`FixedWeightEditDistance::calculate`] builds a [`rte_tree::LabeledTree`]
//! for each side, runs the tree edit distance under an [`AlignmentScore`]
//! and turns every edit operation into a [`Transformation`] labelled by the
//! [`AlignmentClassifier`]. The rendered transformations are the features
//! a downstream classifier learns from; [`FeatureIndex`] numbers them.

pub mod calculator;
pub mod classifier;
pub mod config;
pub mod features;
pub mod score;
pub mod transformation;

pub use calculator::{normalized_distance, DistanceResult, FixedWeightEditDistance};
pub use classifier::{AlignmentClassifier, Judgment, LocalAlignment};
pub use config::{AlignmentMode, DistanceConfig, Weights};
pub use features::{FeatureIndex, FAKE_ATTRIBUTE};
pub use score::AlignmentScore;
pub use transformation::Transformation;

use core::fmt;

use rte_tree::TreeError;
use thiserror::Error;

/// Which sentence of the pair a problem was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Text,
    Hypothesis,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Text => f.write_str("text"),
            Side::Hypothesis => f.write_str("hypothesis"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistanceError {
    #[error("malformed {side} tree: {source}")]
    MalformedTree {
        side: Side,
        #[source]
        source: TreeError,
    },
    #[error("{side} tree has {nodes} nodes, the limit is {limit}")]
    TreeTooLarge { side: Side, nodes: usize, limit: usize },
    #[error("unknown alignment mode '{0}', expected 'cost' or 'labels'")]
    UnknownMode(String),
}
