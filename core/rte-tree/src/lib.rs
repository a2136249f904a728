//! Ordered labeled trees and the edit distance between them.
//!
//! [`LabeledTree`] turns a [`rte_protocol::Fragment`] into parent/label/token
//! arrays and computes every node's relation path to the root.
//! [`TreeEditDistance`] runs Zhang-Shasha over two trees under any
//! [`EditScore`] and rebuilds the cheapest [`Mapping`].

pub mod distance;
pub mod mapping;
pub mod score;
pub mod tree;

pub use distance::TreeEditDistance;
pub use mapping::{Mapping, Operation};
pub use score::{EditScore, FormScore};
pub use tree::LabeledTree;

use thiserror::Error;

/// Structural defects found while building a tree. Fatal for the pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("tree arrays differ in length: {parents} parents, {labels} labels, {tokens} tokens")]
    LengthMismatch {
        parents: usize,
        labels: usize,
        tokens: usize,
    },
    #[error("node {node} has head {head}, outside a tree of {size} nodes")]
    DanglingHead { node: usize, head: usize, size: usize },
    #[error("node {node} carries label {label}; labels must follow token order")]
    LabelMismatch { node: usize, label: usize },
    #[error("parent pointers form a cycle through node {node}")]
    Cycle { node: usize },
}
