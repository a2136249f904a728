//! Fundamental types shared by every stage of the entailment distance engine.
//!
//! A [`Fragment`] is one sentence of dependency-parsed [`Token`]s. Alignment
//! judgments produced by an external lexical aligner arrive as an
//! [`AlignmentMap`], and user-supplied overrides as [`ManualAlignments`].

pub mod alignment;
pub mod kinds;
pub mod token;

pub use alignment::{AlignmentEntry, AlignmentMap, Direction, ManualAlignments};
pub use kinds::TransformationKinds;
pub use token::{Fragment, Token};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("alignment key '{0}' is not of the form T__H")]
    MalformedAlignmentKey(String),
    #[error("unknown direction '{0}', expected TtoH or HtoT")]
    UnknownDirection(String),
    #[error("unknown transformation kind '{0}'")]
    UnknownKind(String),
}
