//! Reading dependency parses in CoNLL-X form.
//!
//! Each non-blank line is one token with ten whitespace-separated fields:
//!
//! ```text
//! 3   ball   ball   NN   _   _   6   nsubj   _   _
//! ```
//!
//! Ids and heads are 1-based in the file and 0-based once read; a head of
//! `_` or `0` marks a root. Blank lines separate sentences.

pub mod manual;
pub mod preprocess;
pub mod reader;

pub use manual::read_manual_alignments;
pub use preprocess::{merge_sentences, remove_punctuation};
pub use reader::{parse_sentence, read_sentences};

use thiserror::Error;

/// Malformed input. Line numbers are 1-based positions in the text that was
/// handed to the reader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConllxError {
    #[error("line {line}: expected 10 fields, found {found}")]
    FieldCount { line: usize, found: usize },
    #[error("line {line}: {field} '{value}' is not a number")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },
    #[error("line {line}: token id {found}, expected {expected}")]
    NonSequentialId {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: head {head} is outside a sentence of {len} tokens")]
    HeadOutOfRange { line: usize, head: usize, len: usize },
    #[error("line {line}: a second sentence starts here, expected exactly one")]
    MultipleSentences { line: usize },
    #[error("line {line}: expected 'form_POS<TAB>form_POS'")]
    ManualAlignment { line: usize },
}
