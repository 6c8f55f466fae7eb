//! Fatal errors for a single document.
//!
//! Anything here aborts the document it was raised for. Recoverable
//! anomalies (a mention claimed by two chains, conflicting pronouns,
//! unresolved speakers) are logged or folded into confidence instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("cannot decode annotation: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// `speaker` was neither a digit string nor a no-speaker sentinel
    #[error("sentence {sent_num}, token {index}: malformed speaker {value:?}")]
    MalformedSpeaker {
        sent_num: usize,
        index: usize,
        value: String,
    },

    #[error("sentence {sent_num} has no tokens")]
    EmptySentence { sent_num: usize },

    #[error("sentence {sent_num}: token at position {position} has index {index}")]
    InvalidTokenIndex {
        sent_num: usize,
        position: usize,
        index: usize,
    },

    #[error("coref chain {chain}: mention {id} has invalid span {sent_num}:{start}..{end}")]
    InvalidSpan {
        chain: String,
        id: u64,
        sent_num: usize,
        start: usize,
        end: usize,
    },

    #[error("coref mention id {0} appears more than once")]
    DuplicateCorefId(u64),

    /// A batch input record that could not be split into its columns
    #[error("malformed input record: {0}")]
    MalformedRecord(String),

    /// A second document in one batch with an id already taken
    #[error("duplicate document id {0:?}")]
    DuplicateDocumentId(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
