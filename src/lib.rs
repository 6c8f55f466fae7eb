//! Resolve person mentions in annotated news text into people, with a
//! consensus gender and the quotes each person spoke.
//!
//! Pipeline, one document at a time:
//!   extract → coref → gender → merge → quotes → roles
//!
//! Input is the sentence/token/coref JSON of an external annotation
//! service ([`annotation::Annotation`]); output is a
//! [`person_types::DocumentReport`].

pub mod annotation;
pub mod config;
pub mod coref;
pub mod engine;
pub mod error;
pub mod extract;
pub mod gender;
pub mod honorifics;
pub mod logging;
pub mod lookup;
pub mod mention;
pub mod merge;
pub mod quotes;
pub mod roles;
pub mod scanner;

pub use annotation::Annotation;
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{ResolveError, Result};
pub use lookup::NameGenderTable;
pub use merge::{Clusterer, GreedySubsetClusterer};

/// Log target for the resolution stages.
pub const TARGET_RESOLVE: &str = "resolve";
