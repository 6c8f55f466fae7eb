//! First-name gender dictionary.
//!
//! The engine never guesses gender from a name. Callers that want a
//! fallback for people with no honorific or pronoun evidence apply this
//! table to the finished report.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use person_types::{Confidence, DocumentReport, Gender, GenderSource, GenderVerdict};

use crate::error::Result;
use crate::TARGET_RESOLVE;

/// A dictionary value: one gender, or several with the likeliest first.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum NameEntry {
    Definite(Gender),
    Ambiguous(Vec<Gender>),
}

impl NameEntry {
    fn verdict(&self) -> Option<GenderVerdict> {
        let (gender, confidence) = match self {
            NameEntry::Definite(g) => (*g, Confidence::Medium),
            NameEntry::Ambiguous(list) => match list.as_slice() {
                [] => return None,
                [only] => (*only, Confidence::Medium),
                [likeliest, ..] => (*likeliest, Confidence::Low),
            },
        };
        if gender == Gender::Unknown {
            return None;
        }
        Some(GenderVerdict::new(gender, confidence, GenderSource::NameOnly))
    }

    fn is_definite(&self) -> bool {
        matches!(self, NameEntry::Definite(_)) || matches!(self, NameEntry::Ambiguous(l) if l.len() == 1)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NameGenderTable {
    #[serde(default)]
    first_names: HashMap<String, NameEntry>,
    /// Whole-name overrides for first names that are missing or ambiguous
    #[serde(default)]
    full_names: HashMap<String, NameEntry>,
}

impl NameGenderTable {
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: NameGenderTable = serde_json::from_str(json)?;
        Ok(raw.normalized())
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    fn normalized(self) -> Self {
        let upper = |map: HashMap<String, NameEntry>| {
            map.into_iter()
                .map(|(k, v)| (k.trim().to_uppercase(), v))
                .collect()
        };
        NameGenderTable {
            first_names: upper(self.first_names),
            full_names: upper(self.full_names),
        }
    }

    pub fn len(&self) -> usize {
        self.first_names.len() + self.full_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Guess a gender from a full name. A leading "Dr." is skipped.
    pub fn lookup(&self, name: &str) -> Option<GenderVerdict> {
        let upper = name.to_uppercase();
        let words: Vec<&str> = upper.split_whitespace().collect();
        let first = match words.as_slice() {
            ["DR.", next, ..] => *next,
            [first, ..] => *first,
            [] => return None,
        };

        let by_first = self.first_names.get(first);
        if let Some(entry) = by_first.filter(|e| e.is_definite()) {
            return entry.verdict();
        }
        let full = words.join(" ");
        if let Some(verdict) = self.full_names.get(&full).and_then(NameEntry::verdict) {
            return Some(verdict);
        }
        by_first.and_then(NameEntry::verdict)
    }

    /// Fill in a verdict for every entity that has none and whose members
    /// did not disagree. Returns how many entities were filled.
    pub fn apply(&self, report: &mut DocumentReport) -> usize {
        let mut filled = 0;
        for record in report.entities.values_mut() {
            if record.verdict().is_some() || record.gender_conflict {
                continue;
            }
            if let Some(verdict) = self.lookup(&record.name) {
                record.set_verdict(verdict);
                filled += 1;
            }
        }
        debug!(target: TARGET_RESOLVE, "name lookup filled {filled} entities");
        filled
    }
}
