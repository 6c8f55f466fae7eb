use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ── Gender verdicts ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    /// No evidence, or members of an entity disagree.
    Unknown,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "MALE"),
            Gender::Female => write!(f, "FEMALE"),
            Gender::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Confidence tier of a gender verdict. Ordered: `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Confidence {
    #[serde(rename = "LOW_CONFIDENCE")]
    Low,
    #[serde(rename = "MEDIUM_CONFIDENCE")]
    Medium,
    #[serde(rename = "HIGH_CONFIDENCE")]
    High,
}

/// Which kind of evidence produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenderSource {
    /// A gendered title (Mr., Ms., ...) right before the name
    Honorific,
    /// Gendered pronouns in the name's coreference chain
    Coref,
    /// First-name dictionary lookup, applied by the caller
    NameOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderVerdict {
    pub gender: Gender,
    pub confidence: Confidence,
    pub source: GenderSource,
}

impl GenderVerdict {
    pub fn new(gender: Gender, confidence: Confidence, source: GenderSource) -> Self {
        GenderVerdict {
            gender,
            confidence,
            source,
        }
    }
}

// ── Spans and quotes ─────────────────────────────────────────────────────

/// Position of one mention: 1-based sentence, 1-based token range, end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MentionSpan {
    pub sent_num: usize,
    pub start: usize,
    pub end: usize,
}

/// A single quoted token attributed to a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteToken {
    pub sent_num: usize,
    pub index: usize,
    pub text: String,
    /// Whitespace that preceded the token in the source text
    #[serde(default)]
    pub before: String,
}

/// Whether a person acts as a source in the document, and why.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerStatus {
    pub is_speaker: bool,
    /// Human-readable evidence: "Quoted", "Subject of said", ...
    #[serde(default)]
    pub reasons: Vec<String>,
}

impl SpeakerStatus {
    /// Record one piece of evidence; marks the person as a speaker.
    pub fn add_reason(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        if !self.reasons.contains(&reason) {
            self.reasons.push(reason);
        }
        self.is_speaker = true;
    }
}

// ── Resolved people ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub usize);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Longest surface text among the member mentions
    pub name: String,
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender_source: Option<GenderSource>,
    /// Members carried different genders
    #[serde(default)]
    pub gender_conflict: bool,
    pub mention_count: usize,
    pub mentions: Vec<MentionSpan>,
    pub quotes: Vec<QuoteToken>,
    /// Verbs the person is the subject of, sorted
    #[serde(default)]
    pub associated_verbs: Vec<String>,
    /// Adjectives describing the person, sorted
    #[serde(default)]
    pub associated_adjs: Vec<String>,
    #[serde(default)]
    pub speaker: SpeakerStatus,
}

impl EntityRecord {
    /// A record with no mentions and no gender evidence yet.
    pub fn new(name: impl Into<String>) -> Self {
        EntityRecord {
            name: name.into(),
            gender: Gender::Unknown,
            confidence: None,
            gender_source: None,
            gender_conflict: false,
            mention_count: 0,
            mentions: Vec::new(),
            quotes: Vec::new(),
            associated_verbs: Vec::new(),
            associated_adjs: Vec::new(),
            speaker: SpeakerStatus::default(),
        }
    }

    /// The verdict, if the entity has a resolved gender.
    pub fn verdict(&self) -> Option<GenderVerdict> {
        match (self.gender, self.confidence, self.gender_source) {
            (Gender::Unknown, _, _) => None,
            (gender, Some(confidence), Some(source)) => {
                Some(GenderVerdict::new(gender, confidence, source))
            }
            _ => None,
        }
    }

    pub fn set_verdict(&mut self, verdict: GenderVerdict) {
        self.gender = verdict.gender;
        self.confidence = Some(verdict.confidence);
        self.gender_source = Some(verdict.source);
    }

    pub fn is_speaker(&self) -> bool {
        self.speaker.is_speaker
    }

    /// Re-render the attributed quote tokens as running text.
    pub fn quote_text(&self) -> String {
        let mut out = String::new();
        for token in &self.quotes {
            out.push_str(&token.before);
            out.push_str(&token.text);
        }
        out.trim_start().to_string()
    }
}

/// Everything resolved from one annotated document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReport {
    pub entities: BTreeMap<EntityId, EntityRecord>,
    /// Quoted tokens whose speaker did not resolve to any entity
    #[serde(default)]
    pub unattributed_quote_tokens: usize,
}

impl DocumentReport {
    pub fn speakers(&self) -> impl Iterator<Item = (&EntityId, &EntityRecord)> {
        self.entities.iter().filter(|(_, e)| e.is_speaker())
    }

    pub fn total_mentions(&self) -> usize {
        self.entities.values().map(|e| e.mention_count).sum()
    }
}
