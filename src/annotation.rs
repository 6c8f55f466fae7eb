//! Input side: the JSON the annotation service produces for one document.
//!
//! Only the fields the engine reads are modelled; everything else in the
//! service output is ignored on decode.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::{ResolveError, Result};

/// The named-entity tag that marks person tokens.
pub const PERSON_TAG: &str = "PERSON";

// Tokens outside any quote carry a generic speaker label: PER0, PER1, ...
static RE_NO_SPEAKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^PER\d+$").unwrap());

// ── Sentences and tokens ─────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct Annotation {
    pub sentences: Vec<Sentence>,
    /// Chain id → member descriptors. Sorted by chain id so processing
    /// order is reproducible.
    pub corefs: BTreeMap<String, Vec<CorefMention>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sentence {
    pub tokens: Vec<Token>,
    /// Basic dependency edges; absent when the parser did not run
    #[serde(default, rename = "basicDependencies")]
    pub dependencies: Vec<Dependency>,
}

impl Sentence {
    /// Token at a 1-based index. Index 0 is the parse root and has no token.
    pub fn token(&self, index: usize) -> Option<&Token> {
        index.checked_sub(1).and_then(|i| self.tokens.get(i))
    }
}

/// One edge of the dependency parse, between 1-based token indices.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Dependency {
    pub dep: String,
    pub governor: usize,
    pub dependent: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Token {
    #[serde(rename = "originalText")]
    pub original_text: String,
    /// 1-based position within the sentence
    pub index: usize,
    pub ner: String,
    #[serde(default)]
    pub speaker: Option<String>,
    #[serde(default)]
    pub before: String,
    /// Part-of-speech tag (Penn Treebank)
    #[serde(default)]
    pub pos: Option<String>,
    #[serde(default)]
    pub lemma: Option<String>,
}

impl Token {
    /// Tagged PERSON with some visible text. A blank token never names anyone.
    pub fn is_person(&self) -> bool {
        self.ner == PERSON_TAG && !self.original_text.trim().is_empty()
    }

    /// Lower-cased lemma, falling back to the surface text.
    pub fn word(&self) -> String {
        self.lemma
            .as_deref()
            .unwrap_or(&self.original_text)
            .to_lowercase()
    }

    pub fn pos_starts_with(&self, prefix: &str) -> bool {
        self.pos.as_deref().is_some_and(|p| p.starts_with(prefix))
    }

    /// The coref mention id of whoever speaks this token, if it is quoted.
    pub fn speaker_id(&self, sent_num: usize) -> Result<Option<u64>> {
        let raw = match self.speaker.as_deref().map(str::trim) {
            None | Some("") => return Ok(None),
            Some(s) => s,
        };
        if RE_NO_SPEAKER.is_match(raw) {
            return Ok(None);
        }
        if raw.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(id) = raw.parse::<u64>() {
                return Ok(Some(id));
            }
        }
        Err(ResolveError::MalformedSpeaker {
            sent_num,
            index: self.index,
            value: raw.to_string(),
        })
    }
}

// ── Coreference descriptors ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MentionType {
    Proper,
    Pronominal,
    Nominal,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Animacy {
    Animate,
    Inanimate,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Number {
    Singular,
    Plural,
    #[serde(other)]
    Unknown,
}

/// The annotator's own gender tag. Only trusted on pronouns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RawGender {
    Male,
    Female,
    Neutral,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorefMention {
    pub id: u64,
    #[serde(rename = "sentNum")]
    pub sent_num: usize,
    /// 1-based, inclusive
    #[serde(rename = "startIndex")]
    pub start_index: usize,
    /// 1-based, exclusive
    #[serde(rename = "endIndex")]
    pub end_index: usize,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MentionType,
    pub animacy: Animacy,
    pub number: Number,
    pub gender: RawGender,
}

impl CorefMention {
    pub fn is_pronoun(&self) -> bool {
        self.kind == MentionType::Pronominal
    }

    /// Singular, animate proper noun: the only descriptors allowed to claim
    /// a person mention they merely enclose.
    pub fn is_named_individual(&self) -> bool {
        self.kind == MentionType::Proper
            && self.animacy == Animacy::Animate
            && self.number == Number::Singular
    }
}

// ── Decoding ─────────────────────────────────────────────────────────────

impl Annotation {
    /// Decode and validate one document.
    pub fn from_json(json: &str) -> Result<Self> {
        let ann: Annotation = serde_json::from_str(json)?;
        ann.validate()?;
        Ok(ann)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let ann: Annotation = serde_json::from_value(value)?;
        ann.validate()?;
        Ok(ann)
    }

    /// Sentences paired with their 1-based sentence number.
    pub fn numbered_sentences(&self) -> impl Iterator<Item = (usize, &Sentence)> {
        self.sentences.iter().enumerate().map(|(i, s)| (i + 1, s))
    }

    /// Check the structural preconditions the engine relies on.
    pub fn validate(&self) -> Result<()> {
        for (sent_num, sentence) in self.numbered_sentences() {
            if sentence.tokens.is_empty() {
                return Err(ResolveError::EmptySentence { sent_num });
            }
            for (pos, token) in sentence.tokens.iter().enumerate() {
                if token.index != pos + 1 {
                    return Err(ResolveError::InvalidTokenIndex {
                        sent_num,
                        position: pos + 1,
                        index: token.index,
                    });
                }
                token.speaker_id(sent_num)?;
            }
        }

        let mut seen = HashSet::new();
        for (chain, members) in &self.corefs {
            for m in members {
                let in_range = m.sent_num >= 1 && m.sent_num <= self.sentences.len();
                if !in_range || m.start_index < 1 || m.start_index >= m.end_index {
                    return Err(ResolveError::InvalidSpan {
                        chain: chain.clone(),
                        id: m.id,
                        sent_num: m.sent_num,
                        start: m.start_index,
                        end: m.end_index,
                    });
                }
                if !seen.insert(m.id) {
                    return Err(ResolveError::DuplicateCorefId(m.id));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token(index: usize, text: &str, speaker: Option<&str>) -> serde_json::Value {
        let mut t = json!({ "originalText": text, "index": index, "ner": "O" });
        if let Some(s) = speaker {
            t["speaker"] = json!(s);
        }
        t
    }

    #[test]
    fn test_speaker_forms() {
        let ann = Annotation::from_value(json!({
            "sentences": [{ "tokens": [
                token(1, "It", Some("12")),
                token(2, "was", Some("PER0")),
                token(3, "fine", None),
            ]}],
            "corefs": {}
        }))
        .unwrap();
        let toks = &ann.sentences[0].tokens;
        assert_eq!(toks[0].speaker_id(1).unwrap(), Some(12));
        assert_eq!(toks[1].speaker_id(1).unwrap(), None);
        assert_eq!(toks[2].speaker_id(1).unwrap(), None);
    }

    #[test]
    fn test_malformed_speaker_is_fatal() {
        let err = Annotation::from_value(json!({
            "sentences": [{ "tokens": [ token(1, "Hi", Some("twelve")) ] }],
            "corefs": {}
        }))
        .unwrap_err();
        assert!(matches!(err, ResolveError::MalformedSpeaker { .. }));
    }

    #[test]
    fn test_missing_tokens_is_fatal() {
        let err = Annotation::from_value(json!({
            "sentences": [{ "basicDependencies": [] }],
            "corefs": {}
        }))
        .unwrap_err();
        assert!(matches!(err, ResolveError::Decode(_)));
    }

    #[test]
    fn test_out_of_order_index_rejected() {
        let err = Annotation::from_value(json!({
            "sentences": [{ "tokens": [ token(2, "Hi", None) ] }],
            "corefs": {}
        }))
        .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidTokenIndex { index: 2, .. }));
    }

    #[test]
    fn test_coref_descriptor_decoding() {
        let ann = Annotation::from_value(json!({
            "sentences": [{ "tokens": [ token(1, "She", None) ] }],
            "corefs": { "4": [{
                "id": 4, "sentNum": 1, "startIndex": 1, "endIndex": 2,
                "text": "She", "type": "PRONOMINAL", "animacy": "ANIMATE",
                "number": "SINGULAR", "gender": "FEMALE",
                "isRepresentativeMention": true, "position": [1, 1]
            }]}
        }))
        .unwrap();
        let m = &ann.corefs["4"][0];
        assert!(m.is_pronoun());
        assert_eq!(m.gender, RawGender::Female);
        assert!(!m.is_named_individual());
    }

    #[test]
    fn test_bad_span_rejected() {
        let err = Annotation::from_value(json!({
            "sentences": [{ "tokens": [ token(1, "She", None) ] }],
            "corefs": { "4": [{
                "id": 4, "sentNum": 2, "startIndex": 1, "endIndex": 2,
                "text": "She", "type": "PRONOMINAL", "animacy": "ANIMATE",
                "number": "SINGULAR", "gender": "FEMALE"
            }]}
        }))
        .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidSpan { sent_num: 2, .. }));
    }

    fn descriptor(id: u64, start: usize, end: usize) -> serde_json::Value {
        json!({
            "id": id, "sentNum": 1, "startIndex": start, "endIndex": end,
            "text": "Lee", "type": "PROPER", "animacy": "ANIMATE",
            "number": "SINGULAR", "gender": "UNKNOWN"
        })
    }

    #[test]
    fn test_duplicate_id_across_chains_rejected() {
        let err = Annotation::from_value(json!({
            "sentences": [{ "tokens": [ token(1, "Lee", None), token(2, "left", None) ] }],
            "corefs": { "1": [ descriptor(5, 1, 2) ], "2": [ descriptor(5, 2, 3) ] }
        }))
        .unwrap_err();
        assert!(matches!(err, ResolveError::DuplicateCorefId(5)));
    }

    #[test]
    fn test_empty_sentence_rejected() {
        let err = Annotation::from_value(json!({
            "sentences": [{ "tokens": [ token(1, "Hi", None) ] }, { "tokens": [] }],
            "corefs": {}
        }))
        .unwrap_err();
        assert!(matches!(err, ResolveError::EmptySentence { sent_num: 2 }));
    }

    #[test]
    fn test_empty_span_rejected() {
        let err = Annotation::from_value(json!({
            "sentences": [{ "tokens": [ token(1, "Lee", None), token(2, "left", None) ] }],
            "corefs": { "1": [ descriptor(1, 2, 2) ] }
        }))
        .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidSpan { start: 2, end: 2, .. }));
    }

    #[test]
    fn test_dependencies_and_tags_decoded() {
        let ann = Annotation::from_value(json!({
            "sentences": [{
                "tokens": [
                    { "originalText": "Lee", "index": 1, "ner": "PERSON", "pos": "NNP", "lemma": "Lee" },
                    { "originalText": "said", "index": 2, "ner": "O", "pos": "VBD", "lemma": "say" }
                ],
                "basicDependencies": [
                    { "dep": "ROOT", "governor": 0, "governorGloss": "ROOT", "dependent": 2, "dependentGloss": "said" },
                    { "dep": "nsubj", "governor": 2, "governorGloss": "said", "dependent": 1, "dependentGloss": "Lee" }
                ]
            }],
            "corefs": {}
        }))
        .unwrap();
        let sentence = &ann.sentences[0];
        assert_eq!(sentence.dependencies.len(), 2);
        assert!(sentence.token(0).is_none());
        let said = sentence.token(2).unwrap();
        assert_eq!(said.word(), "say");
        assert!(said.pos_starts_with("VB"));
    }

    #[test]
    fn test_blank_person_token_is_not_a_name() {
        let ann = Annotation::from_value(json!({
            "sentences": [{ "tokens": [
                { "originalText": " ", "index": 1, "ner": "PERSON" },
                { "originalText": "Lee", "index": 2, "ner": "PERSON" }
            ]}],
            "corefs": {}
        }))
        .unwrap();
        let toks = &ann.sentences[0].tokens;
        assert!(!toks[0].is_person());
        assert!(toks[1].is_person());
    }
}
