//! What each person does and how they are described, read off the
//! dependency parse, plus the evidence that makes someone a speaker.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use person_types::EntityId;

use crate::annotation::{Annotation, Sentence};
use crate::merge::Entities;
use crate::mention::MentionKey;
use crate::TARGET_RESOLVE;

/// Relations whose dependent is the subject of the governor.
const SUBJECT_RELATIONS: &[&str] = &["nsubj", "nsubjpass", "nsubj:pass"];
const ADJECTIVE_MODIFIER: &str = "amod";

/// Speaker reason for a person with attributed quote tokens.
pub const REASON_QUOTED: &str = "Quoted";

#[derive(Debug, Default)]
struct Roles {
    verbs: BTreeSet<String>,
    adjs: BTreeSet<String>,
    /// Surface forms of reporting verbs the person is the subject of
    speech: Vec<String>,
}

/// Fill in associated verbs, adjectives and speaker reasons for every
/// entity. Runs after quote attribution.
///
/// A mention is the subject of a verb when an `nsubj` edge leaves a token
/// outside the mention for a token inside it. Adjectives come from `amod`
/// edges into the mention and from copular subjects ("Lee was tired").
/// Sentences without a parse contribute nothing.
pub fn attach_roles(ann: &Annotation, entities: &mut Entities, speech_verbs: &[String]) {
    let mut roles: HashMap<EntityId, Roles> = HashMap::new();
    for (key, id) in &entities.owner {
        let Some(sentence) = key.sent_num.checked_sub(1).and_then(|i| ann.sentences.get(i)) else {
            continue;
        };
        collect_roles(sentence, key, speech_verbs, roles.entry(*id).or_default());
    }

    let mut speakers = 0;
    for (id, record) in entities.records.iter_mut() {
        if !record.quotes.is_empty() {
            record.speaker.add_reason(REASON_QUOTED);
        }
        if let Some(found) = roles.remove(id) {
            for verb in found.speech {
                record.speaker.add_reason(format!("Subject of {verb}"));
            }
            record.associated_verbs = found.verbs.into_iter().collect();
            record.associated_adjs = found.adjs.into_iter().collect();
        }
        if record.is_speaker() {
            speakers += 1;
        }
    }

    debug!(
        target: TARGET_RESOLVE,
        "roles: {} entities, {} speakers",
        entities.records.len(),
        speakers
    );
}

fn collect_roles(sentence: &Sentence, key: &MentionKey, speech_verbs: &[String], roles: &mut Roles) {
    let inside = |index: usize| (key.start..key.end).contains(&index);

    for edge in &sentence.dependencies {
        let (Some(governor), Some(dependent)) =
            (sentence.token(edge.governor), sentence.token(edge.dependent))
        else {
            continue;
        };

        if SUBJECT_RELATIONS.contains(&edge.dep.as_str())
            && inside(edge.dependent)
            && !inside(edge.governor)
        {
            if governor.pos_starts_with("VB") {
                let verb = governor.word();
                if speech_verbs.contains(&verb) {
                    roles.speech.push(governor.original_text.clone());
                }
                roles.verbs.insert(verb);
            } else if governor.pos_starts_with("JJ") {
                roles.adjs.insert(governor.word());
            }
        } else if edge.dep == ADJECTIVE_MODIFIER
            && inside(edge.governor)
            && dependent.pos_starts_with("JJ")
        {
            roles.adjs.insert(dependent.word());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::Engine;
    use person_types::{DocumentReport, EntityRecord};
    use serde_json::{json, Value};

    /// (text, ner, pos, lemma)
    fn tokens(words: &[(&str, &str, &str, &str)]) -> Vec<Value> {
        words
            .iter()
            .enumerate()
            .map(|(i, (text, ner, pos, lemma))| {
                json!({ "originalText": text, "index": i + 1, "ner": ner,
                        "pos": pos, "lemma": lemma, "before": if i == 0 { "" } else { " " } })
            })
            .collect()
    }

    /// (relation, governor, dependent)
    fn edges(list: &[(&str, usize, usize)]) -> Vec<Value> {
        list.iter()
            .map(|(dep, gov, dependent)| json!({ "dep": dep, "governor": gov, "dependent": dependent }))
            .collect()
    }

    fn analyze(sentences: Value) -> DocumentReport {
        let ann = Annotation::from_value(json!({ "sentences": sentences, "corefs": {} })).unwrap();
        Engine::new(EngineConfig::default()).unwrap().analyze(&ann).unwrap()
    }

    fn by_name<'a>(report: &'a DocumentReport, name: &str) -> &'a EntityRecord {
        report.entities.values().find(|e| e.name == name).unwrap()
    }

    #[test]
    fn test_verbs_adjectives_and_reporting_subject() {
        let report = analyze(json!([
            {
                // Ann Smith said it rained .
                "tokens": tokens(&[
                    ("Ann", "PERSON", "NNP", "Ann"),
                    ("Smith", "PERSON", "NNP", "Smith"),
                    ("said", "O", "VBD", "say"),
                    ("it", "O", "PRP", "it"),
                    ("rained", "O", "VBD", "rain"),
                    (".", "O", ".", "."),
                ]),
                "basicDependencies": edges(&[
                    ("ROOT", 0, 3), ("compound", 2, 1), ("nsubj", 3, 2),
                    ("ccomp", 3, 5), ("nsubj", 5, 4), ("punct", 3, 6),
                ])
            },
            {
                // Brave Lee left .
                "tokens": tokens(&[
                    ("Brave", "O", "JJ", "brave"),
                    ("Lee", "PERSON", "NNP", "Lee"),
                    ("left", "O", "VBD", "leave"),
                    (".", "O", ".", "."),
                ]),
                "basicDependencies": edges(&[("ROOT", 0, 3), ("amod", 2, 1), ("nsubj", 3, 2), ("punct", 3, 4)])
            },
            {
                // Smith was tired .
                "tokens": tokens(&[
                    ("Smith", "PERSON", "NNP", "Smith"),
                    ("was", "O", "VBD", "be"),
                    ("tired", "O", "JJ", "tired"),
                    (".", "O", ".", "."),
                ]),
                "basicDependencies": edges(&[("ROOT", 0, 3), ("nsubj", 3, 1), ("cop", 3, 2), ("punct", 3, 4)])
            }
        ]));

        assert_eq!(report.entities.len(), 2);
        let ann = by_name(&report, "Ann Smith");
        assert_eq!(ann.associated_verbs, vec!["say"]);
        assert_eq!(ann.associated_adjs, vec!["tired"]);
        assert!(ann.is_speaker());
        assert_eq!(ann.speaker.reasons, vec!["Subject of said"]);

        let lee = by_name(&report, "Lee");
        assert_eq!(lee.associated_verbs, vec!["leave"]);
        assert_eq!(lee.associated_adjs, vec!["brave"]);
        assert!(!lee.is_speaker());
        assert!(lee.speaker.reasons.is_empty());
    }

    #[test]
    fn test_unparsed_document_has_no_roles() {
        let report = analyze(json!([
            { "tokens": tokens(&[("Lee", "PERSON", "NNP", "Lee"), ("said", "O", "VBD", "say")]) }
        ]));
        let lee = by_name(&report, "Lee");
        assert!(lee.associated_verbs.is_empty());
        assert!(!lee.is_speaker());
    }
}
