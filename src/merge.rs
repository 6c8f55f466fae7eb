//! Group mentions into people.
//!
//! Clustering is pluggable through [`Clusterer`]. The default,
//! [`GreedySubsetClusterer`], walks mentions in document order and joins
//! each one to the first earlier cluster holding a name it is a textual
//! subset or superset of, or a mention from the same coreference chain,
//! unless the cluster carries a different gender.
//! The result depends on order. Two different people who share a partial
//! name and have no gender evidence end up merged.

use std::collections::BTreeMap;

use tracing::debug;

use person_types::{EntityId, EntityRecord, Gender, GenderVerdict};

use crate::mention::{Mention, MentionKey, MentionSet};
use crate::TARGET_RESOLVE;

/// Partitions a document's mentions into clusters of the same person.
///
/// Implementations must place every key of `mentions` in exactly one
/// cluster and must be deterministic for a given input.
pub trait Clusterer {
    fn cluster(&self, mentions: &MentionSet) -> Vec<Vec<MentionKey>>;
}

// ── Textual subset rule ──────────────────────────────────────────────────

/// Whether `candidate` can name the same person as `member`.
///
/// True when `candidate` occurs inside `member` as a substring, or when
/// `member` has at least `min_tokens` words and `candidate` is exactly its
/// first and last word ("John Smith" vs "John Jackson Smith").
pub fn is_text_subset(candidate: &str, member: &str, min_tokens: usize) -> bool {
    if member.contains(candidate) {
        return true;
    }
    let words: Vec<&str> = member.split_whitespace().collect();
    if words.len() < min_tokens {
        return false;
    }
    match (words.first(), words.last()) {
        (Some(first), Some(last)) => candidate == format!("{first} {last}"),
        _ => false,
    }
}

/// The cluster holds a chain-mate of the mention at `key`.
fn shares_chain(key: &MentionKey, mention: &Mention, cluster: &[MentionKey], mentions: &MentionSet) -> bool {
    cluster.iter().any(|k| {
        mention.coreferents.contains(k)
            || mentions.get(k).is_some_and(|m| m.coreferents.contains(key))
    })
}

/// No member of the cluster disagrees with `gender`.
fn gender_compatible(gender: Option<Gender>, cluster: &[MentionKey], mentions: &MentionSet) -> bool {
    let Some(gender) = gender else {
        return true;
    };
    cluster.iter().all(|k| {
        mentions
            .get(k)
            .and_then(Mention::consensus_gender)
            .is_none_or(|g| g == gender)
    })
}

// ── Greedy clustering ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GreedySubsetClusterer {
    pub min_tokens_first_last: usize,
}

impl GreedySubsetClusterer {
    pub fn new(min_tokens_first_last: usize) -> Self {
        GreedySubsetClusterer {
            min_tokens_first_last,
        }
    }

    /// Either name is a textual subset of the other. Checking both ways
    /// keeps the outcome independent of which form appears first.
    fn names_overlap(&self, a: &str, b: &str) -> bool {
        is_text_subset(a, b, self.min_tokens_first_last)
            || is_text_subset(b, a, self.min_tokens_first_last)
    }
}

impl Clusterer for GreedySubsetClusterer {
    fn cluster(&self, mentions: &MentionSet) -> Vec<Vec<MentionKey>> {
        let mut clusters: Vec<Vec<MentionKey>> = Vec::new();

        for (key, mention) in mentions.iter() {
            let gender = mention.consensus_gender();
            let target = clusters.iter().position(|cluster| {
                let text_match = cluster.iter().any(|k| {
                    mentions.get(k).is_some_and(|m| self.names_overlap(&mention.text, &m.text))
                });
                (text_match || shares_chain(key, mention, cluster, mentions))
                    && gender_compatible(gender, cluster, mentions)
            });

            match target {
                Some(i) => clusters[i].push(*key),
                None => clusters.push(vec![*key]),
            }
        }

        debug!(
            target: TARGET_RESOLVE,
            "merge: {} mentions into {} clusters",
            mentions.len(),
            clusters.len()
        );
        clusters
    }
}

// ── Entities ─────────────────────────────────────────────────────────────

/// The resolved people of a document and which entity owns each mention.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entities {
    pub records: BTreeMap<EntityId, EntityRecord>,
    pub owner: BTreeMap<MentionKey, EntityId>,
}

impl Entities {
    /// Finalize clusters into entities. Ids follow cluster order, from 1.
    pub fn from_clusters(clusters: &[Vec<MentionKey>], mentions: &MentionSet) -> Self {
        let mut entities = Entities::default();

        for (i, cluster) in clusters.iter().enumerate() {
            let id = EntityId(i + 1);
            let members: Vec<&Mention> = cluster.iter().filter_map(|k| mentions.get(k)).collect();

            let mut spans: Vec<_> = cluster.iter().map(MentionKey::span).collect();
            spans.sort();

            let mut record = EntityRecord::new(canonical_name(&members));
            record.mention_count = cluster.len();
            record.mentions = spans;
            match entity_gender(&members) {
                EntityGender::Agreed(verdict) => record.set_verdict(verdict),
                EntityGender::Conflict => record.gender_conflict = true,
                EntityGender::NoEvidence => {}
            }

            for key in cluster {
                entities.owner.insert(*key, id);
            }
            entities.records.insert(id, record);
        }
        entities
    }
}

/// Longest member text; the earliest member wins ties.
fn canonical_name(members: &[&Mention]) -> String {
    let mut best: Option<&str> = None;
    for m in members {
        if best.is_none_or(|b| m.text.chars().count() > b.chars().count()) {
            best = Some(m.text.as_str());
        }
    }
    best.unwrap_or_default().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityGender {
    Agreed(GenderVerdict),
    Conflict,
    NoEvidence,
}

/// The first member gender seen sets the entity's gender; any member that
/// disagrees collapses it to a conflict. While members agree, the
/// strongest verdict is kept.
fn entity_gender(members: &[&Mention]) -> EntityGender {
    let mut best: Option<GenderVerdict> = None;
    for verdict in members.iter().filter_map(|m| m.gender) {
        match best {
            None => best = Some(verdict),
            Some(b) if b.gender != verdict.gender => return EntityGender::Conflict,
            Some(b) if verdict.confidence > b.confidence => best = Some(verdict),
            Some(_) => {}
        }
    }
    best.map_or(EntityGender::NoEvidence, EntityGender::Agreed)
}
