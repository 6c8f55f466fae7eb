use std::collections::HashMap;

use tracing::debug;

use person_types::{EntityId, QuoteToken};

use crate::annotation::Annotation;
use crate::error::Result;
use crate::merge::Entities;
use crate::mention::MentionSet;
use crate::TARGET_RESOLVE;

/// Maps a speaker id (a coref descriptor id) to the entity that said it.
#[derive(Debug, Default)]
struct SpeakerIndex {
    /// Descriptor id → chain id, for every descriptor in the document
    chain_of: HashMap<u64, String>,
    /// Descriptor id that claimed a mention → that mention's entity
    by_descriptor: HashMap<u64, EntityId>,
    /// Chain id → entity of the first mention the chain claimed
    by_chain: HashMap<String, EntityId>,
}

impl SpeakerIndex {
    fn build(ann: &Annotation, mentions: &MentionSet, entities: &Entities) -> Self {
        let mut index = SpeakerIndex::default();
        for (chain, members) in &ann.corefs {
            for desc in members {
                index.chain_of.insert(desc.id, chain.clone());
            }
        }
        // Key order, so the earliest mention owns a chain. Overwritten
        // claims still count: the mention was said by either chain.
        for (key, mention) in mentions.iter() {
            let Some(&owner) = entities.owner.get(key) else {
                continue;
            };
            for link in &mention.claims {
                index.by_descriptor.insert(link.mention_id, owner);
                index.by_chain.entry(link.chain.clone()).or_insert(owner);
            }
        }
        index
    }

    fn resolve(&self, speaker: u64) -> Option<EntityId> {
        if let Some(&id) = self.by_descriptor.get(&speaker) {
            return Some(id);
        }
        let chain = self.chain_of.get(&speaker)?;
        self.by_chain.get(chain).copied()
    }
}

/// Append every quoted token to the entity whose coref chain speaks it.
///
/// Returns how many quoted tokens could not be attributed. An unknown
/// speaker is normal and simply leaves the token unattributed.
pub fn attribute_quotes(ann: &Annotation, mentions: &MentionSet, entities: &mut Entities) -> Result<usize> {
    let index = SpeakerIndex::build(ann, mentions, entities);
    let mut attributed = 0;
    let mut unattributed = 0;

    for (sent_num, sentence) in ann.numbered_sentences() {
        for token in &sentence.tokens {
            let Some(speaker) = token.speaker_id(sent_num)? else {
                continue;
            };
            let record = index
                .resolve(speaker)
                .and_then(|id| entities.records.get_mut(&id));
            match record {
                Some(record) => {
                    record.quotes.push(QuoteToken {
                        sent_num,
                        index: token.index,
                        text: token.original_text.clone(),
                        before: token.before.clone(),
                    });
                    attributed += 1;
                }
                None => unattributed += 1,
            }
        }
    }

    debug!(
        target: TARGET_RESOLVE,
        "quotes: {attributed} tokens attributed, {unattributed} unattributed"
    );
    Ok(unattributed)
}
