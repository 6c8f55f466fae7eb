use tracing::{debug, warn};

use person_types::Gender;

use crate::annotation::{Animacy, Annotation, CorefMention, Number, RawGender};
use crate::mention::{CorefLink, MentionKey, MentionSet, PronounTally};
use crate::TARGET_RESOLVE;

/// Counts from one linking pass, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub chains: usize,
    pub linked_mentions: usize,
    /// Mentions claimed by more than one chain
    pub conflicts: usize,
}

/// Attach coreference chains to the extracted mentions.
///
/// A descriptor claims a mention when its span equals the mention's key,
/// or, for singular animate proper nouns only, when its span encloses the
/// mention ("Mr. Smith" encloses "Smith"). Every mention a chain claims
/// receives the chain's pronoun tally and the keys of its chain-mates.
///
/// Chains are visited in chain-id order. When two chains claim the same
/// mention the later chain overwrites the earlier one; this is logged, not
/// corrected.
pub fn link_coreferences(ann: &Annotation, mentions: &mut MentionSet) -> LinkStats {
    let mut stats = LinkStats::default();

    for (chain_id, members) in &ann.corefs {
        stats.chains += 1;
        let mut tally = PronounTally::default();
        let mut claimed: Vec<(MentionKey, u64)> = Vec::new();

        for desc in members {
            if let Some(key) = claimed_mention(desc, mentions) {
                if !claimed.iter().any(|(k, _)| *k == key) {
                    claimed.push((key, desc.id));
                }
            }
            if desc.is_pronoun() {
                count_pronoun(desc, &mut tally);
            }
        }

        for (key, mention_id) in &claimed {
            let Some(mention) = mentions.get_mut(key) else {
                continue;
            };
            if let Some(prev) = &mention.coref {
                if prev.chain != *chain_id {
                    warn!(
                        target: TARGET_RESOLVE,
                        "mention {:?} ({:?}) claimed by chains {} and {}; keeping {}",
                        key, mention.text, prev.chain, chain_id, chain_id
                    );
                    stats.conflicts += 1;
                }
            }
            let link = CorefLink {
                chain: chain_id.clone(),
                mention_id: *mention_id,
            };
            mention.claims.push(link.clone());
            mention.coref = Some(link);
            mention.pronouns = Some(tally.clone());
            mention.coreferents = claimed
                .iter()
                .map(|(k, _)| *k)
                .filter(|k| k != key)
                .collect();
            stats.linked_mentions += 1;
        }
    }

    debug!(
        target: TARGET_RESOLVE,
        "coref: {} chains, {} links, {} conflicts",
        stats.chains, stats.linked_mentions, stats.conflicts
    );
    stats
}

fn claimed_mention(desc: &CorefMention, mentions: &MentionSet) -> Option<MentionKey> {
    let span = MentionKey::new(desc.sent_num, desc.start_index, desc.end_index);
    if mentions.contains(&span) {
        return Some(span);
    }
    if desc.is_named_individual() {
        return mentions.first_enclosed_by(&span);
    }
    None
}

fn count_pronoun(desc: &CorefMention, tally: &mut PronounTally) {
    match desc.gender {
        RawGender::Male => tally.record(Gender::Male),
        RawGender::Female => tally.record(Gender::Female),
        _ if desc.number == Number::Singular && desc.animacy == Animacy::Inanimate => {
            tally.nonliving += 1;
        }
        _ => {}
    }
}
