use std::collections::BTreeMap;
use std::collections::btree_map;

use person_types::{Gender, GenderVerdict, MentionSpan};

use crate::honorifics::Honorific;

// ── Keys ─────────────────────────────────────────────────────────────────

/// Position of a mention: 1-based sentence, 1-based token range, end exclusive.
///
/// Ordering is (sentence, start, end), which is document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MentionKey {
    pub sent_num: usize,
    pub start: usize,
    pub end: usize,
}

impl MentionKey {
    pub fn new(sent_num: usize, start: usize, end: usize) -> Self {
        MentionKey {
            sent_num,
            start,
            end,
        }
    }

    /// Same sentence and `other` lies entirely inside this range.
    pub fn encloses(&self, other: &MentionKey) -> bool {
        self.sent_num == other.sent_num && self.start <= other.start && other.end <= self.end
    }

    pub fn span(&self) -> MentionSpan {
        MentionSpan {
            sent_num: self.sent_num,
            start: self.start,
            end: self.end,
        }
    }
}

// ── Per-mention annotations ──────────────────────────────────────────────

/// Pronoun counts aggregated over a whole coreference chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PronounTally {
    pub male: usize,
    pub female: usize,
    /// Singular inanimate pronouns ("it"): evidence against a person
    pub nonliving: usize,
    /// Gender of the first gendered pronoun in chain order, used on ties
    pub first_gendered: Option<Gender>,
}

impl PronounTally {
    pub fn record(&mut self, gender: Gender) {
        match gender {
            Gender::Male => self.male += 1,
            Gender::Female => self.female += 1,
            Gender::Unknown => return,
        }
        if self.first_gendered.is_none() {
            self.first_gendered = Some(gender);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.male == 0 && self.female == 0 && self.nonliving == 0
    }

    /// How many of MALE / FEMALE / NONLIVING have a nonzero count.
    pub fn nonzero_kinds(&self) -> usize {
        [self.male, self.female, self.nonliving]
            .iter()
            .filter(|&&n| n > 0)
            .count()
    }
}

/// Link from a mention to the coreference chain that claimed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorefLink {
    pub chain: String,
    /// Id of the chain descriptor that matched or enclosed the mention
    pub mention_id: u64,
}

/// One contiguous run of person-tagged tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub text: String,
    /// Title token right before the mention, if it was a known honorific
    pub honorific: Option<Honorific>,
    /// The chain that claimed the mention last
    pub coref: Option<CorefLink>,
    /// Every chain claim in visiting order, including overwritten ones
    pub claims: Vec<CorefLink>,
    pub pronouns: Option<PronounTally>,
    /// Other mentions found in the same chain
    pub coreferents: Vec<MentionKey>,
    pub gender: Option<GenderVerdict>,
    /// Single-token name not yet seen inside a longer name. Marks
    /// candidates for later surname-only inference.
    pub first_single_token: bool,
}

impl Mention {
    pub fn new(text: String) -> Self {
        Mention {
            text,
            honorific: None,
            coref: None,
            claims: Vec::new(),
            pronouns: None,
            coreferents: Vec::new(),
            gender: None,
            first_single_token: false,
        }
    }

    pub fn honorific_gender(&self) -> Option<Gender> {
        self.honorific.as_ref().and_then(|h| h.gender)
    }

    pub fn consensus_gender(&self) -> Option<Gender> {
        self.gender.map(|v| v.gender)
    }

    pub fn token_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

// ── The document's mention set ───────────────────────────────────────────

/// All mentions of one document, keyed and iterated in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionSet {
    by_key: BTreeMap<MentionKey, Mention>,
}

impl MentionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: MentionKey, mention: Mention) {
        self.by_key.insert(key, mention);
    }

    pub fn get(&self, key: &MentionKey) -> Option<&Mention> {
        self.by_key.get(key)
    }

    pub fn get_mut(&mut self, key: &MentionKey) -> Option<&mut Mention> {
        self.by_key.get_mut(key)
    }

    pub fn contains(&self, key: &MentionKey) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, MentionKey, Mention> {
        self.by_key.iter()
    }

    pub fn iter_mut(&mut self) -> btree_map::IterMut<'_, MentionKey, Mention> {
        self.by_key.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &MentionKey> {
        self.by_key.keys()
    }

    /// First mention (in key order) lying inside `outer`.
    pub fn first_enclosed_by(&self, outer: &MentionKey) -> Option<MentionKey> {
        let from = MentionKey::new(outer.sent_num, outer.start, 0);
        let to = MentionKey::new(outer.sent_num, outer.end, 0);
        self.by_key
            .range(from..to)
            .map(|(k, _)| *k)
            .find(|k| outer.encloses(k))
    }
}
