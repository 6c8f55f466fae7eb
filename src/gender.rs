use std::cmp::Ordering;

use tracing::debug;

use person_types::{Confidence, Gender, GenderSource, GenderVerdict};

use crate::mention::{Mention, MentionSet, PronounTally};
use crate::TARGET_RESOLVE;

/// Assign each mention its own gender verdict.
///
/// Evidence in priority order:
/// 1. a gendered honorific: always HIGH, never overridden;
/// 2. the chain's pronoun tally: HIGH or MEDIUM when unanimous depending on
///    `high_threshold`, LOW when the chain also holds other pronoun kinds;
/// 3. nothing. Name-based guesses are left to the caller.
pub fn resolve_genders(mentions: &mut MentionSet, high_threshold: usize) {
    let mut resolved = 0;
    for (_, mention) in mentions.iter_mut() {
        mention.gender = mention_verdict(mention, high_threshold);
        if mention.gender.is_some() {
            resolved += 1;
        }
    }
    debug!(
        target: TARGET_RESOLVE,
        "gender: {resolved} of {} mentions resolved",
        mentions.len()
    );
}

pub fn mention_verdict(mention: &Mention, high_threshold: usize) -> Option<GenderVerdict> {
    if let Some(gender) = mention.honorific_gender() {
        return Some(GenderVerdict::new(
            gender,
            Confidence::High,
            GenderSource::Honorific,
        ));
    }
    mention
        .pronouns
        .as_ref()
        .and_then(|tally| coref_verdict(tally, high_threshold))
}

/// Verdict from a chain's pronoun counts.
///
/// NONLIVING pronouns are never a verdict themselves but do count as
/// competing evidence.
pub fn coref_verdict(tally: &PronounTally, high_threshold: usize) -> Option<GenderVerdict> {
    let (gender, count) = match tally.male.cmp(&tally.female) {
        Ordering::Greater => (Gender::Male, tally.male),
        Ordering::Less => (Gender::Female, tally.female),
        Ordering::Equal if tally.male == 0 => return None,
        Ordering::Equal => (tally.first_gendered?, tally.male),
    };

    let confidence = if tally.nonzero_kinds() > 1 {
        Confidence::Low
    } else if count >= high_threshold {
        Confidence::High
    } else {
        Confidence::Medium
    };
    Some(GenderVerdict::new(gender, confidence, GenderSource::Coref))
}
