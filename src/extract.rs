use std::collections::HashSet;

use tracing::debug;

use crate::annotation::{Annotation, Token};
use crate::honorifics::HonorificMatcher;
use crate::mention::{Mention, MentionKey, MentionSet};
use crate::TARGET_RESOLVE;

/// Scan the document in order and collect every maximal run of
/// PERSON-tagged tokens as a mention.
///
/// Runs never cross a sentence boundary: an open run is closed when its
/// sentence ends, so "... Smith. Jones ..." yields two mentions.
pub fn extract_mentions(ann: &Annotation, honorifics: &HonorificMatcher) -> MentionSet {
    let mut mentions = MentionSet::new();
    let mut names = NameHistory::default();

    for (sent_num, sentence) in ann.numbered_sentences() {
        let tokens = &sentence.tokens;
        let mut run_start: Option<usize> = None;

        for (pos, token) in tokens.iter().enumerate() {
            match (token.is_person(), run_start) {
                (true, None) => run_start = Some(pos),
                (false, Some(start)) => {
                    close_mention(&mut mentions, &mut names, honorifics, sent_num, tokens, start, pos);
                    run_start = None;
                }
                _ => {}
            }
        }

        // Flush a run that reaches the end of the sentence
        if let Some(start) = run_start {
            close_mention(&mut mentions, &mut names, honorifics, sent_num, tokens, start, tokens.len());
        }
    }

    debug!(target: TARGET_RESOLVE, "extracted {} person mentions", mentions.len());
    mentions
}

/// Build the mention for `tokens[start..end]` (0-based positions).
fn close_mention(
    mentions: &mut MentionSet,
    names: &mut NameHistory,
    honorifics: &HonorificMatcher,
    sent_num: usize,
    tokens: &[Token],
    start: usize,
    end: usize,
) {
    let run = &tokens[start..end];
    let words: Vec<&str> = run.iter().map(|t| t.original_text.as_str()).collect();
    let mut mention = Mention::new(words.join(" "));

    if start > 0 {
        mention.honorific = honorifics.lookup(&tokens[start - 1].original_text).cloned();
    }
    mention.first_single_token = names.observe(&words);

    // Token indices are 1-based and the key's end is exclusive
    let key = MentionKey::new(sent_num, run[0].index, run[run.len() - 1].index + 1);
    mentions.insert(key, mention);
}

/// Tracks which name tokens have already been seen, alone or as part of
/// a longer name.
#[derive(Debug, Default)]
struct NameHistory {
    in_longer: HashSet<String>,
    alone: HashSet<String>,
}

impl NameHistory {
    /// Record a mention's words. Returns true when this is a single-token
    /// name seen for the first time and never inside a longer name.
    fn observe(&mut self, words: &[&str]) -> bool {
        if let [single] = words {
            let fresh = !self.in_longer.contains(*single) && !self.alone.contains(*single);
            self.alone.insert(single.to_string());
            fresh
        } else {
            self.in_longer.extend(words.iter().map(|w| w.to_string()));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::honorifics::default_honorifics;
    use person_types::Gender;
    use serde_json::json;

    fn sentence(words: &[(&str, &str)]) -> serde_json::Value {
        let tokens: Vec<_> = words
            .iter()
            .enumerate()
            .map(|(i, (w, ner))| json!({ "originalText": w, "index": i + 1, "ner": ner }))
            .collect();
        json!({ "tokens": tokens })
    }

    fn extract(sentences: Vec<serde_json::Value>) -> MentionSet {
        let ann = Annotation::from_value(json!({ "sentences": sentences, "corefs": {} })).unwrap();
        let matcher = HonorificMatcher::new(&default_honorifics()).unwrap();
        extract_mentions(&ann, &matcher)
    }

    #[test]
    fn test_runs_become_mentions() {
        let set = extract(vec![sentence(&[
            ("Ann", "PERSON"),
            ("Smith", "PERSON"),
            ("and", "O"),
            ("her", "O"),
            ("husband", "O"),
            ("Jim", "PERSON"),
            ("left", "O"),
        ])]);
        let got: Vec<_> = set.iter().map(|(k, m)| (*k, m.text.as_str())).collect();
        assert_eq!(
            got,
            vec![
                (MentionKey::new(1, 1, 3), "Ann Smith"),
                (MentionKey::new(1, 6, 7), "Jim"),
            ]
        );
    }

    #[test]
    fn test_mention_closed_at_sentence_end() {
        let set = extract(vec![
            sentence(&[("Ask", "O"), ("Jane", "PERSON")]),
            sentence(&[("Doe", "PERSON"), ("agreed", "O")]),
        ]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(&MentionKey::new(1, 2, 3)).unwrap().text, "Jane");
        assert_eq!(set.get(&MentionKey::new(2, 1, 2)).unwrap().text, "Doe");
    }

    #[test]
    fn test_honorific_recorded() {
        let set = extract(vec![sentence(&[
            ("Mr.", "O"),
            ("Smith", "PERSON"),
            ("and", "O"),
            ("Dr.", "O"),
            ("Lee", "PERSON"),
        ])]);
        let smith = set.get(&MentionKey::new(1, 2, 3)).unwrap();
        assert_eq!(smith.honorific_gender(), Some(Gender::Male));
        let lee = set.get(&MentionKey::new(1, 5, 6)).unwrap();
        assert_eq!(lee.honorific.as_ref().map(|h| h.title.as_str()), Some("Dr"));
        assert_eq!(lee.honorific_gender(), None);
    }

    #[test]
    fn test_first_single_token_flag() {
        let set = extract(vec![
            sentence(&[("Obama", "PERSON"), ("spoke", "O")]),
            sentence(&[("Barack", "PERSON"), ("Obama", "PERSON"), ("left", "O")]),
            sentence(&[("Obama", "PERSON"), ("and", "O"), ("Barack", "PERSON")]),
        ]);
        assert!(set.get(&MentionKey::new(1, 1, 2)).unwrap().first_single_token);
        assert!(!set.get(&MentionKey::new(2, 1, 3)).unwrap().first_single_token);
        // seen alone before
        assert!(!set.get(&MentionKey::new(3, 1, 2)).unwrap().first_single_token);
        // seen inside "Barack Obama"
        assert!(!set.get(&MentionKey::new(3, 3, 4)).unwrap().first_single_token);
    }

    #[test]
    fn test_blank_person_token_splits_run() {
        let set = extract(vec![sentence(&[
            ("Ann", "PERSON"),
            ("", "PERSON"),
            ("Lee", "PERSON"),
            ("", "PERSON"),
        ])]);
        let got: Vec<_> = set.iter().map(|(k, m)| (*k, m.text.as_str())).collect();
        assert_eq!(
            got,
            vec![(MentionKey::new(1, 1, 2), "Ann"), (MentionKey::new(1, 3, 4), "Lee")]
        );
    }
}
