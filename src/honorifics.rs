use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use person_types::Gender;

use crate::error::{ResolveError, Result};

/// One title that may precede a person's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Honorific {
    /// Written without the trailing period: "Mr", "Dr"
    pub title: String,
    /// `None` for titles that say nothing about gender ("Dr", "Prof")
    #[serde(default)]
    pub gender: Option<Gender>,
}

impl Honorific {
    fn new(title: &str, gender: Option<Gender>) -> Self {
        Honorific {
            title: title.to_string(),
            gender,
        }
    }
}

/// Gendered titles.
pub const MALE_TITLES: &[&str] = &["Mr", "Mister", "Sir", "Lord"];
pub const FEMALE_TITLES: &[&str] = &["Mrs", "Ms", "Miss", "Madam", "Dame", "Lady"];

/// Titles that carry no gender.
pub const NEUTRAL_TITLES: &[&str] = &["Dr", "Prof", "Mx"];

pub fn default_honorifics() -> Vec<Honorific> {
    let mut table = Vec::new();
    table.extend(MALE_TITLES.iter().map(|t| Honorific::new(t, Some(Gender::Male))));
    table.extend(FEMALE_TITLES.iter().map(|t| Honorific::new(t, Some(Gender::Female))));
    table.extend(NEUTRAL_TITLES.iter().map(|t| Honorific::new(t, None)));
    table
}

/// Compiled matcher over an honorific table.
///
/// Matching ignores case and one trailing period, so "Mr", "Mr." and "MR."
/// all hit the same entry.
#[derive(Debug, Clone)]
pub struct HonorificMatcher {
    pattern: Regex,
    /// Normalized title → first table entry with that title
    by_title: HashMap<String, Honorific>,
}

impl HonorificMatcher {
    pub fn new(table: &[Honorific]) -> Result<Self> {
        if let Some(bad) = table.iter().find(|h| normalize(&h.title).is_empty()) {
            return Err(ResolveError::InvalidConfig(format!(
                "empty honorific title {:?}",
                bad.title
            )));
        }
        let pattern = Regex::new(&build_honorific_regex(table))
            .map_err(|e| ResolveError::InvalidConfig(format!("honorific pattern: {e}")))?;
        let mut by_title = HashMap::new();
        for h in table {
            by_title.entry(normalize(&h.title)).or_insert_with(|| h.clone());
        }
        Ok(HonorificMatcher { pattern, by_title })
    }

    /// Look up a token's surface form. Returns the table entry it matched.
    pub fn lookup(&self, token: &str) -> Option<&Honorific> {
        let caps = self.pattern.captures(token)?;
        self.by_title.get(&caps["title"].to_lowercase())
    }
}

/// Build an anchored alternation of every title, longest first so that
/// "Mrs" is tried before "Mr".
fn build_honorific_regex(table: &[Honorific]) -> String {
    let mut all: Vec<String> = table.iter().map(|h| normalize(&h.title)).collect();
    all.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));
    all.dedup();

    let alts: Vec<String> = all.iter().map(|t| regex::escape(t)).collect();
    format!(r"(?i)^(?P<title>{})\.?$", alts.join("|"))
}

fn normalize(title: &str) -> String {
    title.trim().trim_end_matches('.').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> HonorificMatcher {
        HonorificMatcher::new(&default_honorifics()).unwrap()
    }

    #[test]
    fn test_period_and_case_insensitive() {
        let m = matcher();
        for tok in ["Mr", "Mr.", "MR.", "mr"] {
            assert_eq!(m.lookup(tok).and_then(|h| h.gender), Some(Gender::Male), "{tok}");
        }
        assert_eq!(m.lookup("Mrs.").and_then(|h| h.gender), Some(Gender::Female));
    }

    #[test]
    fn test_neutral_title_has_no_gender() {
        let h = matcher().lookup("Dr.").cloned().unwrap();
        assert_eq!(h.title, "Dr");
        assert_eq!(h.gender, None);
    }

    #[test]
    fn test_non_titles_rejected() {
        let m = matcher();
        assert!(m.lookup("Mrs..").is_none());
        assert!(m.lookup("Smith").is_none());
        assert!(m.lookup("Mr.Smith").is_none());
    }

    #[test]
    fn test_first_entry_wins_for_repeated_title() {
        let table = vec![
            Honorific::new("Dr.", None),
            Honorific::new("DR", Some(Gender::Male)),
        ];
        let m = HonorificMatcher::new(&table).unwrap();
        let h = m.lookup("dr").unwrap();
        assert_eq!(h.title, "Dr.");
        assert_eq!(h.gender, None);
    }

    #[test]
    fn test_empty_title_is_config_error() {
        let table = vec![Honorific::new(".", None)];
        assert!(matches!(
            HonorificMatcher::new(&table),
            Err(ResolveError::InvalidConfig(_))
        ));
    }
}
