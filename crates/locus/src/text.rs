//! Text helpers used before and after searching: query cleanup, the needs-parsing
//! predicate, tolerant name comparison and exact-match carve-outs.

use itertools::Itertools;
use once_cell::sync::Lazy;
use rapidfuzz::distance::levenshtein;
use regex::Regex;

/// Characters the full-text backends treat as query syntax.
const QUERY_SYNTAX_CHARS: &[char] = &[
    '+', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\', '<', '>', '=',
];

static UK_POSTCODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[A-Z]{1,2}[0-9][A-Z0-9]?\s*[0-9][A-Z]{2}\b").expect("valid regex")
});

/// Strip query syntax, turn semicolons into commas and collapse whitespace.
#[must_use]
pub fn prepare_query(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            ';' => ',',
            c if QUERY_SYNTAX_CHARS.contains(&c) => ' ',
            c => c,
        })
        .collect::<String>()
        .split_whitespace()
        .join(" ")
        .replace(" ,", ",")
        .trim_matches(|c: char| c == ',' || c.is_whitespace())
        .to_string()
}

/// A text needs parsing when it holds more than one token.
#[must_use]
pub fn needs_parsing(text: &str) -> bool {
    text.trim().contains([' ', ',', ';'])
}

/// Lowercased ASCII-folded alphanumeric words.
#[must_use]
pub fn normalized_words(text: &str) -> Vec<String> {
    deunicode::deunicode(text)
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Whether `query` names the same thing as `name`, order-insensitively, allowing a
/// total Levenshtein distance of `budget` across all words.
///
/// Both sides must have the same number of words; each name word is paired with the
/// closest query word not yet used.
#[must_use]
pub fn is_same_name(query: &str, name: &str, budget: usize) -> bool {
    let query_words = normalized_words(query);
    let name_words = normalized_words(name);
    if query_words.is_empty() || query_words.len() != name_words.len() {
        return false;
    }

    let mut used = vec![false; query_words.len()];
    let mut spent = 0;
    for word in &name_words {
        let closest = query_words
            .iter()
            .enumerate()
            .filter(|(i, _)| !used[*i])
            .map(|(i, candidate)| (i, levenshtein::distance(word.chars(), candidate.chars())))
            .min_by_key(|(_, distance)| *distance);
        let Some((index, distance)) = closest else {
            return false;
        };
        used[index] = true;
        spent += distance;
        if spent > budget {
            return false;
        }
    }
    true
}

/// A predicate that, when it matches the query text, keeps every exact-phase
/// candidate regardless of name similarity.
pub trait ExactMatchCarveOut: Send + Sync {
    fn keeps_all(&self, text: &str) -> bool;
}

/// Matches texts containing a UK postcode such as `SW1A 1AA` or `m1 1ae`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UkPostcodeCarveOut;

impl ExactMatchCarveOut for UkPostcodeCarveOut {
    fn keeps_all(&self, text: &str) -> bool {
        UK_POSTCODE_RE.is_match(text)
    }
}
