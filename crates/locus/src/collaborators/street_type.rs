use ahash::AHashMap;

use crate::text::normalized_words;

/// Recognizes street-type tokens ("St", "Avenue", "-straße") in a text.
pub trait StreetTypeDetector: Send + Sync {
    /// Canonical street type of every token that denotes one, in text order.
    fn street_types(&self, text: &str) -> Vec<String>;
}

/// Whole-word street types, as ASCII-folded lowercase tokens.
const STREET_TOKENS: &[(&str, &str)] = &[
    ("street", "street"),
    ("st", "street"),
    ("road", "road"),
    ("rd", "road"),
    ("avenue", "avenue"),
    ("ave", "avenue"),
    ("av", "avenue"),
    ("boulevard", "boulevard"),
    ("blvd", "boulevard"),
    ("bd", "boulevard"),
    ("lane", "lane"),
    ("ln", "lane"),
    ("drive", "drive"),
    ("dr", "drive"),
    ("court", "court"),
    ("ct", "court"),
    ("place", "place"),
    ("pl", "place"),
    ("way", "way"),
    ("terrace", "terrace"),
    ("crescent", "crescent"),
    ("highway", "highway"),
    ("hwy", "highway"),
    ("rue", "rue"),
    ("chemin", "chemin"),
    ("allee", "allee"),
    ("impasse", "impasse"),
    ("quai", "quai"),
    ("calle", "calle"),
    ("avenida", "avenida"),
    ("via", "via"),
    ("viale", "viale"),
    ("piazza", "piazza"),
    ("strasse", "strasse"),
    ("str", "strasse"),
    ("weg", "weg"),
    ("gasse", "gasse"),
    ("platz", "platz"),
    ("straat", "straat"),
    ("laan", "laan"),
    ("ulica", "ulica"),
    ("ul", "ulica"),
];

/// Street types glued to the end of a compound word, as in "Hauptstraße".
const STREET_SUFFIXES: &[(&str, &str)] = &[
    ("strasse", "strasse"),
    ("str", "strasse"),
    ("weg", "weg"),
    ("gasse", "gasse"),
    ("platz", "platz"),
    ("allee", "allee"),
    ("straat", "straat"),
    ("laan", "laan"),
    ("gracht", "gracht"),
];

/// Minimum length of the part in front of a glued suffix.
const MIN_STEM_LEN: usize = 3;

/// Table-driven detector covering common English, French, German, Dutch, Italian,
/// Spanish and Polish street types.
#[derive(Debug, Clone)]
pub struct BasicStreetTypeDetector {
    tokens: AHashMap<String, String>,
    suffixes: Vec<(String, String)>,
}

impl Default for BasicStreetTypeDetector {
    fn default() -> Self {
        Self {
            tokens: STREET_TOKENS
                .iter()
                .map(|(token, canonical)| ((*token).to_string(), (*canonical).to_string()))
                .collect(),
            suffixes: STREET_SUFFIXES
                .iter()
                .map(|(suffix, canonical)| ((*suffix).to_string(), (*canonical).to_string()))
                .collect(),
        }
    }
}

impl BasicStreetTypeDetector {
    /// Add or replace a whole-word token.
    pub fn with_token(mut self, token: &str, canonical: &str) -> Self {
        self.tokens
            .insert(deunicode::deunicode(token).to_lowercase(), canonical.to_string());
        self
    }

    fn classify(&self, word: &str) -> Option<&str> {
        if let Some(canonical) = self.tokens.get(word) {
            return Some(canonical.as_str());
        }
        self.suffixes
            .iter()
            .find(|(suffix, _)| word.len() >= suffix.len() + MIN_STEM_LEN && word.ends_with(suffix.as_str()))
            .map(|(_, canonical)| canonical.as_str())
    }
}

impl StreetTypeDetector for BasicStreetTypeDetector {
    fn street_types(&self, text: &str) -> Vec<String> {
        normalized_words(text)
            .iter()
            .filter_map(|word| self.classify(word))
            .map(ToString::to_string)
            .collect()
    }
}
