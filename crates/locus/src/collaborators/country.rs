use ahash::AHashMap;
use itertools::Itertools;

use crate::text::normalized_words;

/// Result of looking for a country name in a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryDetection {
    /// ISO 3166-1 alpha-2 code of the detected country
    pub country_code: Option<String>,
    /// The text with the country removed; empty when the text was only a country
    pub remaining: String,
}

impl CountryDetection {
    pub fn none(text: &str) -> Self {
        Self {
            country_code: None,
            remaining: text.trim().to_string(),
        }
    }
}

/// Finds and removes a country name from a free-text query.
pub trait CountryDetector: Send + Sync {
    fn detect_and_strip(&self, text: &str) -> CountryDetection;
}

const COUNTRIES: &[(&str, &[&str])] = &[
    ("US", &["United States", "United States of America", "USA"]),
    ("GB", &["United Kingdom", "Great Britain"]),
    ("IE", &["Ireland", "Éire"]),
    ("DE", &["Germany", "Deutschland"]),
    ("AT", &["Austria", "Österreich"]),
    ("CH", &["Switzerland", "Schweiz", "Suisse", "Svizzera"]),
    ("LI", &["Liechtenstein"]),
    ("FR", &["France"]),
    ("BE", &["Belgium", "Belgique", "België"]),
    ("NL", &["Netherlands", "Nederland", "The Netherlands"]),
    ("LU", &["Luxembourg"]),
    ("IT", &["Italy", "Italia"]),
    ("ES", &["Spain", "España"]),
    ("PT", &["Portugal"]),
    ("DK", &["Denmark", "Danmark"]),
    ("SE", &["Sweden", "Sverige"]),
    ("NO", &["Norway", "Norge"]),
    ("FI", &["Finland", "Suomi"]),
    ("PL", &["Poland", "Polska"]),
    ("CZ", &["Czech Republic", "Czechia", "Česko"]),
    ("SK", &["Slovakia", "Slovensko"]),
    ("HU", &["Hungary", "Magyarország"]),
    ("CA", &["Canada"]),
    ("MX", &["Mexico", "México"]),
    ("BR", &["Brazil", "Brasil"]),
    ("AR", &["Argentina"]),
    ("AU", &["Australia"]),
    ("NZ", &["New Zealand"]),
    ("JP", &["Japan"]),
    ("CN", &["China"]),
    ("IN", &["India"]),
];

/// Longest country name, in words, looked for at the end of a text.
const MAX_NAME_WORDS: usize = 4;

/// Table-driven detector for English and native names of common countries.
///
/// A country is recognized when it is the whole text, the last comma-separated segment
/// (name or ISO code) or the last words of the text (name only).
#[derive(Debug, Clone)]
pub struct BasicCountryDetector {
    names: AHashMap<String, String>,
    codes: AHashMap<String, String>,
}

fn normalize(text: &str) -> String {
    normalized_words(text).join(" ")
}

impl Default for BasicCountryDetector {
    fn default() -> Self {
        let mut detector = Self {
            names: AHashMap::new(),
            codes: AHashMap::new(),
        };
        for (code, names) in COUNTRIES {
            detector = detector.with_country(code, names);
        }
        detector
    }
}

impl BasicCountryDetector {
    /// Register a country code and its names.
    pub fn with_country(mut self, code: &str, names: &[&str]) -> Self {
        let code = code.to_ascii_uppercase();
        for name in names {
            self.names.insert(normalize(name), code.clone());
        }
        self.codes.insert(code.to_ascii_lowercase(), code);
        self
    }

    fn by_name(&self, text: &str) -> Option<&String> {
        self.names.get(&normalize(text))
    }

    fn by_name_or_code(&self, text: &str) -> Option<&String> {
        let normalized = normalize(text);
        self.names
            .get(&normalized)
            .or_else(|| self.codes.get(&normalized))
    }
}

impl CountryDetector for BasicCountryDetector {
    fn detect_and_strip(&self, text: &str) -> CountryDetection {
        let text = text.trim();

        if let Some(code) = self.by_name(text) {
            return CountryDetection {
                country_code: Some(code.clone()),
                remaining: String::new(),
            };
        }

        if let Some((head, last)) = text.rsplit_once([',', ';']) {
            if let Some(code) = self.by_name_or_code(last) {
                return CountryDetection {
                    country_code: Some(code.clone()),
                    remaining: head.trim().trim_end_matches([',', ';']).trim().to_string(),
                };
            }
        }

        let words: Vec<&str> = text.split_whitespace().collect();
        for count in (1..=MAX_NAME_WORDS.min(words.len().saturating_sub(1))).rev() {
            let split = words.len() - count;
            if let Some(code) = self.by_name(&words[split..].join(" ")) {
                return CountryDetection {
                    country_code: Some(code.clone()),
                    remaining: words[..split].iter().join(" "),
                };
            }
        }

        CountryDetection::none(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(text: &str) -> (Option<String>, String) {
        let detection = BasicCountryDetector::default().detect_and_strip(text);
        (detection.country_code, detection.remaining)
    }

    #[test]
    fn test_whole_text_country() {
        assert_eq!(detect(" France "), (Some("FR".into()), String::new()));
        assert_eq!(detect("united states of america"), (Some("US".into()), String::new()));
        assert_eq!(detect("Österreich"), (Some("AT".into()), String::new()));
        assert_eq!(detect("Osterreich"), (Some("AT".into()), String::new()));
    }

    #[test]
    fn test_last_segment_name_or_code() {
        assert_eq!(
            detect("10 Main St, Springfield, US"),
            (Some("US".into()), "10 Main St, Springfield".into())
        );
        assert_eq!(
            detect("Hauptstraße 5, Berlin, Deutschland"),
            (Some("DE".into()), "Hauptstraße 5, Berlin".into())
        );
        assert_eq!(detect("Lyon; fr"), (Some("FR".into()), "Lyon".into()));
    }

    #[test]
    fn test_trailing_name() {
        assert_eq!(detect("Berlin Germany"), (Some("DE".into()), "Berlin".into()));
        assert_eq!(
            detect("Wellington New Zealand"),
            (Some("NZ".into()), "Wellington".into())
        );
    }

    #[test]
    fn test_codes_are_only_read_from_comma_segments() {
        assert_eq!(detect("Main St"), (None, "Main St".into()));
        assert_eq!(detect("Springfield IN"), (None, "Springfield IN".into()));
        assert_eq!(detect("DE"), (None, "DE".into()));
    }

    #[test]
    fn test_custom_country() {
        let detector = BasicCountryDetector::default().with_country("is", &["Iceland", "Ísland"]);
        let detection = detector.detect_and_strip("Reykjavik, Island");
        assert_eq!(detection.country_code.as_deref(), Some("IS"));
        assert_eq!(detection.remaining, "Reykjavik");
    }
}
