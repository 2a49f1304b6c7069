/// Compound-word handling for languages that glue street types onto names.
pub trait Decompounder: Send + Sync {
    /// Whether addresses in the country are usually written with compound street names.
    fn is_compound_language_country(&self, country_code: &str) -> bool;

    /// Whether the text contains a compound street name, glued or split.
    fn looks_compound(&self, text: &str) -> bool;

    /// The other spelling of the street: glued names are split and split names glued.
    fn alternate_form(&self, text: &str) -> String;

    /// Expand abbreviated street types to their full form.
    fn expand_street_type(&self, text: &str) -> String;
}

const COMPOUND_COUNTRIES: &[&str] = &["DE", "AT", "CH", "LI"];

/// Longest first, so "straße" wins over "str".
const SUFFIXES: &[&str] = &["straße", "strasse", "str.", "str", "gasse", "platz", "allee", "weg"];

const ABBREVIATIONS: &[&str] = &["str.", "str"];
const EXPANDED: &str = "straße";

const MIN_STEM_LEN: usize = 3;

/// German-language rules: `Hauptstraße` ⇄ `Haupt Straße` and `Str.` → `Straße`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GermanicDecompounder;

/// A whitespace token split into its word and trailing separator.
struct Token<'t> {
    core: &'t str,
    trail: &'t str,
}

impl<'t> Token<'t> {
    fn parse(raw: &'t str) -> Self {
        let core = raw.trim_end_matches([',', ';']);
        Self {
            core,
            trail: &raw[core.len()..],
        }
    }

    /// `(stem, suffix)` when the word ends in a glued street type.
    fn split_suffix(&self, suffixes: &[&str]) -> Option<(&'t str, &'t str)> {
        let lower = self.core.to_lowercase();
        if lower.len() != self.core.len() {
            return None;
        }
        suffixes.iter().find_map(|suffix| {
            let at = self.core.len().checked_sub(suffix.len())?;
            let glued = lower.ends_with(suffix)
                && self.core.is_char_boundary(at)
                && self.core[..at].chars().count() >= MIN_STEM_LEN;
            glued.then(|| self.core.split_at(at))
        })
    }

    fn is_suffix(&self, suffixes: &[&str]) -> bool {
        let lower = self.core.to_lowercase();
        suffixes.contains(&lower.as_str())
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

impl GermanicDecompounder {
    fn split_glued(text: &str) -> Option<String> {
        let mut changed = false;
        let words: Vec<String> = text
            .split_whitespace()
            .map(|raw| {
                let token = Token::parse(raw);
                match token.split_suffix(SUFFIXES) {
                    Some((stem, suffix)) => {
                        changed = true;
                        format!("{stem} {}{}", capitalize(suffix), token.trail)
                    }
                    None => raw.to_string(),
                }
            })
            .collect();
        changed.then(|| words.join(" "))
    }

    fn glue_split(text: &str) -> Option<String> {
        let mut changed = false;
        let mut words: Vec<String> = Vec::new();
        for raw in text.split_whitespace() {
            let token = Token::parse(raw);
            let previous_open = words
                .last()
                .is_some_and(|previous| !previous.ends_with([',', ';']));
            if token.is_suffix(SUFFIXES) && previous_open {
                if let Some(previous) = words.last_mut() {
                    previous.push_str(&token.core.to_lowercase());
                    previous.push_str(token.trail);
                    changed = true;
                    continue;
                }
            }
            words.push(raw.to_string());
        }
        changed.then(|| words.join(" "))
    }
}

impl Decompounder for GermanicDecompounder {
    fn is_compound_language_country(&self, country_code: &str) -> bool {
        COMPOUND_COUNTRIES
            .iter()
            .any(|code| code.eq_ignore_ascii_case(country_code))
    }

    fn looks_compound(&self, text: &str) -> bool {
        Self::split_glued(text).is_some() || Self::glue_split(text).is_some()
    }

    fn alternate_form(&self, text: &str) -> String {
        Self::split_glued(text)
            .or_else(|| Self::glue_split(text))
            .unwrap_or_else(|| text.to_string())
    }

    fn expand_street_type(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|raw| {
                let token = Token::parse(raw);
                if token.is_suffix(ABBREVIATIONS) {
                    return format!("{}{}", capitalize(EXPANDED), token.trail);
                }
                match token.split_suffix(ABBREVIATIONS) {
                    Some((stem, _)) => format!("{stem}{EXPANDED}{}", token.trail),
                    None => raw.to_string(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}
