//! Search backends and the strategy that drives them.
//!
//! A [`SearchBackend`] answers one [`FulltextQuery`] at a time with a ranked list of
//! [`CandidateRecord`]s. The strategy in this module decides which queries to issue
//! (exact locality match, street search, alternate spelling) and how to merge them.

pub use error::BackendError;
mod memory;
pub(crate) mod strategy;

pub use memory::MemoryBackend;

use crate::model::{CandidateRecord, PlaceType, Proximity};

/// One request to a search backend.
#[derive(Debug, Clone, PartialEq)]
pub struct FulltextQuery {
    pub text: String,
    pub limit: usize,
    /// Only return records of these types; empty means no restriction
    pub place_types: Vec<PlaceType>,
    pub country_code: Option<String>,
    pub proximity: Option<Proximity>,
    /// Tolerate one edit per query word
    pub fuzzy: bool,
    /// Every query word must match the record
    pub all_words_required: bool,
    pub spell_check: bool,
}

impl FulltextQuery {
    pub fn new(text: impl Into<String>, limit: usize) -> Self {
        Self {
            text: text.into(),
            limit,
            place_types: Vec::new(),
            country_code: None,
            proximity: None,
            fuzzy: false,
            all_words_required: false,
            spell_check: false,
        }
    }

    pub fn place_types(mut self, place_types: &[PlaceType]) -> Self {
        self.place_types = place_types.to_vec();
        self
    }

    pub fn country_code(mut self, code: Option<&str>) -> Self {
        self.country_code = code.map(str::to_ascii_uppercase);
        self
    }

    pub fn proximity(mut self, proximity: Option<Proximity>) -> Self {
        self.proximity = proximity;
        self
    }

    pub fn fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    pub fn all_words_required(mut self, required: bool) -> Self {
        self.all_words_required = required;
        self
    }

    /// Whether a record of `place_type` passes the type filter.
    #[must_use]
    pub fn accepts(&self, place_type: PlaceType) -> bool {
        self.place_types.is_empty() || self.place_types.contains(&place_type)
    }
}

/// Ranked candidates and the number of records that matched before the limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FulltextResults {
    pub results: Vec<CandidateRecord>,
    pub num_found: usize,
}

impl FulltextResults {
    #[must_use]
    pub fn top_score(&self) -> Option<f32> {
        self.results.first().map(|record| record.score)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// A full-text place index.
///
/// Implementations are shared between threads and called concurrently, so they must
/// not rely on external locking by the caller.
pub trait SearchBackend: Send + Sync {
    fn execute_query(&self, query: &FulltextQuery) -> Result<FulltextResults, BackendError>;
}

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum BackendError {
        #[error("Search backend unavailable: {0}")]
        Unavailable(String),
        #[error(transparent)]
        Other(#[from] anyhow::Error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_builder_normalizes_country_code() {
        let query = FulltextQuery::new("Springfield", 10)
            .place_types(PlaceType::CITY_AND_CITYSUB)
            .country_code(Some("us"))
            .all_words_required(true);

        assert_eq!(query.country_code.as_deref(), Some("US"));
        assert!(query.accepts(PlaceType::City));
        assert!(!query.accepts(PlaceType::Street));
        assert!(!query.spell_check);
        assert!(FulltextQuery::new("x", 1).accepts(PlaceType::Street));
    }
}
