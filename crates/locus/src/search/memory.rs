use std::cmp::Ordering;

use geo::{Distance, Haversine, Point};
use rapidfuzz::distance::levenshtein;
use tracing::{debug, instrument};

use super::{BackendError, FulltextQuery, FulltextResults, SearchBackend};
use crate::{model::CandidateRecord, text::normalized_words};

const NAME_WEIGHT: f32 = 3.0;
const ALTERNATE_NAME_WEIGHT: f32 = 2.0;
const CONTEXT_WEIGHT: f32 = 1.0;
/// Multiplier applied to a word matched with one edit
const FUZZY_PENALTY: f32 = 0.5;

/// A linear-scan backend over an in-memory list of records.
///
/// Scores are the sum, per query word, of the best matching field weight: 3 for the
/// name, 2 for an alternate name and 1 for locality, administrative and zip fields.
/// Suited to tests and small gazetteers.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    records: Vec<IndexedRecord>,
}

#[derive(Debug, Clone)]
struct IndexedRecord {
    record: CandidateRecord,
    name: Vec<String>,
    alternate: Vec<String>,
    context: Vec<String>,
}

impl IndexedRecord {
    fn new(record: CandidateRecord) -> Self {
        let name = normalized_words(&record.name);
        let alternate = record
            .alternate_names
            .iter()
            .flat_map(|alt| normalized_words(alt))
            .collect();
        let context = [
            record.is_in.as_deref(),
            record.is_in_place.as_deref(),
            record.is_in_adm.as_deref(),
            record.adm1_name.as_deref(),
            record.adm2_name.as_deref(),
            record.adm3_name.as_deref(),
            record.adm4_name.as_deref(),
            record.adm5_name.as_deref(),
        ]
        .into_iter()
        .flatten()
        .chain(record.zip_codes.iter().map(String::as_str))
        .chain(record.is_in_zip.iter().map(String::as_str))
        .flat_map(normalized_words)
        .collect();

        Self {
            record,
            name,
            alternate,
            context,
        }
    }

    /// Best weight for `word` across fields, or `None` when it matches nothing.
    fn word_score(&self, word: &str, fuzzy: bool) -> Option<f32> {
        [
            (&self.name, NAME_WEIGHT),
            (&self.alternate, ALTERNATE_NAME_WEIGHT),
            (&self.context, CONTEXT_WEIGHT),
        ]
        .into_iter()
        .filter_map(|(words, weight)| {
            if words.iter().any(|w| w == word) {
                Some(weight)
            } else if fuzzy && word.chars().count() > 2 && words.iter().any(|w| within_one_edit(w, word)) {
                Some(weight * FUZZY_PENALTY)
            } else {
                None
            }
        })
        .max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
    }
}

fn within_one_edit(a: &str, b: &str) -> bool {
    levenshtein::distance(a.chars(), b.chars()) <= 1
}

impl MemoryBackend {
    pub fn new(records: impl IntoIterator<Item = CandidateRecord>) -> Self {
        Self {
            records: records.into_iter().map(IndexedRecord::new).collect(),
        }
    }

    pub fn insert(&mut self, record: CandidateRecord) {
        self.records.push(IndexedRecord::new(record));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn passes_filters(query: &FulltextQuery, record: &CandidateRecord) -> bool {
        if !query.accepts(record.place_type) {
            return false;
        }
        if let Some(code) = &query.country_code {
            let same_country = record
                .country_code
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(code));
            if !same_country {
                return false;
            }
        }
        query.proximity.is_none_or(|proximity| {
            let centre = Point::new(proximity.longitude, proximity.latitude);
            Haversine.distance(centre, record.location()) <= proximity.radius_km * 1000.0
        })
    }
}

impl SearchBackend for MemoryBackend {
    #[instrument(name = "Memory search", level = "debug", skip_all, fields(text = %query.text))]
    fn execute_query(&self, query: &FulltextQuery) -> Result<FulltextResults, BackendError> {
        let words = normalized_words(&query.text);
        if words.is_empty() || query.limit == 0 {
            return Ok(FulltextResults::default());
        }

        let mut hits: Vec<CandidateRecord> = self
            .records
            .iter()
            .filter(|indexed| Self::passes_filters(query, &indexed.record))
            .filter_map(|indexed| {
                let scores: Vec<Option<f32>> = words
                    .iter()
                    .map(|word| indexed.word_score(word, query.fuzzy))
                    .collect();
                let matched = scores.iter().flatten().count();
                if matched == 0 || (query.all_words_required && matched < words.len()) {
                    return None;
                }
                let score = scores.into_iter().flatten().sum();
                Some(indexed.record.clone().with_score(score))
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        let num_found = hits.len();
        hits.truncate(query.limit);
        debug!(num_found, returned = hits.len(), "Memory search complete");

        Ok(FulltextResults {
            results: hits,
            num_found,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PlaceType, Proximity};

    fn backend() -> MemoryBackend {
        MemoryBackend::new([
            CandidateRecord::new(PlaceType::City, "Springfield", 39.80, -89.64)
                .with_country_code("US")
                .with_adm_names(Some("Illinois"), None),
            CandidateRecord::new(PlaceType::City, "Springfield", 37.21, -93.29)
                .with_country_code("US")
                .with_adm_names(Some("Missouri"), None),
            CandidateRecord::new(PlaceType::Street, "Main St", 39.80, -89.65)
                .with_country_code("US")
                .with_is_in("Springfield"),
            CandidateRecord::new(PlaceType::City, "München", 48.14, 11.58)
                .with_country_code("DE")
                .with_alternate_name("Munich"),
        ])
    }

    #[test]
    fn test_name_matches_outrank_context_matches() {
        let results = backend()
            .execute_query(&FulltextQuery::new("Springfield", 10))
            .unwrap();
        assert_eq!(results.num_found, 3);
        assert_eq!(results.results[0].place_type, PlaceType::City);
        assert_eq!(results.results[0].score, 3.0);
        assert_eq!(results.results[2].name, "Main St");
        assert_eq!(results.results[2].score, 1.0);
    }

    #[test]
    fn test_filters_apply() {
        let backend = backend();
        let query = FulltextQuery::new("Springfield", 10)
            .place_types(PlaceType::STREET)
            .country_code(Some("us"));
        let results = backend.execute_query(&query).unwrap();
        assert_eq!(results.results.len(), 1);
        assert!(results.results[0].is_street());

        let query = FulltextQuery::new("Springfield", 10).country_code(Some("DE"));
        assert!(backend.execute_query(&query).unwrap().is_empty());
    }

    #[test]
    fn test_all_words_required() {
        let backend = backend();
        let relaxed = FulltextQuery::new("Springfield Missouri", 10);
        assert_eq!(backend.execute_query(&relaxed).unwrap().num_found, 3);

        let strict = relaxed.clone().all_words_required(true);
        let results = backend.execute_query(&strict).unwrap();
        assert_eq!(results.num_found, 1);
        assert_eq!(results.results[0].adm1_name.as_deref(), Some("Missouri"));
    }

    #[test]
    fn test_fuzzy_tolerates_one_edit() {
        let backend = backend();
        let strict = FulltextQuery::new("Springfeld", 10);
        assert!(backend.execute_query(&strict).unwrap().is_empty());

        let results = backend.execute_query(&strict.fuzzy(true)).unwrap();
        assert_eq!(results.num_found, 3);
        assert_eq!(results.top_score(), Some(1.5));
    }

    #[test]
    fn test_alternate_names_and_folding() {
        let backend = backend();
        let results = backend
            .execute_query(&FulltextQuery::new("munich", 10))
            .unwrap();
        assert_eq!(results.results[0].name, "München");
        assert_eq!(results.top_score(), Some(2.0));

        let results = backend
            .execute_query(&FulltextQuery::new("Munchen", 10))
            .unwrap();
        assert_eq!(results.top_score(), Some(3.0));
    }

    #[test]
    fn test_proximity_and_limit() {
        let backend = backend();
        let near_illinois = FulltextQuery::new("Springfield", 10).proximity(Some(Proximity::new(
            39.78, -89.65, 10.0,
        )));
        let results = backend.execute_query(&near_illinois).unwrap();
        assert_eq!(results.num_found, 2);
        assert!(
            results
                .results
                .iter()
                .all(|r| r.adm1_name.as_deref() != Some("Missouri"))
        );

        let limited = FulltextQuery::new("Springfield", 1);
        let results = backend.execute_query(&limited).unwrap();
        assert_eq!(results.num_found, 3);
        assert_eq!(results.results.len(), 1);

        assert!(
            backend
                .execute_query(&FulltextQuery::new("Springfield", 0))
                .unwrap()
                .is_empty()
        );
    }
}
