use std::sync::Arc;

use tracing::{debug, instrument};

use super::{FulltextQuery, FulltextResults, SearchBackend};
use crate::{
    assemble::AddressAssembler,
    config::GeocoderConfig,
    error::Result,
    model::{CandidateRecord, PlaceType, Proximity, ResultSet},
    text::{ExactMatchCarveOut, is_same_name},
};

/// Everything one pass of [`SearchStrategy::do_search`] needs to know about the query.
#[derive(Debug, Clone, Default)]
pub(crate) struct SearchRequest<'a> {
    pub text: &'a str,
    /// Alternate spelling searched as a second street query
    pub alternate: Option<&'a str>,
    pub country_code: Option<&'a str>,
    pub needs_parsing: bool,
    pub house_number: Option<&'a str>,
    pub fuzzy: bool,
    pub proximity: Option<Proximity>,
    /// A single street-type token was found, so the text is certainly a street
    pub street_detected: bool,
}

impl SearchRequest<'_> {
    pub(crate) fn with_fuzzy(&self, fuzzy: bool) -> Self {
        Self {
            fuzzy,
            ..self.clone()
        }
    }
}

/// Decides which backend queries to issue and merges their results.
pub(crate) struct SearchStrategy<'a> {
    pub backend: &'a dyn SearchBackend,
    pub config: &'a GeocoderConfig,
    pub carve_outs: &'a [Arc<dyn ExactMatchCarveOut>],
    pub assembler: AddressAssembler<'a>,
}

impl SearchStrategy<'_> {
    /// Exact locality phase, street phase and assembly for one (strict or fuzzy) pass.
    #[instrument(name = "Search pass", level = "debug", skip_all, fields(text = request.text, fuzzy = request.fuzzy))]
    pub(crate) fn do_search(&self, request: &SearchRequest<'_>) -> Result<ResultSet> {
        let mut candidates = Vec::new();

        if request.street_detected {
            debug!("Street type detected, skipping exact match phase");
        } else {
            candidates = self.search_exact(
                request.text,
                request.country_code,
                request.fuzzy,
                PlaceType::LOCALITY_AND_COUNTRY,
                request.proximity,
            )?;

            if !request.needs_parsing && !candidates.is_empty() {
                debug!(exact = candidates.len(), "Single word query answered by exact matches");
                return Ok(self.finish(&candidates, request));
            }
        }

        let mut streets = self.search_street(request.text, request.country_code, request.fuzzy, request.proximity)?;
        if let Some(alternate) = request.alternate {
            let alternate_streets =
                self.search_street(alternate, request.country_code, request.fuzzy, request.proximity)?;
            if prefer_alternate(&streets, &alternate_streets) {
                debug!(alternate, "Alternate spelling scored higher");
                streets = alternate_streets;
            }
        }

        candidates.extend(streets.results);
        Ok(self.finish(&candidates, request))
    }

    fn finish(&self, candidates: &[CandidateRecord], request: &SearchRequest<'_>) -> ResultSet {
        let mut results =
            self.assembler
                .build_addresses(candidates, request.house_number, request.country_code);
        if request.fuzzy {
            results.mark_fuzzy();
        }
        results
    }

    /// Locality search with every word required, narrowed to records whose name is the
    /// same as `text` when any are.
    #[instrument(name = "Exact search", level = "debug", skip(self))]
    pub(crate) fn search_exact(
        &self,
        text: &str,
        country_code: Option<&str>,
        fuzzy: bool,
        place_types: &[PlaceType],
        proximity: Option<Proximity>,
    ) -> Result<Vec<CandidateRecord>> {
        let query = FulltextQuery::new(text, self.config.exact_match_page_size)
            .place_types(place_types)
            .country_code(country_code)
            .proximity(proximity)
            .fuzzy(fuzzy)
            .all_words_required(true);
        let found = self.backend.execute_query(&query)?;
        let matches = find_exact_matches(
            text,
            found.results,
            self.config.name_similarity_budget,
            self.carve_outs,
        );
        debug!(found = found.num_found, kept = matches.len(), "Exact search complete");
        Ok(matches)
    }

    /// Street search with relaxed word matching.
    #[instrument(name = "Street search", level = "debug", skip(self))]
    pub(crate) fn search_street(
        &self,
        text: &str,
        country_code: Option<&str>,
        fuzzy: bool,
        proximity: Option<Proximity>,
    ) -> Result<FulltextResults> {
        let query = FulltextQuery::new(text, self.config.street_page_size)
            .place_types(PlaceType::STREET)
            .country_code(country_code)
            .proximity(proximity)
            .fuzzy(fuzzy);
        let found = self.backend.execute_query(&query)?;
        debug!(found = found.num_found, "Street search complete");
        Ok(found)
    }
}

/// The alternate street list wins only when the primary is empty or the alternate's top
/// score is strictly higher.
fn prefer_alternate(primary: &FulltextResults, alternate: &FulltextResults) -> bool {
    match (primary.top_score(), alternate.top_score()) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(primary), Some(alternate)) => alternate > primary,
    }
}

/// Keep candidates whose name, an alternate name, or the name qualified by its
/// locality is the same as `text`. When none is, every candidate is kept. A matching
/// carve-out also keeps everything.
pub(crate) fn find_exact_matches(
    text: &str,
    candidates: Vec<CandidateRecord>,
    budget: usize,
    carve_outs: &[Arc<dyn ExactMatchCarveOut>],
) -> Vec<CandidateRecord> {
    if carve_outs.iter().any(|carve_out| carve_out.keeps_all(text)) {
        return candidates;
    }
    let same_name: Vec<CandidateRecord> = candidates
        .iter()
        .filter(|candidate| {
            let qualified = candidate
                .qualified_is_in()
                .map(|is_in| format!("{} {is_in}", candidate.name));
            std::iter::once(&candidate.name)
                .chain(&candidate.alternate_names)
                .chain(qualified.as_ref())
                .any(|name| is_same_name(text, name, budget))
        })
        .cloned()
        .collect();
    if same_name.is_empty() {
        debug!(candidates = candidates.len(), "No same-name candidate, keeping all exact hits");
        return candidates;
    }
    same_name
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{
        collaborators::{BasicLabelFormatter, BasicStreetTypeDetector},
        search::BackendError,
        text::UkPostcodeCarveOut,
    };

    /// Answers each query from a script keyed by place-type filter and records what it
    /// was asked.
    #[derive(Default)]
    struct ScriptedBackend {
        streets: Vec<CandidateRecord>,
        localities: Vec<CandidateRecord>,
        alternate_streets: Vec<CandidateRecord>,
        alternate_text: Option<String>,
        seen: Mutex<Vec<FulltextQuery>>,
    }

    impl SearchBackend for ScriptedBackend {
        fn execute_query(&self, query: &FulltextQuery) -> std::result::Result<FulltextResults, BackendError> {
            self.seen.lock().unwrap().push(query.clone());
            let results = if query.place_types == PlaceType::STREET {
                if self.alternate_text.as_deref() == Some(query.text.as_str()) {
                    self.alternate_streets.clone()
                } else {
                    self.streets.clone()
                }
            } else {
                self.localities.clone()
            };
            Ok(FulltextResults {
                num_found: results.len(),
                results,
            })
        }
    }

    fn with_strategy<T>(backend: &ScriptedBackend, f: impl FnOnce(&SearchStrategy<'_>) -> T) -> T {
        let config = GeocoderConfig::default();
        let formatter = BasicLabelFormatter;
        let street_types = BasicStreetTypeDetector::default();
        let carve_outs: Vec<Arc<dyn ExactMatchCarveOut>> = vec![Arc::new(UkPostcodeCarveOut)];
        let strategy = SearchStrategy {
            backend,
            config: &config,
            carve_outs: &carve_outs,
            assembler: AddressAssembler::new(&config, &formatter, &street_types),
        };
        f(&strategy)
    }

    fn city(name: &str, score: f32) -> CandidateRecord {
        CandidateRecord::new(PlaceType::City, name, 39.8, -89.6)
            .with_score(score)
            .with_country_code("US")
    }

    fn street(name: &str, score: f32) -> CandidateRecord {
        CandidateRecord::new(PlaceType::Street, name, 39.8, -89.6)
            .with_score(score)
            .with_is_in("Springfield")
    }

    #[test]
    fn test_single_word_returns_exact_matches_only() {
        let backend = ScriptedBackend {
            localities: vec![city("Springfield", 5.0), city("Springfield Gardens", 4.0)],
            streets: vec![street("Springfield Rd", 3.0)],
            ..Default::default()
        };
        let results = with_strategy(&backend, |strategy| {
            strategy.do_search(&SearchRequest {
                text: "Springfield",
                ..Default::default()
            })
        })
        .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results.addresses[0].city.as_deref(), Some("Springfield"));
        assert_eq!(backend.seen.lock().unwrap().len(), 1, "street phase skipped");
        assert!(!results.is_fuzzy());
    }

    #[test]
    fn test_exact_phase_requires_all_words_and_locality_types() {
        let backend = ScriptedBackend::default();
        with_strategy(&backend, |strategy| {
            strategy.do_search(&SearchRequest {
                text: "Springfield",
                country_code: Some("us"),
                ..Default::default()
            })
        })
        .unwrap();

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 2, "empty exact phase falls through to streets");
        assert!(seen[0].all_words_required);
        assert_eq!(seen[0].limit, 10);
        assert_eq!(seen[0].place_types, PlaceType::LOCALITY_AND_COUNTRY);
        assert_eq!(seen[0].country_code.as_deref(), Some("US"));
        assert!(!seen[1].all_words_required);
        assert_eq!(seen[1].limit, 50);
        assert_eq!(seen[1].place_types, PlaceType::STREET);
    }

    #[test]
    fn test_street_detection_skips_exact_phase() {
        let backend = ScriptedBackend {
            localities: vec![city("Main", 9.0)],
            streets: vec![street("Main St", 3.0)],
            ..Default::default()
        };
        let results = with_strategy(&backend, |strategy| {
            strategy.do_search(&SearchRequest {
                text: "Main St",
                needs_parsing: true,
                street_detected: true,
                fuzzy: true,
                ..Default::default()
            })
        })
        .unwrap();

        assert_eq!(backend.seen.lock().unwrap().len(), 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results.addresses[0].street_name.as_deref(), Some("Main St"));
        assert!(results.is_fuzzy());
    }

    #[test]
    fn test_exact_results_precede_street_results() {
        let backend = ScriptedBackend {
            localities: vec![city("Springfield Main", 2.0)],
            streets: vec![street("Springfield Main", 8.0)],
            ..Default::default()
        };
        let results = with_strategy(&backend, |strategy| {
            strategy.do_search(&SearchRequest {
                text: "Springfield Main",
                needs_parsing: true,
                ..Default::default()
            })
        })
        .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results.addresses[0].city.as_deref(), Some("Springfield Main"));
        assert_eq!(results.addresses[1].street_name.as_deref(), Some("Springfield Main"));
    }

    #[test]
    fn test_alternate_spelling_needs_a_strictly_higher_score() {
        let run = |primary: f32, alternate: f32| {
            let backend = ScriptedBackend {
                streets: vec![street("Haupt Straße", primary)],
                alternate_streets: vec![street("Hauptstraße", alternate)],
                alternate_text: Some("Hauptstraße".to_string()),
                ..Default::default()
            };
            let results = with_strategy(&backend, |strategy| {
                strategy.do_search(&SearchRequest {
                    text: "Haupt Straße",
                    alternate: Some("Hauptstraße"),
                    street_detected: true,
                    ..Default::default()
                })
            })
            .unwrap();
            results.addresses[0].street_name.clone().unwrap()
        };

        assert_eq!(run(4.0, 4.0), "Haupt Straße");
        assert_eq!(run(4.0, 4.5), "Hauptstraße");
        assert_eq!(run(4.5, 4.0), "Haupt Straße");
    }

    #[test]
    fn test_alternate_used_when_primary_is_empty() {
        let backend = ScriptedBackend {
            alternate_streets: vec![street("Hauptstraße", 1.0)],
            alternate_text: Some("Hauptstraße".to_string()),
            ..Default::default()
        };
        let results = with_strategy(&backend, |strategy| {
            strategy.do_search(&SearchRequest {
                text: "Haupt Straße",
                alternate: Some("Hauptstraße"),
                street_detected: true,
                ..Default::default()
            })
        })
        .unwrap();
        assert_eq!(results.addresses[0].street_name.as_deref(), Some("Hauptstraße"));
    }

    #[test]
    fn test_exact_filter_keeps_similar_names() {
        let candidates = vec![
            city("Springfield", 1.0),
            city("Springfeld", 1.0),
            city("Shelbyville", 1.0),
            city("Paris", 1.0).with_alternate_name("Springfield"),
        ];
        let kept = find_exact_matches("springfield", candidates, 1, &[]);
        let names: Vec<_> = kept.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Springfield", "Springfeld", "Paris"]);
    }

    #[test]
    fn test_exact_filter_accepts_locality_qualified_names() {
        let quarter = CandidateRecord::new(PlaceType::CitySubdivision, "Mitte", 52.5, 13.4)
            .with_is_in("Berlin");
        let kept = find_exact_matches("Berlin Mitte", vec![quarter], 1, &[]);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_carve_out_keeps_every_candidate() {
        let carve_outs: Vec<Arc<dyn ExactMatchCarveOut>> = vec![Arc::new(UkPostcodeCarveOut)];
        let candidates = vec![city("Westminster", 1.0), city("SW1A 2AA", 1.0)];
        let kept = find_exact_matches("SW1A 2AA", candidates.clone(), 1, &carve_outs);
        assert_eq!(kept.len(), 2);

        let kept = find_exact_matches("SW1A 2AA", candidates, 1, &[]);
        let names: Vec<_> = kept.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["SW1A 2AA"]);
    }

    #[test]
    fn test_exact_filter_without_same_name_keeps_all_hits() {
        let candidates = vec![city("Shelbyville", 2.0), city("Capital City", 1.0)];
        let kept = find_exact_matches("Springfield", candidates, 1, &[]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_single_word_answered_by_unfiltered_exact_hit() {
        let quarter = CandidateRecord::new(PlaceType::CitySubdivision, "Mitte", 52.52, 13.40)
            .with_is_in("Berlin")
            .with_country_code("DE");
        let backend = ScriptedBackend {
            localities: vec![quarter],
            streets: vec![street("Berliner Str", 3.0)],
            ..Default::default()
        };
        let results = with_strategy(&backend, |strategy| {
            strategy.do_search(&SearchRequest {
                text: "Berlin",
                ..Default::default()
            })
        })
        .unwrap();

        assert_eq!(backend.seen.lock().unwrap().len(), 1, "street phase skipped");
        assert_eq!(results.len(), 1);
        assert_eq!(results.addresses[0].quarter.as_deref(), Some("Mitte"));
    }

    #[test]
    fn test_exact_phase_carries_proximity() {
        let near = Proximity::new(39.8, -89.6, 25.0);
        let backend = ScriptedBackend::default();
        with_strategy(&backend, |strategy| {
            strategy.do_search(&SearchRequest {
                text: "Springfield",
                proximity: Some(near),
                ..Default::default()
            })
        })
        .unwrap();

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|query| query.proximity == Some(near)));
    }

    #[test]
    fn test_prefer_alternate() {
        let results = |score: Option<f32>| FulltextResults {
            results: score.map(|s| street("x", s)).into_iter().collect(),
            num_found: usize::from(score.is_some()),
        };
        assert!(!prefer_alternate(&results(Some(1.0)), &results(None)));
        assert!(!prefer_alternate(&results(None), &results(None)));
        assert!(prefer_alternate(&results(None), &results(Some(0.1))));
        assert!(!prefer_alternate(&results(Some(1.0)), &results(Some(1.0))));
        assert!(prefer_alternate(&results(Some(1.0)), &results(Some(1.1))));
    }
}
