//! The resolver entry points.
//!
//! [`Geocoder`] turns a free-text or structured query into a [`ResultSet`]. It owns the
//! search backend and every collaborator as shared trait objects, so one instance can
//! serve concurrent requests.
//!
//! ```rust
//! use locus::{AddressQuery, CandidateRecord, Geocoder, MemoryBackend, PlaceType};
//!
//! let backend = MemoryBackend::new([
//!     CandidateRecord::new(PlaceType::City, "Springfield", 39.80, -89.64).with_country_code("US"),
//! ]);
//! let geocoder = Geocoder::new(backend);
//!
//! let results = geocoder.resolve(&AddressQuery::new("Springfield").into())?;
//! assert_eq!(results.first().and_then(|a| a.city.as_deref()), Some("Springfield"));
//! # Ok::<(), locus::error::GeocodingError>(())
//! ```

use std::{sync::Arc, time::Instant};

use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::{
    assemble::AddressAssembler,
    collaborators::{
        AddressParser, BasicCountryDetector, BasicLabelFormatter, BasicStreetTypeDetector, CountryDetector,
        Decompounder, GermanicDecompounder, LabelFormatter, NoopUsageCounter, StreetTypeDetector, UsageCounter,
    },
    config::GeocoderConfig,
    error::{GeocodingError, Result},
    housenumber::split_house_number,
    model::{Address, AddressQuery, PlaceType, Query, ResultSet},
    search::{
        FulltextQuery, SearchBackend,
        strategy::{SearchRequest, SearchStrategy},
    },
    text::{self, ExactMatchCarveOut, UkPostcodeCarveOut},
};

/// Usage counter incremented once per free-text request
pub const USAGE_FREE_TEXT: &str = "geocode";
/// Usage counter incremented once per structured request
pub const USAGE_STRUCTURED: &str = "geocode_structured";

/// Resolves addresses against a search backend.
#[derive(Clone)]
pub struct Geocoder {
    backend: Arc<dyn SearchBackend>,
    parser: Option<Arc<dyn AddressParser>>,
    country_detector: Arc<dyn CountryDetector>,
    decompounder: Arc<dyn Decompounder>,
    street_types: Arc<dyn StreetTypeDetector>,
    usage: Arc<dyn UsageCounter>,
    formatter: Arc<dyn LabelFormatter>,
    carve_outs: Vec<Arc<dyn ExactMatchCarveOut>>,
    config: GeocoderConfig,
}

impl Geocoder {
    /// A geocoder with the default configuration and collaborators and no parser.
    pub fn new(backend: impl SearchBackend + 'static) -> Self {
        GeocoderBuilder::new(Arc::new(backend)).assemble()
    }

    pub fn builder(backend: Arc<dyn SearchBackend>) -> GeocoderBuilder {
        GeocoderBuilder::new(backend)
    }

    #[must_use]
    pub fn config(&self) -> &GeocoderConfig {
        &self.config
    }

    /// Resolve either kind of query.
    pub fn resolve(&self, query: &Query) -> Result<ResultSet> {
        match query {
            Query::FreeText(query) => self.resolve_text(query),
            Query::Structured(query) => self.structured_request(
                &query.address,
                query.country_code.as_deref(),
                query.limit,
                query.parse_unlock_key,
            ),
        }
    }

    /// Resolve a structured address. `country_code` fills in a missing
    /// `address.country_code`.
    pub fn resolve_structured(&self, address: &Address, country_code: Option<&str>) -> Result<ResultSet> {
        self.structured_request(address, country_code, None, 0)
    }

    #[instrument(name = "Resolve structured address", level = "info", skip_all)]
    fn structured_request(
        &self,
        address: &Address,
        country_code: Option<&str>,
        limit: Option<usize>,
        unlock_key: u64,
    ) -> Result<ResultSet> {
        validate_country_code(country_code)?;
        validate_country_code(address.country_code.as_deref())?;
        self.usage.increment(USAGE_STRUCTURED);
        let mut results = self.resolve_structured_inner(address, country_code)?;
        if self.config.unlocks_parsed_address(unlock_key) {
            results.parsed_address = Some(address.clone());
        }
        results.truncate(limit.unwrap_or(self.config.default_result_limit));
        info!(
            elapsed = ?results.elapsed,
            num_found = results.num_found,
            fuzzy = results.is_fuzzy(),
            "Resolved structured address"
        );
        Ok(results)
    }

    /// Resolve independent queries in parallel, one result per query in input order.
    #[instrument(name = "Resolve batch", level = "info", skip_all, fields(batch_size = queries.len()))]
    pub fn resolve_batch(&self, queries: &[Query]) -> Vec<Result<ResultSet>> {
        queries.par_iter().map(|query| self.resolve(query)).collect()
    }

    #[instrument(name = "Resolve free text", level = "info", skip_all, fields(text = %query.text))]
    fn resolve_text(&self, query: &AddressQuery) -> Result<ResultSet> {
        let started = Instant::now();
        if query.text.trim().is_empty() {
            return Err(GeocodingError::InvalidInput("Address text is empty".to_string()));
        }
        let mut country_code = validate_country_code(query.country_code.as_deref())?;
        self.usage.increment(USAGE_FREE_TEXT);

        let detection = self.country_detector.detect_and_strip(&query.text);
        let mut text = query.text.trim().to_string();
        if let Some(detected) = detection.country_code {
            if detection.remaining.trim().is_empty() {
                debug!(country = %detected, "Query is a country name");
                let mut results = self.resolve_country(&text)?;
                results.elapsed = started.elapsed();
                return Ok(results);
            }
            text = detection.remaining;
            country_code.get_or_insert(detected);
        }

        let needs_parsing = text::needs_parsing(&text);
        let mut parsed_address = None;
        if (self.config.use_address_parser || query.postal) && needs_parsing {
            if let Some(parsed) = self.parse(&text, country_code.as_deref()) {
                if parsed.is_geocodable() {
                    debug!("Resolving parsed address");
                    let mut results = self.resolve_structured_inner(&parsed, country_code.as_deref())?;
                    self.expose_parsed(&mut results, query, Some(parsed));
                    results.truncate(query.limit.unwrap_or(self.config.default_result_limit));
                    results.elapsed = started.elapsed();
                    return Ok(results);
                }
                parsed_address = Some(parsed);
            }
        }

        let mut results = self.search_text(&text, query, country_code.as_deref(), needs_parsing)?;
        self.expose_parsed(&mut results, query, parsed_address);
        results.truncate(query.limit.unwrap_or(self.config.default_result_limit));
        results.elapsed = started.elapsed();
        info!(
            elapsed = ?results.elapsed,
            num_found = results.num_found,
            fuzzy = results.is_fuzzy(),
            "Resolved free-text query"
        );
        Ok(results)
    }

    /// First parser candidate; parser failures are logged and ignored.
    fn parse(&self, text: &str, country_code: Option<&str>) -> Option<Address> {
        let parser = self.parser.as_ref()?;
        match parser.parse(text, country_code) {
            Ok(addresses) => addresses.into_iter().next(),
            Err(e) => {
                warn!(error = %e, "Address parser failed, falling back to heuristics");
                None
            }
        }
    }

    fn expose_parsed(&self, results: &mut ResultSet, query: &AddressQuery, parsed: Option<Address>) {
        if self.config.unlocks_parsed_address(query.parse_unlock_key) {
            results.parsed_address = parsed;
        }
    }

    /// Heuristic path: clean the text, split off the house number, detect street types
    /// and run a strict pass, escalating to fuzzy when it underperforms.
    fn search_text(
        &self,
        text: &str,
        query: &AddressQuery,
        country_code: Option<&str>,
        needs_parsing: bool,
    ) -> Result<ResultSet> {
        let prepared = text::prepare_query(text);
        if prepared.is_empty() {
            return Ok(ResultSet::empty());
        }
        let (house_number, street_text) = split_house_number(&prepared);

        let street_types = self.street_types.street_types(&street_text);
        let street_detected = street_types.len() == 1;
        let mut primary = street_text;
        let mut alternate = None;
        if street_detected {
            let compound_country =
                country_code.is_some_and(|code| self.decompounder.is_compound_language_country(code));
            if compound_country || self.decompounder.looks_compound(&primary) {
                let alternate_form = self
                    .decompounder
                    .expand_street_type(&self.decompounder.alternate_form(&primary));
                primary = self.decompounder.expand_street_type(&primary);
                alternate = Some(alternate_form).filter(|form| *form != primary);
            }
        }
        debug!(
            house_number = house_number.as_deref(),
            street_detected,
            primary = %primary,
            alternate = alternate.as_deref(),
            "Prepared query"
        );

        let request = SearchRequest {
            text: &primary,
            alternate: alternate.as_deref(),
            country_code,
            needs_parsing,
            house_number: house_number.as_deref(),
            fuzzy: false,
            proximity: query.proximity,
            street_detected,
        };
        let strategy = self.strategy();
        let strict = strategy.do_search(&request)?;

        let underperforms = strict
            .first()
            .is_none_or(|top| top.score < self.config.fuzzy_score_threshold);
        if !(query.fuzzy && underperforms) {
            return Ok(strict);
        }

        debug!(strict = strict.len(), "Strict pass underperformed, escalating to fuzzy search");
        strategy.do_search(&request.with_fuzzy(true))
    }

    /// The whole query named a country: return that country alone.
    fn resolve_country(&self, text: &str) -> Result<ResultSet> {
        let query = FulltextQuery::new(text, self.config.exact_match_page_size)
            .place_types(PlaceType::ONLY_COUNTRY)
            .all_words_required(true);
        let found = self.backend.execute_query(&query)?;
        Ok(match found.results.first() {
            Some(country) => ResultSet::new(vec![self.assembler().build_country(country)]),
            None => ResultSet::empty(),
        })
    }

    fn resolve_structured_inner(&self, address: &Address, country_code: Option<&str>) -> Result<ResultSet> {
        let started = Instant::now();
        let country_code = validate_country_code(country_code)?;
        let own_country_code = validate_country_code(address.country_code.as_deref())?;
        if address.has_intersection() {
            return Err(GeocodingError::UnsupportedIntersection);
        }
        if !address.is_geocodable() {
            return Err(GeocodingError::NotGeocodable);
        }

        let mut address = address.clone();
        address.country_code = own_country_code.or(country_code);
        let house_number = address.house_number.take();
        address.house_number_info = None;

        let envelope = self.formatter.postal_envelope(&address);
        let code = address.country_code.as_deref();
        let strategy = self.strategy();

        let search = |fuzzy: bool| -> Result<_> {
            if address.has_street_name() {
                Ok(strategy.search_street(&envelope, code, fuzzy, None)?.results)
            } else {
                strategy.search_exact(&envelope, code, fuzzy, locality_place_types(&address), None)
            }
        };
        let mut fuzzy = false;
        let mut candidates = search(false)?;
        if candidates.is_empty() {
            debug!(envelope = %envelope, "Strict structured search found nothing, retrying fuzzy");
            fuzzy = true;
            candidates = search(true)?;
        }

        let mut results = strategy
            .assembler
            .build_addresses(&candidates, house_number.as_deref(), code);
        results.truncate(self.config.structured_result_cap);
        if fuzzy {
            results.mark_fuzzy();
        }
        results.elapsed = started.elapsed();
        Ok(results)
    }

    fn assembler(&self) -> AddressAssembler<'_> {
        AddressAssembler::new(&self.config, self.formatter.as_ref(), self.street_types.as_ref())
    }

    fn strategy(&self) -> SearchStrategy<'_> {
        SearchStrategy {
            backend: self.backend.as_ref(),
            config: &self.config,
            carve_outs: &self.carve_outs,
            assembler: self.assembler(),
        }
    }
}

/// Uppercased code, or `InvalidInput` unless it is exactly two ASCII letters.
fn validate_country_code(code: Option<&str>) -> Result<Option<String>> {
    match code.map(str::trim) {
        None => Ok(None),
        Some(code) if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) => {
            Ok(Some(code.to_ascii_uppercase()))
        }
        Some(code) => Err(GeocodingError::InvalidInput(format!(
            "Country code must be two letters, got {code:?}"
        ))),
    }
}

fn locality_place_types(address: &Address) -> &'static [PlaceType] {
    let present = |field: &Option<String>| field.as_deref().is_some_and(|value| !value.trim().is_empty());
    let city = present(&address.city) || present(&address.post_town);
    let zip = present(&address.zip_code);
    let subdivision = present(&address.city_subdivision);

    if present(&address.state) && city && zip && subdivision {
        PlaceType::ONLY_ADM
    } else if city || zip || subdivision {
        PlaceType::CITY_AND_CITYSUB
    } else {
        PlaceType::CITY_CITYSUB_ADM
    }
}

/// Builder for [`Geocoder`] with replaceable collaborators.
#[derive(Clone)]
pub struct GeocoderBuilder {
    backend: Arc<dyn SearchBackend>,
    parser: Option<Arc<dyn AddressParser>>,
    country_detector: Arc<dyn CountryDetector>,
    decompounder: Arc<dyn Decompounder>,
    street_types: Arc<dyn StreetTypeDetector>,
    usage: Arc<dyn UsageCounter>,
    formatter: Arc<dyn LabelFormatter>,
    carve_outs: Vec<Arc<dyn ExactMatchCarveOut>>,
    config: GeocoderConfig,
}

impl GeocoderBuilder {
    /// Create a builder with the default collaborators and configuration.
    #[must_use]
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            parser: None,
            country_detector: Arc::new(BasicCountryDetector::default()),
            decompounder: Arc::new(GermanicDecompounder),
            street_types: Arc::new(BasicStreetTypeDetector::default()),
            usage: Arc::new(NoopUsageCounter),
            formatter: Arc::new(BasicLabelFormatter),
            carve_outs: vec![Arc::new(UkPostcodeCarveOut)],
            config: GeocoderConfig::default(),
        }
    }

    #[must_use]
    pub fn config(mut self, config: GeocoderConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn parser(mut self, parser: Arc<dyn AddressParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    #[must_use]
    pub fn country_detector(mut self, detector: Arc<dyn CountryDetector>) -> Self {
        self.country_detector = detector;
        self
    }

    #[must_use]
    pub fn decompounder(mut self, decompounder: Arc<dyn Decompounder>) -> Self {
        self.decompounder = decompounder;
        self
    }

    #[must_use]
    pub fn street_type_detector(mut self, detector: Arc<dyn StreetTypeDetector>) -> Self {
        self.street_types = detector;
        self
    }

    #[must_use]
    pub fn usage_counter(mut self, counter: Arc<dyn UsageCounter>) -> Self {
        self.usage = counter;
        self
    }

    #[must_use]
    pub fn label_formatter(mut self, formatter: Arc<dyn LabelFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    /// Add an exact-match carve-out next to the UK postcode one.
    #[must_use]
    pub fn carve_out(mut self, carve_out: Arc<dyn ExactMatchCarveOut>) -> Self {
        self.carve_outs.push(carve_out);
        self
    }

    /// Drop every exact-match carve-out, including the default one.
    #[must_use]
    pub fn without_carve_outs(mut self) -> Self {
        self.carve_outs.clear();
        self
    }

    /// Validate the configuration and build the `Geocoder`.
    pub fn build(self) -> Result<Geocoder> {
        self.config.validate()?;
        Ok(self.assemble())
    }

    fn assemble(self) -> Geocoder {
        Geocoder {
            backend: self.backend,
            parser: self.parser,
            country_detector: self.country_detector,
            decompounder: self.decompounder,
            street_types: self.street_types,
            usage: self.usage,
            formatter: self.formatter,
            carve_outs: self.carve_outs,
            config: self.config,
        }
    }
}
