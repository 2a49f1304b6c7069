use crate::error::GeocodingError;

/// Tuning knobs of the resolver. Use [`GeocoderConfigBuilder`] to construct validated
/// values.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct GeocoderConfig {
    /// Try the address parser on multi-token free text even for non-postal queries
    pub use_address_parser: bool,
    /// A strict pass whose best score is below this escalates to fuzzy search
    pub fuzzy_score_threshold: f32,
    /// Maximum difference in degrees between a street's start and end bearing for
    /// house-number interpolation
    pub interpolation_curve_tolerance: f64,
    /// Adjacent street candidates further apart than this are separate streets
    pub same_street_max_distance_m: f64,
    pub exact_match_page_size: usize,
    pub street_page_size: usize,
    /// Maximum number of addresses returned for a structured query
    pub structured_result_cap: usize,
    /// Free-text result limit when the query sets none
    pub default_result_limit: usize,
    /// Total edit distance tolerated when comparing a name with the query
    pub name_similarity_budget: usize,
    /// Key a query must carry to see the parser output; zero disables exposure
    pub parsed_address_unlock_key: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            use_address_parser: false,
            fuzzy_score_threshold: 3.0,
            interpolation_curve_tolerance: 45.0,
            same_street_max_distance_m: 12_000.0,
            exact_match_page_size: 10,
            street_page_size: 50,
            structured_result_cap: 10,
            default_result_limit: 10,
            name_similarity_budget: 1,
            parsed_address_unlock_key: 0,
        }
    }
}

impl GeocoderConfig {
    pub fn builder() -> GeocoderConfigBuilder {
        GeocoderConfigBuilder::new()
    }

    /// Whether `key` unlocks the parser output.
    #[must_use]
    pub fn unlocks_parsed_address(&self, key: u64) -> bool {
        self.parsed_address_unlock_key != 0 && self.parsed_address_unlock_key == key
    }

    pub fn validate(&self) -> Result<(), GeocodingError> {
        if !self.fuzzy_score_threshold.is_finite() || self.fuzzy_score_threshold < 0.0 {
            return Err(GeocodingError::Config(format!(
                "Fuzzy score threshold must be a non-negative number, got {}",
                self.fuzzy_score_threshold
            )));
        }
        if !(self.interpolation_curve_tolerance > 0.0 && self.interpolation_curve_tolerance <= 180.0) {
            return Err(GeocodingError::Config(format!(
                "Interpolation curve tolerance must be in (0, 180] degrees, got {}",
                self.interpolation_curve_tolerance
            )));
        }
        if !(self.same_street_max_distance_m.is_finite() && self.same_street_max_distance_m > 0.0) {
            return Err(GeocodingError::Config(format!(
                "Same-street distance must be positive, got {}",
                self.same_street_max_distance_m
            )));
        }
        for (name, value) in [
            ("exact_match_page_size", self.exact_match_page_size),
            ("street_page_size", self.street_page_size),
            ("structured_result_cap", self.structured_result_cap),
            ("default_result_limit", self.default_result_limit),
        ] {
            if value == 0 {
                return Err(GeocodingError::Config(format!("{name} must be at least 1")));
            }
        }
        Ok(())
    }
}

/// Builder for [`GeocoderConfig`] with presets.
#[derive(Debug, Clone, Default)]
pub struct GeocoderConfigBuilder {
    config: GeocoderConfig,
}

impl GeocoderConfigBuilder {
    /// Create a new builder with the default configuration
    pub fn new() -> Self {
        Self {
            config: GeocoderConfig::default(),
        }
    }

    /// Exact names only, fewer and smaller result pages, no parser
    pub fn strict() -> Self {
        let mut builder = Self::new();
        builder.config.use_address_parser = false;
        builder.config.name_similarity_budget = 0;
        builder.config.street_page_size = 20;
        builder.config.default_result_limit = 5;
        builder.config.structured_result_cap = 5;
        builder
    }

    /// Route every multi-token query through the address parser
    pub fn postal() -> Self {
        let mut builder = Self::new();
        builder.config.use_address_parser = true;
        builder
    }

    pub fn use_address_parser(mut self, enabled: bool) -> Self {
        self.config.use_address_parser = enabled;
        self
    }

    pub fn fuzzy_score_threshold(mut self, threshold: f32) -> Self {
        self.config.fuzzy_score_threshold = threshold;
        self
    }

    /// Set the maximum start/end bearing difference, in degrees, for interpolation
    pub fn interpolation_curve_tolerance(mut self, degrees: f64) -> Self {
        self.config.interpolation_curve_tolerance = degrees;
        self
    }

    pub fn same_street_max_distance_m(mut self, metres: f64) -> Self {
        self.config.same_street_max_distance_m = metres;
        self
    }

    /// Set the page sizes of the exact locality and street searches
    pub fn page_sizes(mut self, exact: usize, street: usize) -> Self {
        self.config.exact_match_page_size = exact;
        self.config.street_page_size = street;
        self
    }

    pub fn structured_result_cap(mut self, cap: usize) -> Self {
        self.config.structured_result_cap = cap;
        self
    }

    pub fn default_result_limit(mut self, limit: usize) -> Self {
        self.config.default_result_limit = limit;
        self
    }

    pub fn name_similarity_budget(mut self, budget: usize) -> Self {
        self.config.name_similarity_budget = budget;
        self
    }

    pub fn parsed_address_unlock_key(mut self, key: u64) -> Self {
        self.config.parsed_address_unlock_key = key;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<GeocoderConfig, GeocodingError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
