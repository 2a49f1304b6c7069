//! Locus - Address Resolution Library
//!
//! Locus resolves free-text and structured address queries against a full-text gazetteer
//! of streets, localities, administrative areas and countries. It picks the right search
//! strategy for a query, groups street segments, interpolates house numbers and returns
//! structured, labelled addresses.
//!
//! # Quick Start
//!
//! ```rust
//! use locus::{AddressQuery, CandidateRecord, Geocoder, MemoryBackend, PlaceType};
//!
//! let backend = MemoryBackend::new([
//!     CandidateRecord::new(PlaceType::City, "Springfield", 39.80, -89.64).with_country_code("US"),
//!     CandidateRecord::new(PlaceType::Street, "Main St", 39.80, -89.65)
//!         .with_country_code("US")
//!         .with_is_in("Springfield")
//!         .with_house_number("8", 39.800, -89.650)
//!         .with_house_number("12", 39.802, -89.650),
//! ]);
//! let geocoder = Geocoder::new(backend);
//!
//! let results = geocoder.resolve(&AddressQuery::new("10 Main St, Springfield, US").into())?;
//! if let Some(address) = results.first() {
//!     println!("{}", address.formatted_full.as_deref().unwrap_or_default());
//! }
//! # Ok::<(), locus::error::GeocodingError>(())
//! ```
//!
//! # Features
//!
//! - **Strategy selection**: exact locality matching for short queries, street search for
//!   anything with a street type, alternate spellings for compound-word languages
//! - **Fuzzy escalation**: a weak strict pass is retried with edit-distance tolerance and
//!   flagged with [`FUZZY_ACTIVE`]
//! - **House numbers**: exact lookups and linear interpolation along straight streets
//! - **Pluggable services**: parser, country detector, decompounder, street-type detector,
//!   label formatter and usage counter are all traits
//! - **Batch processing**: independent queries resolved in parallel
//!
//! The `locus-index` crate provides a Tantivy-backed [`SearchBackend`].
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod assemble;
pub mod collaborators;
mod config;
mod core;
pub mod error;
pub mod housenumber;
mod model;
mod search;
pub mod text;

pub use self::core::{Geocoder, GeocoderBuilder, USAGE_FREE_TEXT, USAGE_STRUCTURED};

pub use collaborators::{
    AddressParser, BasicCountryDetector, BasicLabelFormatter, BasicStreetTypeDetector, CountryDetector,
    Decompounder, GermanicDecompounder, LabelFormatter, StreetTypeDetector, UsageCounter,
};
pub use config::{GeocoderConfig, GeocoderConfigBuilder};
pub use housenumber::{HouseNumberMatch, interpolate};
pub use model::{
    Address, AddressQuery, CandidateRecord, FUZZY_ACTIVE, GeocodingLevel, HouseNumber, PlaceType, Proximity,
    Query, ResultSet, StructuredQuery,
};
pub use search::{BackendError, FulltextQuery, FulltextResults, MemoryBackend, SearchBackend};
pub use text::ExactMatchCarveOut;

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the Locus library.
///
/// Sets up a `tracing` subscriber that honours `RUST_LOG` and otherwise logs at `level`.
/// Span close events carry timings for each search pass. Safe to call more than once.
///
/// ```rust
/// use locus::init_logging;
/// use tracing::Level;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), locus::error::GeocodingError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::GeocodingError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("tantivy=warn".parse()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .init();
        Ok(())
    })
}
