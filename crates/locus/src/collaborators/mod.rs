//! Services the resolver consumes through traits, with small default implementations.
//!
//! Every collaborator is shared as `Arc<dyn Trait>` between concurrent requests and must
//! therefore be `Send + Sync`. Swap any of them through
//! [`GeocoderBuilder`](crate::GeocoderBuilder).

mod country;
mod decompound;
mod format;
mod parser;
mod street_type;
mod usage;

pub use country::{BasicCountryDetector, CountryDetection, CountryDetector};
pub use decompound::{Decompounder, GermanicDecompounder};
pub use format::{BasicLabelFormatter, LabelFormatter};
pub use parser::{AddressParser, ParserError};
pub use street_type::{BasicStreetTypeDetector, StreetTypeDetector};
pub use usage::{InMemoryUsageCounter, NoopUsageCounter, UsageCounter};
