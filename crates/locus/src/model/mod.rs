//! Data types shared by the resolver, its collaborators and search backends.

mod address;
mod candidate;
mod query;
mod results;

pub use address::{Address, GeocodingLevel};
pub use candidate::{CandidateRecord, HouseNumber, PlaceType};
pub use query::{AddressQuery, Proximity, Query, StructuredQuery};
pub use results::{FUZZY_ACTIVE, ResultSet};
