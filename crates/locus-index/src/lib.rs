//! Locus Index - embedded gazetteer search for the Locus address resolver
//!
//! [`TantivyBackend`] implements [`locus::SearchBackend`] over a Tantivy full-text index
//! of [`CandidateRecord`](locus::CandidateRecord)s. Records are loaded from JSON-lines
//! gazetteer files or built in code; a small sample gazetteer ships with the crate.
//!
//! ```rust
//! use locus::{AddressQuery, Geocoder};
//! use locus_index::sample_backend;
//!
//! let geocoder = Geocoder::new(sample_backend()?);
//! let results = geocoder.resolve(&AddressQuery::new("Hauptstraße 5, Berlin").into())?;
//! assert_eq!(results.first().and_then(|a| a.house_number.as_deref()), Some("5"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod backend;
pub mod error;
mod gazetteer;
mod sample;
mod schema;

pub use backend::TantivyBackend;
pub use gazetteer::{load_gazetteer, read_gazetteer, write_gazetteer};
pub use sample::{sample_backend, sample_gazetteer};
pub use schema::TOKENIZER;
