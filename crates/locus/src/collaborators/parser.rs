use crate::model::Address;

pub use error::ParserError;

/// Splits a postal address string into structured components.
///
/// Returns candidate addresses ranked best first. Failures are logged by the resolver,
/// which then falls back to its own heuristics.
pub trait AddressParser: Send + Sync {
    fn parse(&self, text: &str, country_code: Option<&str>) -> Result<Vec<Address>, ParserError>;
}

mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum ParserError {
        #[error("Address parsing failed: {0}")]
        Failed(String),
        #[error(transparent)]
        Other(#[from] anyhow::Error),
    }
}
