use std::time::Duration;

use super::Address;

/// Advisory message attached when the edit-distance tolerant search produced the results.
pub const FUZZY_ACTIVE: &str = "fuzzy:active";

/// The outcome of one resolution request.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub addresses: Vec<Address>,
    pub num_found: usize,
    pub elapsed: Duration,
    pub message: Option<String>,
    /// Parser output, only exposed when the query carried the configured unlock key
    pub parsed_address: Option<Address>,
}

impl ResultSet {
    pub fn new(addresses: Vec<Address>) -> Self {
        let num_found = addresses.len();
        Self {
            addresses,
            num_found,
            ..Default::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    #[must_use]
    pub fn first(&self) -> Option<&Address> {
        self.addresses.first()
    }

    #[must_use]
    pub fn is_fuzzy(&self) -> bool {
        self.message.as_deref() == Some(FUZZY_ACTIVE)
    }

    pub(crate) fn mark_fuzzy(&mut self) {
        self.message = Some(FUZZY_ACTIVE.to_string());
    }

    /// Keep at most `limit` addresses; `num_found` follows the kept count.
    pub(crate) fn truncate(&mut self, limit: usize) {
        self.addresses.truncate(limit);
        self.num_found = self.addresses.len();
    }
}
