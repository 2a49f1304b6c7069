use super::Address;

/// A point and radius used to restrict street searches geographically.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proximity {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
}

impl Proximity {
    pub fn new(latitude: f64, longitude: f64, radius_km: f64) -> Self {
        Self {
            latitude,
            longitude,
            radius_km,
        }
    }
}

/// A free-text geocoding request.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct AddressQuery {
    pub text: String,
    /// ISO 3166-1 alpha-2 code; must be exactly two ASCII letters when present
    pub country_code: Option<String>,
    /// Allow escalation to an edit-distance tolerant search
    pub fuzzy: bool,
    /// Treat the text as a postal address and always try the parser
    pub postal: bool,
    pub proximity: Option<Proximity>,
    /// Maximum number of addresses returned; the configured default applies when unset
    pub limit: Option<usize>,
    /// Exposes the parser output on the result when it matches the configured key
    pub parse_unlock_key: u64,
}

impl AddressQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            country_code: None,
            fuzzy: true,
            postal: false,
            proximity: None,
            limit: None,
            parse_unlock_key: 0,
        }
    }

    pub fn with_country_code(mut self, code: impl Into<String>) -> Self {
        self.country_code = Some(code.into());
        self
    }

    pub fn fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    pub fn postal(mut self, postal: bool) -> Self {
        self.postal = postal;
        self
    }

    pub fn near(mut self, latitude: f64, longitude: f64, radius_km: f64) -> Self {
        self.proximity = Some(Proximity::new(latitude, longitude, radius_km));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn unlock_key(mut self, key: u64) -> Self {
        self.parse_unlock_key = key;
        self
    }
}

/// A request for an already structured address.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredQuery {
    pub address: Address,
    /// Used when `address.country_code` is unset
    pub country_code: Option<String>,
    pub limit: Option<usize>,
    /// Echoes `address` on the result when it matches the configured key
    pub parse_unlock_key: u64,
}

impl StructuredQuery {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            country_code: None,
            limit: None,
            parse_unlock_key: 0,
        }
    }

    pub fn with_country_code(mut self, code: impl Into<String>) -> Self {
        self.country_code = Some(code.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn unlock_key(mut self, key: u64) -> Self {
        self.parse_unlock_key = key;
        self
    }
}

/// Either kind of request accepted by [`Geocoder::resolve`](crate::Geocoder::resolve).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    FreeText(AddressQuery),
    Structured(StructuredQuery),
}

impl Query {
    pub fn structured(address: Address) -> Self {
        Self::Structured(StructuredQuery::new(address))
    }
}

impl From<StructuredQuery> for Query {
    fn from(query: StructuredQuery) -> Self {
        Self::Structured(query)
    }
}

impl From<AddressQuery> for Query {
    fn from(query: AddressQuery) -> Self {
        Self::FreeText(query)
    }
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        Self::FreeText(AddressQuery::new(text))
    }
}

impl From<Address> for Query {
    fn from(address: Address) -> Self {
        Self::structured(address)
    }
}
