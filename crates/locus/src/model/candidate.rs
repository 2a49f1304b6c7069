use std::fmt;

use geo::Point;

/// The kind of place a [`CandidateRecord`] describes.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceType {
    Street,
    City,
    CitySubdivision,
    Adm,
    Country,
}

impl PlaceType {
    /// Streets only.
    pub const STREET: &'static [Self] = &[Self::Street];
    /// Country records only, used when the whole input is a country name.
    pub const ONLY_COUNTRY: &'static [Self] = &[Self::Country];
    /// Localities searched by the free-text exact-match phase.
    pub const LOCALITY_AND_COUNTRY: &'static [Self] =
        &[Self::City, Self::CitySubdivision, Self::Adm, Self::Country];
    /// Default filter for structured addresses without a street.
    pub const CITY_CITYSUB_ADM: &'static [Self] = &[Self::City, Self::CitySubdivision, Self::Adm];
    /// Structured addresses naming a city, zip code or subdivision.
    pub const CITY_AND_CITYSUB: &'static [Self] = &[Self::City, Self::CitySubdivision];
    /// Structured addresses dense enough that only the administrative division is useful.
    pub const ONLY_ADM: &'static [Self] = &[Self::Adm];

    /// Lower-case identifier used by index backends.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Street => "street",
            Self::City => "city",
            Self::CitySubdivision => "citysubdivision",
            Self::Adm => "adm",
            Self::Country => "country",
        }
    }

    /// Parse the identifier produced by [`PlaceType::as_str`], ignoring case.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "street" => Some(Self::Street),
            "city" => Some(Self::City),
            "citysubdivision" => Some(Self::CitySubdivision),
            "adm" => Some(Self::Adm),
            "country" => Some(Self::Country),
            _ => None,
        }
    }
}

impl fmt::Display for PlaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A known house number on a street and where it is.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct HouseNumber {
    /// The number as written in the source data ("12", "12b", "1234/5")
    pub number: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl HouseNumber {
    pub fn new(number: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            number: number.into(),
            latitude,
            longitude,
        }
    }

    /// Location as a `geo` point (x = longitude, y = latitude).
    #[must_use]
    pub fn location(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// A ranked place record returned by a search backend.
///
/// Records are read-only once returned: the assembler copies what it needs into
/// [`Address`](crate::Address) values and never mutates the record.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    pub place_type: PlaceType,
    pub name: String,
    pub alternate_names: Vec<String>,
    /// Relevance score on the backend's native scale
    pub score: f32,
    pub latitude: f64,
    pub longitude: f64,
    /// Administrative centre, preferred over `latitude`/`longitude` when both are set
    pub admin_centre_latitude: Option<f64>,
    pub admin_centre_longitude: Option<f64>,
    pub country_code: Option<String>,
    /// Name of the locality the place belongs to
    pub is_in: Option<String>,
    /// Finer locality (quarter, hamlet) the place belongs to
    pub is_in_place: Option<String>,
    pub is_in_zip: Vec<String>,
    pub is_in_adm: Option<String>,
    pub adm1_name: Option<String>,
    pub adm2_name: Option<String>,
    pub adm3_name: Option<String>,
    pub adm4_name: Option<String>,
    pub adm5_name: Option<String>,
    pub zip_codes: Vec<String>,
    pub house_numbers: Vec<HouseNumber>,
    /// Bearing of the street geometry at its start, in degrees
    pub azimuth_start: Option<f64>,
    /// Bearing of the street geometry at its end, in degrees
    pub azimuth_end: Option<f64>,
    pub fully_qualified_name: Option<String>,
    pub street_ref: Option<String>,
    pub street_type: Option<String>,
    pub openstreetmap_id: Option<i64>,
    pub feature_id: Option<i64>,
}

impl Default for CandidateRecord {
    fn default() -> Self {
        Self {
            place_type: PlaceType::City,
            name: String::new(),
            alternate_names: Vec::new(),
            score: 0.0,
            latitude: 0.0,
            longitude: 0.0,
            admin_centre_latitude: None,
            admin_centre_longitude: None,
            country_code: None,
            is_in: None,
            is_in_place: None,
            is_in_zip: Vec::new(),
            is_in_adm: None,
            adm1_name: None,
            adm2_name: None,
            adm3_name: None,
            adm4_name: None,
            adm5_name: None,
            zip_codes: Vec::new(),
            house_numbers: Vec::new(),
            azimuth_start: None,
            azimuth_end: None,
            fully_qualified_name: None,
            street_ref: None,
            street_type: None,
            openstreetmap_id: None,
            feature_id: None,
        }
    }
}

impl CandidateRecord {
    /// A bare record of the given type, name and position.
    pub fn new(place_type: PlaceType, name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            place_type,
            name: name.into(),
            latitude,
            longitude,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn is_street(&self) -> bool {
        self.place_type == PlaceType::Street
    }

    /// Location of the record's geometry (x = longitude, y = latitude).
    #[must_use]
    pub fn location(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    /// The coordinate reported to callers: the administrative centre when known.
    #[must_use]
    pub fn display_coordinates(&self) -> (f64, f64) {
        match (self.admin_centre_latitude, self.admin_centre_longitude) {
            (Some(lat), Some(lng)) => (lat, lng),
            _ => (self.latitude, self.longitude),
        }
    }

    /// OpenStreetMap id when present, otherwise the gazetteer feature id.
    #[must_use]
    pub fn source_id(&self) -> Option<i64> {
        self.openstreetmap_id.or(self.feature_id)
    }

    /// `is_in` with the optional `is_in_place` appended, as used for street identity.
    #[must_use]
    pub fn qualified_is_in(&self) -> Option<String> {
        let is_in = self.is_in.as_deref()?;
        Some(match self.is_in_place.as_deref() {
            Some(place) => format!("{is_in} {place}"),
            None => is_in.to_string(),
        })
    }

    /// Whether the street geometry is straight enough for linear interpolation.
    #[must_use]
    pub fn is_interpolation_possible(&self, curve_tolerance_degrees: f64) -> bool {
        match (self.azimuth_start, self.azimuth_end) {
            (Some(start), Some(end)) => (start - end).abs() < curve_tolerance_degrees,
            _ => false,
        }
    }

    // Builder-style setters, mostly used by fixtures and tests.

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    pub fn with_country_code(mut self, code: impl Into<String>) -> Self {
        self.country_code = Some(code.into());
        self
    }

    pub fn with_is_in(mut self, is_in: impl Into<String>) -> Self {
        self.is_in = Some(is_in.into());
        self
    }

    pub fn with_is_in_place(mut self, place: impl Into<String>) -> Self {
        self.is_in_place = Some(place.into());
        self
    }

    pub fn with_is_in_zip(mut self, zip: impl Into<String>) -> Self {
        self.is_in_zip.push(zip.into());
        self
    }

    pub fn with_is_in_adm(mut self, adm: impl Into<String>) -> Self {
        self.is_in_adm = Some(adm.into());
        self
    }

    pub fn with_alternate_name(mut self, name: impl Into<String>) -> Self {
        self.alternate_names.push(name.into());
        self
    }

    pub fn with_adm_names(mut self, adm1: Option<&str>, adm2: Option<&str>) -> Self {
        self.adm1_name = adm1.map(ToString::to_string);
        self.adm2_name = adm2.map(ToString::to_string);
        self
    }

    pub fn with_house_number(mut self, number: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        self.house_numbers.push(HouseNumber::new(number, latitude, longitude));
        self
    }

    pub fn with_azimuths(mut self, start: f64, end: f64) -> Self {
        self.azimuth_start = Some(start);
        self.azimuth_end = Some(end);
        self
    }

    pub fn with_feature_id(mut self, id: i64) -> Self {
        self.feature_id = Some(id);
        self
    }

    pub fn with_fully_qualified_name(mut self, name: impl Into<String>) -> Self {
        self.fully_qualified_name = Some(name.into());
        self
    }
}
