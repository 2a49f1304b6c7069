use std::fmt;

/// Completeness tier of a resolved address, from most to least precise.
///
/// The declaration order is the tier order, so `HouseNumber > Street > ... > Undefined`
/// under the derived `Ord`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum GeocodingLevel {
    #[default]
    Undefined,
    Country,
    Adm,
    City,
    CitySubdivision,
    Street,
    HouseNumber,
}

impl fmt::Display for GeocodingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Undefined => "UNDEFINED",
            Self::Country => "COUNTRY",
            Self::Adm => "ADM",
            Self::City => "CITY",
            Self::CitySubdivision => "CITY_SUBDIVISION",
            Self::Street => "STREET",
            Self::HouseNumber => "HOUSE_NUMBER",
        };
        f.write_str(name)
    }
}

/// A postal address, used both as resolver output and as structured query input.
///
/// Output addresses are created empty per candidate, filled by the assembler and
/// finished with [`Address::compute_geocoding_level`]. The fields `post_town`,
/// `city_subdivision`, `house_number_info` and `street_name_intersection` are only
/// meaningful on input (parser output or caller supplied).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub name: Option<String>,
    pub house_number: Option<String>,
    /// The house number's coordinate was interpolated between two known numbers
    pub house_number_interpolated: bool,
    pub house_number_info: Option<String>,
    pub street_name: Option<String>,
    pub street_name_intersection: Option<String>,
    pub street_ref: Option<String>,
    pub street_type: Option<String>,
    pub quarter: Option<String>,
    pub city_subdivision: Option<String>,
    pub dependent_locality: Option<String>,
    pub city: Option<String>,
    pub post_town: Option<String>,
    pub zip_code: Option<String>,
    pub state: Option<String>,
    pub adm1_name: Option<String>,
    pub adm2_name: Option<String>,
    pub adm3_name: Option<String>,
    pub adm4_name: Option<String>,
    pub adm5_name: Option<String>,
    pub country_code: Option<String>,
    pub country: Option<String>,

    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub score: f32,
    pub source_id: Option<i64>,
    pub id: Option<i64>,

    pub geocoding_level: GeocodingLevel,
    pub formatted_full: Option<String>,
    pub formatted_postal: Option<String>,
}

fn is_present(field: Option<&String>) -> bool {
    field.is_some_and(|value| !value.trim().is_empty())
}

impl Address {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the address carries at least one field a search can locate.
    #[must_use]
    pub fn is_geocodable(&self) -> bool {
        [
            self.street_name.as_ref(),
            self.state.as_ref(),
            self.city.as_ref(),
            self.zip_code.as_ref(),
            self.post_town.as_ref(),
            self.city_subdivision.as_ref(),
        ]
        .into_iter()
        .any(is_present)
    }

    #[must_use]
    pub fn has_street_name(&self) -> bool {
        is_present(self.street_name.as_ref())
    }

    #[must_use]
    pub fn has_intersection(&self) -> bool {
        is_present(self.street_name_intersection.as_ref())
    }

    /// Tier implied by the populated fields, without storing it.
    #[must_use]
    pub fn derive_geocoding_level(&self) -> GeocodingLevel {
        if self.has_street_name() {
            if is_present(self.house_number.as_ref()) {
                GeocodingLevel::HouseNumber
            } else {
                GeocodingLevel::Street
            }
        } else if is_present(self.quarter.as_ref())
            || is_present(self.city_subdivision.as_ref())
            || is_present(self.dependent_locality.as_ref())
        {
            GeocodingLevel::CitySubdivision
        } else if is_present(self.city.as_ref()) || is_present(self.post_town.as_ref()) {
            GeocodingLevel::City
        } else if is_present(self.state.as_ref()) {
            GeocodingLevel::Adm
        } else if is_present(self.country.as_ref()) || is_present(self.country_code.as_ref()) {
            GeocodingLevel::Country
        } else {
            GeocodingLevel::Undefined
        }
    }

    pub fn compute_geocoding_level(&mut self) -> GeocodingLevel {
        self.geocoding_level = self.derive_geocoding_level();
        self.geocoding_level
    }

    // Builder-style setters for structured queries.

    pub fn with_house_number(mut self, number: impl Into<String>) -> Self {
        self.house_number = Some(number.into());
        self
    }

    pub fn with_street(mut self, street: impl Into<String>) -> Self {
        self.street_name = Some(street.into());
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_zip_code(mut self, zip: impl Into<String>) -> Self {
        self.zip_code = Some(zip.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_city_subdivision(mut self, subdivision: impl Into<String>) -> Self {
        self.city_subdivision = Some(subdivision.into());
        self
    }

    pub fn with_country_code(mut self, code: impl Into<String>) -> Self {
        self.country_code = Some(code.into());
        self
    }

    pub fn with_intersection(mut self, street: impl Into<String>) -> Self {
        self.street_name_intersection = Some(street.into());
        self
    }
}
