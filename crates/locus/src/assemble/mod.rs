//! Turns ranked candidate records into addresses.
//!
//! Adjacent street candidates that describe the same physical street are collapsed into
//! one address per segment, and the requested house number is resolved against each
//! segment's known numbers. All other candidates become one address each.

mod segment;

use geo::Point;
use tracing::trace;

use self::segment::SegmentReducer;
use crate::{
    collaborators::{LabelFormatter, StreetTypeDetector},
    config::GeocoderConfig,
    housenumber::{HouseNumberMatch, interpolate},
    model::{Address, CandidateRecord, GeocodingLevel, PlaceType, ResultSet},
};

#[derive(Clone, Copy)]
pub(crate) struct AddressAssembler<'a> {
    config: &'a GeocoderConfig,
    formatter: &'a dyn LabelFormatter,
    street_types: &'a dyn StreetTypeDetector,
}

impl<'a> AddressAssembler<'a> {
    pub(crate) fn new(
        config: &'a GeocoderConfig,
        formatter: &'a dyn LabelFormatter,
        street_types: &'a dyn StreetTypeDetector,
    ) -> Self {
        Self {
            config,
            formatter,
            street_types,
        }
    }

    /// One pass over `candidates` in rank order.
    pub(crate) fn build_addresses(
        &self,
        candidates: &[CandidateRecord],
        house_number: Option<&str>,
        country_hint: Option<&str>,
    ) -> ResultSet {
        let addresses = candidates
            .iter()
            .fold(
                SegmentReducer::new(self, house_number, country_hint),
                |mut reducer, candidate| {
                    reducer.step(candidate);
                    reducer
                },
            )
            .finish();
        trace!(candidates = candidates.len(), addresses = addresses.len(), "Assembled addresses");
        ResultSet::new(addresses)
    }

    /// The single address returned when the whole query named a country.
    pub(crate) fn build_country(&self, candidate: &CandidateRecord) -> Address {
        let mut address = self.finish(candidate, self.populate(candidate, None));
        address.country = Some(candidate.name.clone());
        address.name = Some(candidate.name.clone());
        address.geocoding_level = GeocodingLevel::Country;
        address
    }

    /// Address for a street candidate with the house number resolved against its own
    /// numbers. The flag is set when the number was found exactly.
    fn street_address(
        &self,
        candidate: &CandidateRecord,
        house_number: Option<&str>,
        country_hint: Option<&str>,
    ) -> (Address, bool) {
        let mut address = self.populate(candidate, country_hint);
        let mut exact = false;

        if let Some(requested) = house_number.map(str::trim).filter(|n| !n.is_empty()) {
            let allow_interpolation =
                candidate.is_interpolation_possible(self.config.interpolation_curve_tolerance);
            let resolution = interpolate(
                requested,
                &candidate.house_numbers,
                address.country_code.as_deref(),
                allow_interpolation,
            );
            match resolution {
                HouseNumberMatch::Exact { location, .. } => {
                    place_at(&mut address, location);
                    address.house_number = Some(requested.to_string());
                    exact = true;
                }
                HouseNumberMatch::Approximate {
                    interpolated: Some(location),
                    ..
                } => {
                    place_at(&mut address, location);
                    address.house_number = Some(requested.to_string());
                    address.house_number_interpolated = true;
                }
                HouseNumberMatch::Approximate { .. } | HouseNumberMatch::Absent => {}
            }
        }

        (self.finish(candidate, address), exact)
    }

    /// Address for a candidate that does not take part in a street segment.
    fn standalone_address(
        &self,
        candidate: &CandidateRecord,
        house_number: Option<&str>,
        country_hint: Option<&str>,
    ) -> Address {
        if candidate.is_street() {
            self.street_address(candidate, house_number, country_hint).0
        } else {
            self.finish(candidate, self.populate(candidate, country_hint))
        }
    }

    /// Fields shared by every candidate type plus the type-specific locality fields.
    fn populate(&self, candidate: &CandidateRecord, country_hint: Option<&str>) -> Address {
        let (latitude, longitude) = candidate.display_coordinates();
        let country_code = candidate
            .country_code
            .as_deref()
            .or(country_hint)
            .map(str::to_ascii_uppercase);
        let name = Some(candidate.name.clone()).filter(|n| !n.trim().is_empty());

        let mut address = Address {
            score: candidate.score,
            latitude: Some(latitude),
            longitude: Some(longitude),
            source_id: candidate.source_id(),
            id: candidate.feature_id,
            adm1_name: candidate.adm1_name.clone(),
            adm2_name: candidate.adm2_name.clone(),
            adm3_name: candidate.adm3_name.clone(),
            adm4_name: candidate.adm4_name.clone(),
            adm5_name: candidate.adm5_name.clone(),
            state: state_for(candidate, country_code.as_deref()),
            country_code,
            ..Address::default()
        };

        match candidate.place_type {
            PlaceType::Street => {
                address.street_name = name;
                address.street_ref.clone_from(&candidate.street_ref);
                address.city.clone_from(&candidate.is_in);
                address.dependent_locality.clone_from(&candidate.is_in_place);
                address.zip_code = candidate
                    .is_in_zip
                    .first()
                    .cloned()
                    .or_else(|| self.formatter.best_zip(&candidate.zip_codes));
            }
            PlaceType::City => {
                address.city.clone_from(&name);
                address.name = name;
                address.zip_code = self.locality_zip(candidate);
            }
            PlaceType::CitySubdivision => {
                address.quarter.clone_from(&name);
                address.city.clone_from(&candidate.is_in);
                address.name = name;
                address.zip_code = self.locality_zip(candidate);
            }
            PlaceType::Adm => {
                address.name = name;
            }
            PlaceType::Country => {
                address.country.clone_from(&name);
                address.name = name;
            }
        }
        address
    }

    fn locality_zip(&self, candidate: &CandidateRecord) -> Option<String> {
        self.formatter
            .best_zip(&candidate.zip_codes)
            .or_else(|| self.formatter.best_zip(&candidate.is_in_zip))
    }

    /// Level, labels and street type, computed once the address is populated.
    fn finish(&self, candidate: &CandidateRecord, mut address: Address) -> Address {
        address.compute_geocoding_level();

        let index_label = candidate
            .fully_qualified_name
            .as_ref()
            .filter(|label| !label.trim().is_empty());
        let regenerate = candidate.is_street() && address.house_number.is_some();
        address.formatted_full = match index_label {
            Some(label) if !regenerate => Some(label.clone()),
            _ => Some(self.formatter.full_label(&address)),
        };
        address.formatted_postal = Some(self.formatter.postal_envelope(&address));

        address.street_type = candidate.street_type.clone().or_else(|| {
            if candidate.is_street() {
                self.street_types.street_types(&candidate.name).into_iter().next()
            } else {
                None
            }
        });
        address
    }
}

fn place_at(address: &mut Address, location: Point<f64>) {
    address.latitude = Some(location.y());
    address.longitude = Some(location.x());
}

/// The administrative name reported as `state`.
///
/// An Adm record names itself. French records report the département (adm2) rather than
/// the région. Streets then prefer their own `is_in_adm`; everything else falls back to
/// adm1 and then adm2.
fn state_for(candidate: &CandidateRecord, country_code: Option<&str>) -> Option<String> {
    if candidate.place_type == PlaceType::Adm {
        return Some(candidate.name.clone());
    }
    if country_code.is_some_and(|code| code.eq_ignore_ascii_case("FR")) && candidate.adm2_name.is_some() {
        return candidate.adm2_name.clone();
    }
    if candidate.is_street() && candidate.is_in_adm.is_some() {
        return candidate.is_in_adm.clone();
    }
    candidate.adm1_name.clone().or_else(|| candidate.adm2_name.clone())
}
