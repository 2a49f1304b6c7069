use itertools::Itertools;

use crate::model::Address;

/// Produces display strings for resolved addresses.
pub trait LabelFormatter: Send + Sync {
    /// A one-line label from the most to the least specific component.
    fn full_label(&self, address: &Address) -> String;

    /// The postal envelope: street line, locality line and state, without the country.
    /// Structured queries search with this string.
    fn postal_envelope(&self, address: &Address) -> String;

    /// The zip code to report from a list of candidates.
    fn best_zip(&self, zip_codes: &[String]) -> Option<String>;
}

/// Comma-joined labels in the "street, locality, state, country" order.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicLabelFormatter;

fn non_empty(field: Option<&String>) -> Option<&str> {
    field.map(|value| value.trim()).filter(|value| !value.is_empty())
}

fn street_line(address: &Address) -> Option<String> {
    let street = non_empty(address.street_name.as_ref())?;
    Some(match non_empty(address.house_number.as_ref()) {
        Some(number) => format!("{number} {street}"),
        None => street.to_string(),
    })
}

fn locality_line(address: &Address) -> Option<String> {
    let city = non_empty(address.city.as_ref()).or_else(|| non_empty(address.post_town.as_ref()));
    match (non_empty(address.zip_code.as_ref()), city) {
        (Some(zip), Some(city)) => Some(format!("{zip} {city}")),
        (zip, city) => zip.or(city).map(ToString::to_string),
    }
}

fn subdivision(address: &Address) -> Option<&str> {
    non_empty(address.quarter.as_ref())
        .or_else(|| non_empty(address.city_subdivision.as_ref()))
        .or_else(|| non_empty(address.dependent_locality.as_ref()))
}

impl LabelFormatter for BasicLabelFormatter {
    fn full_label(&self, address: &Address) -> String {
        let named_place = non_empty(address.name.as_ref()).filter(|name| {
            ![&address.city, &address.quarter, &address.state, &address.country]
                .into_iter()
                .any(|field| non_empty(field.as_ref()) == Some(*name))
        });
        let country =
            non_empty(address.country.as_ref()).or_else(|| non_empty(address.country_code.as_ref()));

        [
            street_line(address).or_else(|| named_place.map(ToString::to_string)),
            subdivision(address).map(ToString::to_string),
            locality_line(address),
            non_empty(address.state.as_ref()).map(ToString::to_string),
            country.map(ToString::to_string),
        ]
        .into_iter()
        .flatten()
        .dedup()
        .join(", ")
    }

    fn postal_envelope(&self, address: &Address) -> String {
        [
            street_line(address),
            subdivision(address).map(ToString::to_string),
            locality_line(address),
            non_empty(address.state.as_ref()).map(ToString::to_string),
        ]
        .into_iter()
        .flatten()
        .dedup()
        .join(", ")
    }

    fn best_zip(&self, zip_codes: &[String]) -> Option<String> {
        let zips = || zip_codes.iter().map(|zip| zip.trim()).filter(|zip| !zip.is_empty());
        zips()
            .find(|zip| !zip.contains([';', ',', '-']) || zip.chars().any(char::is_alphabetic))
            .or_else(|| zips().next())
            .map(ToString::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_label_for_house_address() {
        let mut address = Address::new()
            .with_house_number("10")
            .with_street("Main St")
            .with_zip_code("62701")
            .with_city("Springfield")
            .with_state("Illinois");
        address.country_code = Some("US".into());
        assert_eq!(
            BasicLabelFormatter.full_label(&address),
            "10 Main St, 62701 Springfield, Illinois, US"
        );

        address.country = Some("United States".into());
        assert_eq!(
            BasicLabelFormatter.full_label(&address),
            "10 Main St, 62701 Springfield, Illinois, United States"
        );
    }

    #[test]
    fn test_full_label_skips_name_repeating_a_locality() {
        let mut city = Address::new().with_city("Springfield");
        city.name = Some("Springfield".into());
        city.country_code = Some("US".into());
        assert_eq!(BasicLabelFormatter.full_label(&city), "Springfield, US");

        let mut poi = Address::new().with_city("Paris");
        poi.name = Some("Louvre".into());
        assert_eq!(BasicLabelFormatter.full_label(&poi), "Louvre, Paris");
    }

    #[test]
    fn test_postal_envelope_leaves_out_country() {
        let mut address = Address::new()
            .with_street("Rue de Rivoli")
            .with_zip_code("75001")
            .with_city("Paris");
        address.country = Some("France".into());
        assert_eq!(
            BasicLabelFormatter.postal_envelope(&address),
            "Rue de Rivoli, 75001 Paris"
        );

        let mut town = Address::new();
        town.post_town = Some("Bath".into());
        town.city_subdivision = Some("Widcombe".into());
        assert_eq!(BasicLabelFormatter.postal_envelope(&town), "Widcombe, Bath");
        assert_eq!(BasicLabelFormatter.postal_envelope(&Address::new()), "");
    }

    #[test]
    fn test_best_zip() {
        let formatter = BasicLabelFormatter;
        assert_eq!(formatter.best_zip(&[]), None);
        assert_eq!(formatter.best_zip(&[" ".into()]), None);
        assert_eq!(
            formatter.best_zip(&["75001-75004".into(), "75002".into()]).as_deref(),
            Some("75002")
        );
        assert_eq!(
            formatter.best_zip(&["75001-75004".into()]).as_deref(),
            Some("75001-75004")
        );
        assert_eq!(formatter.best_zip(&["SW1A 2AA".into()]).as_deref(), Some("SW1A 2AA"));
    }
}
