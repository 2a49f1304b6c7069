//! A small hand-made gazetteer covering the United States, Germany, France, the United
//! Kingdom and Slovakia. Used by tests, doc examples and demos.

use locus::{CandidateRecord, PlaceType};

use crate::{backend::TantivyBackend, error::Result};

fn country(name: &str, code: &str, latitude: f64, longitude: f64, alternate: &[&str]) -> CandidateRecord {
    alternate.iter().fold(
        CandidateRecord::new(PlaceType::Country, name, latitude, longitude).with_country_code(code),
        |record, alt| record.with_alternate_name(*alt),
    )
}

fn united_states() -> Vec<CandidateRecord> {
    vec![
        country("United States", "US", 39.83, -98.58, &["USA", "United States of America"]).with_feature_id(6252001),
        CandidateRecord::new(PlaceType::Adm, "Illinois", 40.0, -89.25)
            .with_country_code("US")
            .with_feature_id(4896861),
        CandidateRecord::new(PlaceType::City, "Springfield", 39.80, -89.64)
            .with_country_code("US")
            .with_adm_names(Some("Illinois"), Some("Sangamon County"))
            .with_is_in_zip("62701")
            .with_feature_id(4250542),
        CandidateRecord::new(PlaceType::City, "Springfield", 37.21, -93.29)
            .with_country_code("US")
            .with_adm_names(Some("Missouri"), Some("Greene County"))
            .with_is_in_zip("65806")
            .with_feature_id(4409896),
        // Two segments of the same street, numbered 2-10 and 12-20.
        CandidateRecord::new(PlaceType::Street, "Main St", 39.7990, -89.6500)
            .with_country_code("US")
            .with_is_in("Springfield")
            .with_is_in_adm("Illinois")
            .with_is_in_zip("62701")
            .with_house_number("2", 39.7980, -89.6500)
            .with_house_number("10", 39.7998, -89.6500)
            .with_azimuths(0.0, 3.0)
            .with_feature_id(1001),
        CandidateRecord::new(PlaceType::Street, "Main St", 39.8010, -89.6500)
            .with_country_code("US")
            .with_is_in("Springfield")
            .with_is_in_adm("Illinois")
            .with_is_in_zip("62701")
            .with_house_number("12", 39.8002, -89.6500)
            .with_house_number("20", 39.8020, -89.6500)
            .with_azimuths(2.0, 4.0)
            .with_feature_id(1002),
        CandidateRecord::new(PlaceType::Street, "Oak Avenue", 39.7900, -89.6400)
            .with_country_code("US")
            .with_is_in("Springfield")
            .with_is_in_adm("Illinois")
            .with_house_number("100", 39.7900, -89.6450)
            .with_house_number("200", 39.7900, -89.6350)
            .with_azimuths(90.0, 160.0)
            .with_feature_id(1003),
    ]
}

fn germany() -> Vec<CandidateRecord> {
    vec![
        country("Germany", "DE", 51.17, 10.45, &["Deutschland"]).with_feature_id(2921044),
        CandidateRecord::new(PlaceType::City, "Berlin", 52.52, 13.40)
            .with_country_code("DE")
            .with_adm_names(Some("Berlin"), None)
            .with_feature_id(2950159),
        CandidateRecord::new(PlaceType::CitySubdivision, "Mitte", 52.52, 13.40)
            .with_country_code("DE")
            .with_is_in("Berlin")
            .with_is_in_zip("10115")
            .with_adm_names(Some("Berlin"), None)
            .with_feature_id(2870912),
        CandidateRecord::new(PlaceType::Street, "Hauptstraße", 52.4840, 13.3530)
            .with_country_code("DE")
            .with_is_in("Berlin")
            .with_is_in_adm("Berlin")
            .with_is_in_zip("10827")
            .with_house_number("1", 52.4830, 13.3530)
            .with_house_number("5", 52.4840, 13.3530)
            .with_house_number("9", 52.4850, 13.3530)
            .with_azimuths(5.0, 8.0)
            .with_feature_id(2001),
        CandidateRecord::new(PlaceType::Street, "Unter den Linden", 52.5170, 13.3889)
            .with_country_code("DE")
            .with_is_in("Berlin")
            .with_is_in_adm("Berlin")
            .with_feature_id(2002),
    ]
}

fn france() -> Vec<CandidateRecord> {
    vec![
        country("France", "FR", 46.23, 2.21, &[]).with_feature_id(3017382),
        CandidateRecord::new(PlaceType::City, "Paris", 48.8566, 2.3522)
            .with_country_code("FR")
            .with_adm_names(Some("Île-de-France"), Some("Paris"))
            .with_feature_id(2988507),
        CandidateRecord::new(PlaceType::Street, "Rue de Rivoli", 48.8606, 2.3376)
            .with_country_code("FR")
            .with_is_in("Paris")
            .with_is_in_zip("75001")
            .with_adm_names(Some("Île-de-France"), Some("Paris"))
            .with_house_number("1", 48.8640, 2.3290)
            .with_house_number("99", 48.8606, 2.3376)
            .with_azimuths(110.0, 115.0)
            .with_feature_id(3001),
    ]
}

fn united_kingdom() -> Vec<CandidateRecord> {
    vec![
        country("United Kingdom", "GB", 54.0, -2.0, &["Great Britain"]).with_feature_id(2635167),
        CandidateRecord::new(PlaceType::City, "London", 51.5074, -0.1278)
            .with_country_code("GB")
            .with_adm_names(Some("England"), None)
            .with_feature_id(2643743),
        CandidateRecord::new(PlaceType::CitySubdivision, "Westminster", 51.4975, -0.1357)
            .with_country_code("GB")
            .with_is_in("London")
            .with_is_in_zip("SW1A 2AA")
            .with_adm_names(Some("England"), None)
            .with_feature_id(2634341),
        CandidateRecord::new(PlaceType::Street, "Downing Street", 51.5033, -0.1276)
            .with_country_code("GB")
            .with_is_in("London")
            .with_is_in_place("Westminster")
            .with_is_in_zip("SW1A 2AA")
            .with_house_number("10", 51.5034, -0.1276)
            .with_feature_id(4001),
    ]
}

fn slovakia() -> Vec<CandidateRecord> {
    vec![
        country("Slovakia", "SK", 48.67, 19.70, &["Slovensko"]).with_feature_id(3057568),
        CandidateRecord::new(PlaceType::City, "Bratislava", 48.1486, 17.1077)
            .with_country_code("SK")
            .with_adm_names(Some("Bratislavský kraj"), None)
            .with_feature_id(3060972),
        CandidateRecord::new(PlaceType::Street, "Mostová", 48.1422, 17.1080)
            .with_country_code("SK")
            .with_is_in("Bratislava")
            .with_house_number("1234/3", 48.1420, 17.1080)
            .with_house_number("1240/7", 48.1424, 17.1080)
            .with_azimuths(10.0, 12.0)
            .with_feature_id(5001),
    ]
}

/// Every sample record.
#[must_use]
pub fn sample_gazetteer() -> Vec<CandidateRecord> {
    [united_states(), germany(), france(), united_kingdom(), slovakia()]
        .into_iter()
        .flatten()
        .collect()
}

/// An in-memory [`TantivyBackend`] over [`sample_gazetteer`].
pub fn sample_backend() -> Result<TantivyBackend> {
    TantivyBackend::from_records(sample_gazetteer())
}
