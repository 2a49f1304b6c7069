use std::{fs::File, sync::Arc};

use locus::{
    Address, AddressQuery, Geocoder, GeocoderConfig, GeocodingLevel, Query, ResultSet, SearchBackend, StructuredQuery,
};
use locus_index::{
    TantivyBackend, load_gazetteer, sample_backend, sample_gazetteer, write_gazetteer,
};
use tempfile::TempDir;

/// BM25 scores are not on the scale of the default fuzzy threshold, so only empty strict
/// passes escalate here.
fn geocoder_with(backend: impl SearchBackend + 'static) -> Geocoder {
    Geocoder::builder(Arc::new(backend))
        .config(GeocoderConfig::builder().fuzzy_score_threshold(0.0).build().unwrap())
        .build()
        .unwrap()
}

fn geocoder() -> Geocoder {
    geocoder_with(sample_backend().unwrap())
}

fn resolve(geocoder: &Geocoder, query: AddressQuery) -> ResultSet {
    geocoder.resolve(&query.into()).unwrap()
}

#[test]
fn test_gazetteer_file_to_index_on_disk() {
    let dir = TempDir::new().unwrap();
    let gazetteer_path = dir.path().join("gazetteer.jsonl");
    let index_path = dir.path().join("index");

    let records = sample_gazetteer();
    write_gazetteer(File::create(&gazetteer_path).unwrap(), &records).unwrap();
    let loaded = load_gazetteer(&gazetteer_path).unwrap();
    assert_eq!(loaded, records);

    {
        let backend = TantivyBackend::open_or_create_in_dir(&index_path, false).unwrap();
        assert_eq!(backend.num_docs(), 0);
        backend.index_records(loaded).unwrap();
    }

    let reopened = TantivyBackend::open_or_create_in_dir(&index_path, false).unwrap();
    assert_eq!(reopened.num_docs(), records.len() as u64);
    let results = resolve(&geocoder_with(reopened), AddressQuery::new("Berlin"));
    assert_eq!(results.first().and_then(|a| a.city.as_deref()), Some("Berlin"));

    let overwritten = TantivyBackend::open_or_create_in_dir(&index_path, true).unwrap();
    assert_eq!(overwritten.num_docs(), 0);
}

#[test]
fn test_adjacent_segments_collapse_to_one_street() {
    let results = resolve(&geocoder(), AddressQuery::new("10 Main St, Springfield, US"));

    let main_streets: Vec<&Address> = results
        .addresses
        .iter()
        .filter(|a| a.street_name.as_deref() == Some("Main St"))
        .collect();
    assert_eq!(main_streets.len(), 1);

    let address = main_streets[0];
    assert_eq!(address.house_number.as_deref(), Some("10"));
    assert!(!address.house_number_interpolated);
    assert_eq!(address.latitude, Some(39.7998));
    assert_eq!(address.city.as_deref(), Some("Springfield"));
    assert_eq!(address.state.as_deref(), Some("Illinois"));
    assert_eq!(address.zip_code.as_deref(), Some("62701"));
    assert_eq!(address.geocoding_level, GeocodingLevel::HouseNumber);
    assert_eq!(results.addresses[0].street_name.as_deref(), Some("Main St"));
}

#[test]
fn test_curved_street_is_not_interpolated() {
    let results = resolve(&geocoder(), AddressQuery::new("150 Oak Avenue, Springfield"));
    let address = results.first().unwrap();
    assert_eq!(address.street_name.as_deref(), Some("Oak Avenue"));
    assert_eq!(address.house_number, None);
    assert_eq!(address.geocoding_level, GeocodingLevel::Street);
}

#[test]
fn test_french_street_interpolation_and_state() {
    let results = resolve(&geocoder(), AddressQuery::new("50 Rue de Rivoli, Paris, France"));
    let address = results.first().unwrap();
    assert_eq!(address.street_name.as_deref(), Some("Rue de Rivoli"));
    assert!(address.house_number_interpolated);
    let latitude = address.latitude.unwrap();
    assert!(latitude > 48.8606 && latitude < 48.8640);
    assert_eq!(address.state.as_deref(), Some("Paris"));
    assert_eq!(address.country_code.as_deref(), Some("FR"));
    assert_eq!(address.street_type.as_deref(), Some("rue"));
}

#[test]
fn test_slovak_orientation_number() {
    let results = resolve(
        &geocoder(),
        AddressQuery::new("Mostová 1236/5, Bratislava").with_country_code("SK"),
    );
    let address = results.first().unwrap();
    assert_eq!(address.house_number.as_deref(), Some("1236/5"));
    assert!(address.house_number_interpolated);
}

#[test]
fn test_country_name() {
    let results = resolve(&geocoder(), AddressQuery::new("Deutschland"));
    assert_eq!(results.len(), 1);
    assert_eq!(results.addresses[0].country.as_deref(), Some("Germany"));
    assert_eq!(results.addresses[0].id, Some(2921044));
}

#[test]
fn test_uk_postcode_finds_locality_and_street() {
    let results = resolve(&geocoder(), AddressQuery::new("SW1A 2AA"));
    assert_eq!(results.addresses[0].quarter.as_deref(), Some("Westminster"));
    assert!(
        results
            .addresses
            .iter()
            .any(|a| a.street_name.as_deref() == Some("Downing Street"))
    );

    // No locality is named like the postcode, so every exact hit survives either way.
    let no_carve_out = Geocoder::builder(Arc::new(sample_backend().unwrap()))
        .config(GeocoderConfig::builder().fuzzy_score_threshold(0.0).build().unwrap())
        .without_carve_outs()
        .build()
        .unwrap();
    let results = resolve(&no_carve_out, AddressQuery::new("SW1A 2AA"));
    assert_eq!(results.addresses[0].quarter.as_deref(), Some("Westminster"));
}

#[test]
fn test_proximity_narrows_localities() {
    let results = resolve(&geocoder(), AddressQuery::new("Springfield").near(37.2, -93.3, 25.0));
    assert_eq!(results.len(), 1);
    assert_eq!(results.addresses[0].state.as_deref(), Some("Missouri"));

    let everywhere = resolve(&geocoder(), AddressQuery::new("Springfield").with_country_code("US"));
    assert_eq!(everywhere.len(), 2);
}

#[test]
fn test_misspelling_escalates_to_fuzzy() {
    let results = resolve(&geocoder(), AddressQuery::new("Bratislva"));
    assert!(results.is_fuzzy());
    assert_eq!(results.first().and_then(|a| a.city.as_deref()), Some("Bratislava"));

    let strict = resolve(&geocoder(), AddressQuery::new("Bratislva").fuzzy(false));
    assert!(strict.is_empty());
}

#[test]
fn test_structured_city_in_france() {
    let query = StructuredQuery::new(Address::new().with_city("Paris")).with_country_code("FR");
    let results = geocoder().resolve(&query.into()).unwrap();
    let paris = results.first().unwrap();
    assert_eq!(paris.city.as_deref(), Some("Paris"));
    assert_eq!(paris.state.as_deref(), Some("Paris"));
    assert_eq!(paris.geocoding_level, GeocodingLevel::City);
}

#[test]
fn test_batch_over_index() {
    let queries: Vec<Query> = ["Berlin", "Hauptstraße 9, Berlin", "Paris"]
        .into_iter()
        .map(Query::from)
        .collect();
    let results = geocoder().resolve_batch(&queries);
    assert!(results.iter().all(Result::is_ok));
    let street = results[1].as_ref().unwrap().first().unwrap();
    assert_eq!(street.house_number.as_deref(), Some("9"));
    assert_eq!(street.latitude, Some(52.4850));
}
