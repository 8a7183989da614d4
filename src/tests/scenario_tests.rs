// End-to-end behaviour through the engine, one test per documented scenario.
use crate::domain::{ReasonCode, UnitType};
use crate::economics::{EconomicsResult, SelectionReason};
use crate::engine::EnrichItem;
use crate::resolver::OverlapBasis;
use crate::tests::utils::{
    engine_with, engine_with_config, test_config, OfflinePages, StaticPages, SCENARIO_CSV,
    SEVEN_PALM_MAID_PAGE,
};
use crate::dataset::MatchMethod;

#[test]
fn scenario_a_mixed_truth_and_scaled_rows() {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(OfflinePages));

    let result = engine.economics("Seven Palm Jumeirah", "1BR");
    let metrics = result.metrics().expect("ok result");

    assert_eq!(metrics.sample_n, 3);
    assert_eq!(metrics.truth_count, 1);
    assert_eq!(metrics.scaled_count, 2);
    assert_eq!(metrics.min_days_filter, 270);
    assert_eq!(metrics.min_listings_required, 2);
    assert_eq!(metrics.unit_type, UnitType::Bedrooms(1));
    assert!(metrics.adr_p75 >= metrics.adr_p50);
    assert!(metrics.occ_p75 >= metrics.occ_p50);
    assert!(metrics.rev_p75 >= metrics.rev_p50);

    if let EconomicsResult::Ok { listings, .. } = &result {
        let scaled: Vec<_> = listings.iter().filter(|l| !l.is_truth()).collect();
        assert_eq!(scaled.len(), 2);
        assert!(scaled.iter().all(|l| l.projected_rev_365 > l.raw_revenue));
    }

    std::fs::remove_file(path).ok();
}

#[test]
fn scenario_b_single_row_is_insufficient() {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(OfflinePages));

    let result = engine.economics("Seven Palm Jumeirah", "2BR");
    assert_eq!(result.reason_code(), Some(ReasonCode::InsufficientSample));

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["status"], "no_data");
    assert_eq!(json["building_name"], "Seven Palm Jumeirah");

    std::fs::remove_file(path).ok();
}

#[test]
fn scenario_c_partial_building_name_matches_by_overlap() {
    for basis in [OverlapBasis::Query, OverlapBasis::Union] {
        let config = crate::config::EngineConfig {
            overlap_basis: basis,
            ..test_config()
        };
        let (engine, path) = engine_with_config(SCENARIO_CSV, Box::new(OfflinePages), config);

        let result = engine.economics("Seven Palm", "1BR");
        let metrics = result.metrics().expect("ok result");
        assert_eq!(metrics.building, "Seven Palm Jumeirah");
        assert_eq!(metrics.match_method, MatchMethod::Fuzzy);

        std::fs::remove_file(path).ok();
    }
}

#[test]
fn scenario_d_url_guess_without_page() {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(OfflinePages));
    let url = "https://www.bayut.com/property/palm-views/2-bedroom-apartment";

    let resolved = engine.resolve(url);
    assert_eq!(resolved.building_name.as_deref(), Some("Palm Views"));
    assert_eq!(resolved.unit_type, Some(UnitType::Bedrooms(2)));
    assert!((resolved.confidence - 1.0).abs() < 1e-9);

    let analysis = engine.analyze_link(url);
    let selection = analysis.selection.expect("building matched");
    assert_eq!(selection.building_name, "Palm Views East");
    assert_eq!(selection.reason, SelectionReason::ExactMatch);

    let metrics = analysis.economics.metrics().expect("ok result");
    assert_eq!(metrics.sample_n, 2);
    assert_eq!(metrics.truth_count, 1);

    std::fs::remove_file(path).ok();
}

#[test]
fn scenario_e_maid_room_drives_selection() {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(StaticPages(SEVEN_PALM_MAID_PAGE)));
    let url =
        "https://www.propertyfinder.ae/en/plp/rent/apartment-for-rent-dubai-palm-jumeirah-123.html";

    let analysis = engine.analyze_link(url);

    let facts = &analysis.resolver.facts;
    assert_eq!(facts.bedrooms, Some(3));
    assert_eq!(facts.has_maids_room, Some(true));
    assert_eq!(facts.bedrooms_without_maid, Some(2));
    assert_eq!(analysis.resolver.unit_type, Some(UnitType::Bedrooms(3)));

    // No 3BR comps: the maid's room steps the lookup down to 2BR, which has
    // a single qualifying row.
    let selection = analysis.selection.expect("building matched");
    assert_eq!(selection.reason, SelectionReason::MaidRoomFallback);
    assert_eq!(selection.unit_type_chosen, Some(UnitType::Bedrooms(2)));
    assert_eq!(
        analysis.economics.reason_code(),
        Some(ReasonCode::InsufficientSample)
    );

    std::fs::remove_file(path).ok();
}

#[test]
fn analyze_without_unit_uses_most_common() {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(OfflinePages));

    let analysis = engine.analyze_link("https://www.bayut.com/property/palm-tower-sea-view.html");
    let selection = analysis.selection.expect("building matched");
    assert_eq!(selection.reason, SelectionReason::MostCommonUnit);
    assert_eq!(selection.unit_type_chosen, Some(UnitType::Studio));
    assert!(analysis.economics.is_ok());

    std::fs::remove_file(path).ok();
}

#[test]
fn analyze_unidentified_link_is_not_supported() {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(OfflinePages));

    let analysis = engine.analyze_link("https://example.com/listing/99");
    assert!(analysis.selection.is_none());
    assert_eq!(
        analysis.economics.reason_code(),
        Some(ReasonCode::NotSupported)
    );

    std::fs::remove_file(path).ok();
}

#[test]
fn analyze_unknown_building_is_not_found() {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(OfflinePages));

    let analysis =
        engine.analyze_link("https://www.bayut.com/property/shoreline-al-haseer-7-studio.html");
    assert_eq!(
        analysis.resolver.building_name.as_deref(),
        Some("Shoreline Bldg 7")
    );
    assert_eq!(
        analysis.economics.reason_code(),
        Some(ReasonCode::BuildingNotFound)
    );

    std::fs::remove_file(path).ok();
}

#[test]
fn analyze_strict_policy_reports_unavailable_unit() {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(OfflinePages));

    // Palm Tower only has studios and nothing signals a maid's room.
    let analysis = engine.analyze_link("https://www.bayut.com/property/palm-tower-1-bedroom.html");
    let selection = analysis.selection.expect("building matched");
    assert_eq!(selection.unit_type_chosen, None);
    assert_eq!(selection.available_units, vec![UnitType::Studio]);
    assert_eq!(
        analysis.economics.reason_code(),
        Some(ReasonCode::UnitTypeNotAvailable)
    );

    std::fs::remove_file(path).ok();
}

#[test]
fn enrich_keeps_item_order() {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(OfflinePages));
    let items = [
        EnrichItem {
            building_name: "Palm Tower".into(),
            unit_type: "studio".into(),
        },
        EnrichItem {
            building_name: "Palm Tower".into(),
            unit_type: "penthouse".into(),
        },
    ];

    let enriched = engine.enrich(&items).unwrap();
    assert!(enriched[0].economics.is_ok());
    assert_eq!(
        enriched[1].economics.reason_code(),
        Some(ReasonCode::UnitTypeInvalid)
    );

    std::fs::remove_file(path).ok();
}

#[test]
fn enrich_flags_blank_items_by_position() {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(OfflinePages));
    let items = [
        EnrichItem {
            building_name: "Palm Tower".into(),
            unit_type: "Studio".into(),
        },
        EnrichItem {
            building_name: "  ".into(),
            unit_type: "1BR".into(),
        },
        EnrichItem {
            building_name: "Seven Palm Jumeirah".into(),
            unit_type: "1BR".into(),
        },
    ];

    let enriched = engine.enrich(&items).unwrap();
    let indexes: Vec<_> = enriched.iter().map(|item| item.index).collect();
    assert_eq!(indexes, vec![0, 1, 2]);

    assert!(enriched[0].economics.is_ok());
    assert_eq!(
        enriched[1].economics.reason_code(),
        Some(ReasonCode::InvalidInput)
    );
    assert!(enriched[2].economics.is_ok());

    let json = serde_json::to_value(&enriched[1]).unwrap();
    assert_eq!(json["index"], 1);
    assert_eq!(json["economics"]["reason_code"], "INVALID_INPUT");

    std::fs::remove_file(path).ok();
}

#[test]
fn links_and_sources_agree_on_building() {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(OfflinePages));

    let links = engine.links("Palm Views", "2BR", 1);
    assert_eq!(links.building_name, "Palm Views East");
    assert_eq!(links.count, 2);
    assert_eq!(links.items.len(), 1);
    assert_eq!(links.items[0].airbnb_url, "https://www.airbnb.com/rooms/5");

    let sources = engine.sources("Palm Views", "2BR");
    assert_eq!(sources.building_name.as_deref(), Some("Palm Views East"));
    assert_eq!(sources.count, 2);

    let missing = engine.links("Palm Views", "3BR", 6);
    assert_eq!(missing.reason_code, Some(ReasonCode::NotFound));

    std::fs::remove_file(path).ok();
}
