// src/tests/router_tests/listings_tests.rs
use crate::router::handle;
use crate::tests::utils::{body_json, engine_with, get, post_json, OfflinePages, SCENARIO_CSV};

#[test]
fn debug_route_summarises_dataset() -> Result<(), Box<dyn std::error::Error>> {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(OfflinePages));

    let resp = handle(
        post_json(
            "/api/listings/debug",
            r#"{"building_name": "Palm  Views EAST", "unit_type": "2 bedroom"}"#,
        ),
        &engine,
    )?;
    assert_eq!(resp.status(), 200);

    let json = body_json(resp);
    assert_eq!(json["total_rows_loaded"], 9);
    assert_eq!(json["unique_pairs_count"], 5);
    assert_eq!(json["first_5_pairs"].as_array().unwrap().len(), 5);
    assert_eq!(json["first_5_pairs"][0]["building"], "seven palm jumeirah");
    assert_eq!(json["first_5_pairs"][0]["unit_type"], "1BR");
    assert_eq!(json["first_5_pairs"][0]["count"], 3);
    assert_eq!(json["query"]["canonical"]["building"], "palm views east");
    assert_eq!(json["query"]["canonical"]["unit"], "2BR");
    assert_eq!(json["query_sample"].as_array().unwrap().len(), 2);
    assert_eq!(
        json["csv_path"].as_str(),
        Some(path.display().to_string().as_str())
    );

    std::fs::remove_file(path).ok();
    Ok(())
}

#[test]
fn debug_route_without_body_skips_sample() -> Result<(), Box<dyn std::error::Error>> {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(OfflinePages));

    let json = body_json(handle(post_json("/api/listings/debug", ""), &engine)?);
    assert_eq!(json["total_rows_loaded"], 9);
    assert!(json["query"]["building"].is_null());
    assert!(json["query_sample"].as_array().unwrap().is_empty());

    std::fs::remove_file(path).ok();
    Ok(())
}

#[test]
fn lookup_attaches_debug_only_when_asked() -> Result<(), Box<dyn std::error::Error>> {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(OfflinePages));

    let plain = body_json(handle(
        get("/api/listings/lookup?building=Palm+Tower&unit=Studio"),
        &engine,
    )?);
    assert_eq!(plain["count"], 2);
    assert!(plain.get("_debug").is_none());

    let debugged = body_json(handle(
        get("/api/listings/lookup?building=Palm+Tower&unit=Studio&debug=yes"),
        &engine,
    )?);
    assert_eq!(debugged["count"], 2);
    assert_eq!(debugged["_debug"]["total_rows_loaded"], 9);
    assert_eq!(debugged["_debug"]["query"]["canonical"]["building"], "palm tower");

    let posted = body_json(handle(
        post_json(
            "/api/listings/lookup",
            r#"{"building_name": "Palm Tower", "unit_type": "Studio", "debug": true}"#,
        ),
        &engine,
    )?);
    assert_eq!(posted["_debug"]["query_sample"].as_array().unwrap().len(), 2);

    std::fs::remove_file(path).ok();
    Ok(())
}
