// src/tests/router_tests/economics_tests.rs
use crate::errors::ServerError;
use crate::responses::error_to_response;
use crate::router::handle;
use crate::tests::utils::{
    body_json, engine_with, engine_with_config, expect_err, get, post_json, test_config, OfflinePages,
    SCENARIO_CSV,
};

#[test]
fn get_lookup_reads_query_string() -> Result<(), Box<dyn std::error::Error>> {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(OfflinePages));

    let resp = handle(
        get("/api/economics/lookup?building_name=Seven%20Palm%20Jumeirah&unit_type=1BR"),
        &engine,
    )?;
    assert_eq!(resp.status(), 200);

    let json = body_json(resp);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["metrics"]["sample_n"], 3);
    assert_eq!(json["metrics"]["truth_count"], 1);
    assert_eq!(json["metrics"]["scaled_count"], 2);

    std::fs::remove_file(path).ok();
    Ok(())
}

#[test]
fn post_lookup_reads_json_body() -> Result<(), Box<dyn std::error::Error>> {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(OfflinePages));

    let resp = handle(
        post_json(
            "/api/economics/lookup",
            r#"{"building_name": "Seven Palm Jumeirah", "unit_type": "2BR"}"#,
        ),
        &engine,
    )?;
    assert_eq!(resp.status(), 200);

    let json = body_json(resp);
    assert_eq!(json["status"], "no_data");
    assert_eq!(json["reason_code"], "INSUFFICIENT_SAMPLE");

    std::fs::remove_file(path).ok();
    Ok(())
}

#[test]
fn malformed_json_is_a_bad_request() {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(OfflinePages));

    let err = expect_err(handle(
        post_json("/api/economics/lookup", "{not json"),
        &engine,
    ));
    assert!(matches!(err, ServerError::BadRequest(_)));

    let resp = error_to_response(err);
    assert_eq!(resp.status(), 400);
    let json = body_json(resp);
    assert_eq!(json["error"], "bad_request");
    assert!(json["message"].as_str().unwrap().contains("invalid JSON"));

    std::fs::remove_file(path).ok();
}

#[test]
fn listings_lookup_honours_limit() -> Result<(), Box<dyn std::error::Error>> {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(OfflinePages));

    let resp = handle(
        get("/api/listings/lookup?building=Seven+Palm+Jumeirah&unit=1BR&limit=2"),
        &engine,
    )?;
    let json = body_json(resp);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["count"], 3);
    assert_eq!(json["items"].as_array().unwrap().len(), 2);
    assert!(json["items"][0]["airdna_overview_url"]
        .as_str()
        .unwrap()
        .ends_with("abnb_1"));

    let err = expect_err(handle(
        get("/api/listings/lookup?building=X&unit=1BR&limit=many"),
        &engine,
    ));
    assert_eq!(err.status(), 400);

    std::fs::remove_file(path).ok();
    Ok(())
}

#[test]
fn sources_lists_qualifying_comps() -> Result<(), Box<dyn std::error::Error>> {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(OfflinePages));

    let resp = handle(
        get("/api/economics/sources?building_name=Palm%20Tower&unit_type=Studio"),
        &engine,
    )?;
    let json = body_json(resp);
    assert_eq!(json["count"], 2);
    assert_eq!(json["min_days"], 270);

    std::fs::remove_file(path).ok();
    Ok(())
}

#[test]
fn enrich_returns_items_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(OfflinePages));

    let body = r#"{"items": [
        {"building_name": "Palm Tower", "unit_type": "Studio"},
        {"building_name": "Nowhere Towers", "unit_type": "1BR"}
    ]}"#;
    let resp = handle(post_json("/api/enrich", body), &engine)?;
    let json = body_json(resp);

    assert_eq!(json["count"], 2);
    assert_eq!(json["items"][0]["economics"]["status"], "ok");
    assert_eq!(
        json["items"][1]["economics"]["reason_code"],
        "BUILDING_NOT_FOUND"
    );

    std::fs::remove_file(path).ok();
    Ok(())
}

#[test]
fn oversized_enrich_batch_is_rejected() {
    let config = crate::config::EngineConfig {
        enrich_max_items: 1,
        ..test_config()
    };
    let (engine, path) = engine_with_config(SCENARIO_CSV, Box::new(OfflinePages), config);

    let body = r#"{"items": [
        {"building_name": "Palm Tower", "unit_type": "Studio"},
        {"building_name": "Palm Tower", "unit_type": "Studio"}
    ]}"#;
    let err = expect_err(handle(post_json("/api/enrich", body), &engine));
    assert!(matches!(
        err,
        ServerError::PayloadTooLarge { count: 2, max: 1 }
    ));
    assert_eq!(error_to_response(err).status(), 413);

    std::fs::remove_file(path).ok();
}

#[test]
fn oversized_body_is_rejected_not_truncated() {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(OfflinePages));

    let padding = " ".repeat(2 * 1024 * 1024);
    let body = format!(r#"{{"building_name": "Palm Tower", "unit_type": "Studio"}}{padding}"#);
    let err = expect_err(handle(post_json("/api/economics/lookup", &body), &engine));
    assert!(matches!(err, ServerError::BodyTooLarge { .. }));

    let resp = error_to_response(err);
    assert_eq!(resp.status(), 413);
    assert_eq!(body_json(resp)["error"], "payload_too_large");

    std::fs::remove_file(path).ok();
}
