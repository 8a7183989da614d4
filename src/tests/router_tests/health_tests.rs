// src/tests/router_tests/health_tests.rs
use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{
    body_json, engine_with, expect_err, get, post_json, OfflinePages, SCENARIO_CSV,
};

#[test]
fn health_reports_dataset_counts() -> Result<(), Box<dyn std::error::Error>> {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(OfflinePages));

    let resp = handle(get("/api/health"), &engine)?;
    assert_eq!(resp.status(), 200);

    let json = body_json(resp);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["rows"], 9);
    assert_eq!(json["buildings"], 3);
    assert_eq!(json["reference_date"], "2025-09-22");
    assert!(json.get("reason_code").is_none());

    std::fs::remove_file(path).ok();
    Ok(())
}

#[test]
fn empty_dataset_is_unhealthy() -> Result<(), Box<dyn std::error::Error>> {
    let (engine, path) = engine_with("airbnb_id,building,unit_type\n", Box::new(OfflinePages));

    let resp = handle(get("/api/health"), &engine)?;
    assert_eq!(resp.status(), 503);
    assert_eq!(body_json(resp)["reason_code"], "NOT_FOUND");

    std::fs::remove_file(path).ok();
    Ok(())
}

#[test]
fn unknown_routes_and_methods_are_not_found() {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(OfflinePages));

    let err = expect_err(handle(get("/nope"), &engine));
    assert!(matches!(err, ServerError::NotFound));

    let err = expect_err(handle(post_json("/api/health", "{}"), &engine));
    assert_eq!(err.status(), 404);

    std::fs::remove_file(path).ok();
}
