// src/tests/router_tests/analyze_tests.rs
use crate::router::handle;
use crate::tests::utils::{
    body_json, engine_with, expect_err, get, post_json, OfflinePages, StaticPages, SCENARIO_CSV,
    SEVEN_PALM_MAID_PAGE,
};

#[test]
fn analyze_link_returns_all_three_parts() -> Result<(), Box<dyn std::error::Error>> {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(OfflinePages));

    let resp = handle(
        post_json(
            "/api/analyze/link",
            r#"{"url": "https://www.bayut.com/property/palm-views/2-bedroom-apartment"}"#,
        ),
        &engine,
    )?;
    assert_eq!(resp.status(), 200);

    let json = body_json(resp);
    assert_eq!(json["resolver"]["building_name"], "Palm Views");
    assert_eq!(json["resolver"]["unit_type"], "2BR");
    assert_eq!(json["resolver"]["facts"]["source"], "url_guess");
    assert_eq!(json["selection"]["reason"], "EXACT_MATCH");
    assert_eq!(json["selection"]["unit_type_chosen"], "2BR");
    assert_eq!(json["economics"]["status"], "ok");

    std::fs::remove_file(path).ok();
    Ok(())
}

#[test]
fn analyze_link_by_query_string() -> Result<(), Box<dyn std::error::Error>> {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(StaticPages(SEVEN_PALM_MAID_PAGE)));

    let resp = handle(
        get("/api/analyze/link?url=https%3A%2F%2Fwww.propertyfinder.ae%2Fen%2Fplp%2Frent%2Fseven-palm-1.html"),
        &engine,
    )?;
    let json = body_json(resp);
    assert_eq!(json["resolver"]["facts"]["has_maids_room"], true);
    assert_eq!(json["selection"]["reason"], "MAID_ROOM_FALLBACK");
    assert_eq!(json["selection"]["unit_type_chosen"], "2BR");

    std::fs::remove_file(path).ok();
    Ok(())
}

#[test]
fn analyze_link_requires_url() {
    let (engine, path) = engine_with(SCENARIO_CSV, Box::new(OfflinePages));

    let err = expect_err(handle(
        post_json("/api/analyze/link", r#"{"url": "  "}"#),
        &engine,
    ));
    assert_eq!(err.status(), 400);

    let err = expect_err(handle(get("/api/analyze/link"), &engine));
    assert_eq!(err.code(), "bad_request");

    std::fs::remove_file(path).ok();
}
