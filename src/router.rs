use crate::dataset::links::DEFAULT_LIMIT;
use crate::engine::{EnrichItem, Engine};
use crate::errors::ServerError;
use crate::responses::{json_response, json_with_status, ResultResp};
use astra::Request;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::io::Read;

/// Upper bound on a JSON request body.
const MAX_BODY_BYTES: u64 = 2 * 1024 * 1024;

#[derive(Debug, Default, Deserialize)]
struct LookupParams {
    #[serde(default, alias = "building")]
    building_name: String,
    #[serde(default, alias = "unit")]
    unit_type: String,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default, deserialize_with = "truthy")]
    debug: bool,
}

#[derive(Debug, Default, Deserialize)]
struct LinkParams {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct EnrichRequest {
    #[serde(default)]
    items: Vec<EnrichItem>,
}

#[derive(Serialize)]
struct EnrichResponse<T: Serialize> {
    count: usize,
    items: Vec<T>,
}

pub fn handle(mut req: Request, engine: &Engine) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();

    match (method.as_str(), path.as_str()) {
        ("GET", "/api/health") => {
            let report = engine.health();
            let status = if report.is_healthy() { 200 } else { 503 };
            Ok(json_with_status(status, &report))
        }

        ("GET" | "POST", "/api/economics/lookup") => {
            let params = lookup_params(&mut req)?;
            json_response(&engine.economics(&params.building_name, &params.unit_type))
        }

        ("GET", "/api/economics/sources") => {
            let params = lookup_params(&mut req)?;
            json_response(&engine.sources(&params.building_name, &params.unit_type))
        }

        ("GET" | "POST", "/api/analyze/link") => {
            let params: LinkParams = if method == "GET" {
                LinkParams {
                    url: query_params(&req).remove("url").unwrap_or_default(),
                }
            } else {
                read_json(&mut req)?
            };
            let url = params.url.trim();
            if url.is_empty() {
                return Err(ServerError::BadRequest("url is required".into()));
            }
            json_response(&engine.analyze_link(url))
        }

        ("GET" | "POST", "/api/listings/lookup") => {
            let params = lookup_params(&mut req)?;
            let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
            let mut links = engine.links(&params.building_name, &params.unit_type, limit);
            if params.debug {
                links.debug = Some(
                    engine.listings_debug(Some(&params.building_name), Some(&params.unit_type)),
                );
            }
            json_response(&links)
        }

        ("GET" | "POST", "/api/listings/debug") => {
            let params: LookupParams = if method == "POST" {
                read_optional_json(&mut req)?
            } else {
                query_lookup_params(&req)?
            };
            json_response(&engine.listings_debug(
                Some(&params.building_name),
                Some(&params.unit_type),
            ))
        }

        ("POST", "/api/enrich") => {
            let body: EnrichRequest = read_json(&mut req)?;
            let items = engine.enrich(&body.items)?;
            json_response(&EnrichResponse {
                count: items.len(),
                items,
            })
        }

        _ => Err(ServerError::NotFound),
    }
}

fn lookup_params(req: &mut Request) -> Result<LookupParams, ServerError> {
    if req.method().as_str() != "GET" {
        return read_json(req);
    }
    query_lookup_params(req)
}

fn query_lookup_params(req: &Request) -> Result<LookupParams, ServerError> {
    let mut q = query_params(req);
    let mut take = |keys: &[&str]| keys.iter().find_map(|k| q.remove(*k)).unwrap_or_default();
    let building_name = take(&["building_name", "building"]);
    let unit_type = take(&["unit_type", "unit"]);
    let limit = take(&["limit"]);
    let debug = is_truthy(&take(&["debug"]));

    let limit = if limit.is_empty() {
        None
    } else {
        Some(
            limit
                .parse()
                .map_err(|_| ServerError::BadRequest(format!("invalid limit '{limit}'")))?,
        )
    };

    Ok(LookupParams {
        building_name,
        unit_type,
        limit,
        debug,
    })
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "y"
    )
}

/// Accepts `true`/`false`, numbers, or any of the truthy strings.
fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        serde_json::Value::String(s) => is_truthy(&s),
        _ => false,
    })
}

fn query_params(req: &Request) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

fn read_body(req: &mut Request) -> Result<Vec<u8>, ServerError> {
    let mut body = Vec::new();
    req.body_mut()
        .reader()
        .take(MAX_BODY_BYTES + 1)
        .read_to_end(&mut body)
        .map_err(|e| ServerError::BadRequest(format!("unreadable body: {e}")))?;

    if body.len() as u64 > MAX_BODY_BYTES {
        return Err(ServerError::BodyTooLarge {
            max: MAX_BODY_BYTES,
        });
    }
    Ok(body)
}

fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ServerError> {
    serde_json::from_slice(body).map_err(|e| ServerError::BadRequest(format!("invalid JSON: {e}")))
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

fn read_json<T: DeserializeOwned>(req: &mut Request) -> Result<T, ServerError> {
    let body = read_body(req)?;
    if is_blank(&body) {
        return Err(ServerError::BadRequest("JSON body required".into()));
    }
    parse_json(&body)
}

/// Like `read_json`, but an empty body yields the default value.
fn read_optional_json<T: DeserializeOwned + Default>(req: &mut Request) -> Result<T, ServerError> {
    let body = read_body(req)?;
    if is_blank(&body) {
        return Ok(T::default());
    }
    parse_json(&body)
}
