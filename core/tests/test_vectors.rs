//! Shared JSON test vectors for request building and response decoding.
//!
//! # Design
//! Each vector pins the exact request an operation must emit and the result
//! (or error) a simulated response must decode to. The transport is a
//! closure that records the request and replays the simulated response, so
//! no network is involved.

use std::cell::RefCell;

use pipedrive_core::resources::notes::CreateNoteOptions;
use pipedrive_core::{
    pagination, Client, ClientConfig, DecodeError, Error, HttpMethod, HttpRequest, HttpResponse,
    RequestOptions, Timestamp, TransportError,
};
use serde_json::Value;

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

fn create_options(input: &Value) -> CreateNoteOptions {
    let mut opts = CreateNoteOptions::new();
    if let Some(content) = input["content"].as_str() {
        opts = opts.content(content);
    }
    if let Some(deal_id) = input["deal_id"].as_i64() {
        opts = opts.deal_id(deal_id);
    }
    if let Some(pinned) = input["pinned_to_deal_flag"].as_bool() {
        opts = opts.pinned_to_deal_flag(pinned);
    }
    opts
}

fn check_request(name: &str, base_url: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(
        req.path,
        format!("{base_url}{}", expected["path"].as_str().unwrap()),
        "{name}: path"
    );
    let query: Vec<(String, String)> = serde_json::from_value(expected["query"].clone()).unwrap();
    assert_eq!(req.query, query, "{name}: query");
    match expected.get("body") {
        Some(body) => {
            let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&sent, body, "{name}: body");
            assert_eq!(req.header_value("content-type"), Some("application/json"), "{name}");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn check_error(name: &str, case: &Value, err: Error) {
    match case["expected_error"].as_str().unwrap() {
        "Validation" => {
            let Error::Validation(v) = err else {
                panic!("{name}: expected validation error");
            };
            let expected: Vec<String> =
                serde_json::from_value(case["expected_violations"].clone()).unwrap();
            assert_eq!(v.violations, expected, "{name}: violations");
        }
        "Api" => {
            let Error::Api(api) = err else {
                panic!("{name}: expected API error");
            };
            assert_eq!(u64::from(api.status), case["expected_status"].as_u64().unwrap(), "{name}");
        }
        "MissingData" => {
            assert!(matches!(err, Error::Decode(DecodeError::MissingData)), "{name}: {err:?}");
        }
        other => panic!("{name}: unknown expected_error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

#[test]
fn note_test_vectors() {
    let raw = include_str!("../../test-vectors/notes.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();
    let base_url = vectors["base_url"].as_str().unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sent: RefCell<Option<HttpRequest>> = RefCell::new(None);
        let client = Client::new(
            ClientConfig::new(base_url).with_api_token(vectors["api_token"].as_str().unwrap()),
            |req: HttpRequest| -> Result<HttpResponse, TransportError> {
                *sent.borrow_mut() = Some(req);
                Ok(simulated(case))
            },
        );
        let notes = client.notes();

        let outcome: Result<Value, Error> = match case["operation"].as_str().unwrap() {
            "create" => notes
                .create(create_options(&case["input"]))
                .map(|note| serde_json::json!({"id": note.id, "content": note.content, "deal_id": note.deal_id})),
            "get" => notes
                .get(case["input_id"].as_i64().unwrap(), RequestOptions::new())
                .map(|note| serde_json::json!({"id": note.id, "content": note.content})),
            "delete" => notes
                .delete(case["input_id"].as_i64().unwrap(), RequestOptions::new())
                .map(Value::Bool),
            other => panic!("{name}: unknown operation: {other}"),
        };

        match case.get("expected_request") {
            Some(expected) => {
                let req = sent.borrow();
                let req = req.as_ref().unwrap_or_else(|| panic!("{name}: no request sent"));
                check_request(name, base_url, req, expected);
            }
            None => assert!(sent.borrow().is_none(), "{name}: transport must not be called"),
        }

        if case.get("expected_error").is_some() {
            check_error(name, case, outcome.unwrap_err());
        } else {
            assert_eq!(outcome.unwrap(), case["expected_result"], "{name}: result");
        }
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[test]
fn pagination_test_vectors() {
    let raw = include_str!("../../test-vectors/pagination.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let additional = &case["additional_data"];
        let result = pagination::extract(Some(additional));

        if case.get("expected_error").is_some() {
            assert!(result.is_err(), "{name}: expected error");
            continue;
        }
        let page = result.unwrap();
        let expected: Option<pagination::Pagination> =
            serde_json::from_value(case["expected"].clone()).unwrap();
        assert_eq!(page, expected, "{name}");
        if let Some(next) = case.get("expected_next_page_start") {
            assert_eq!(page.and_then(|p| p.next_page_start()), next.as_u64(), "{name}");
        }
    }
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

#[test]
fn timestamp_test_vectors() {
    let raw = include_str!("../../test-vectors/timestamps.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["accepted"].as_array().unwrap() {
        let raw = case["raw"].as_str().unwrap();
        let ts: Timestamp = raw.parse().unwrap_or_else(|e| panic!("{raw}: {e}"));
        assert_eq!(ts.to_string(), case["utc"].as_str().unwrap(), "{raw}");
    }
    for raw in vectors["rejected"].as_array().unwrap() {
        let raw = raw.as_str().unwrap();
        assert!(raw.parse::<Timestamp>().is_err(), "{raw} should be rejected");
    }
}
