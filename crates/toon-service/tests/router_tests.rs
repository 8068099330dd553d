//! HTTP contract tests: drive the router in-process with `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use toon_core::{DecodeOptions, Delimiter, EncodeOptions, Toon};
use toon_service::{router, AppState};
use tower::ServiceExt;

const LIMIT: usize = 10 * 1024 * 1024;

fn app() -> Router {
    router(AppState::new(Toon::default()), LIMIT)
}

fn post(uri: &str, content_type: Option<&str>, body: impl Into<Body>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(body.into()).unwrap()
}

async fn body_text(resp: Response) -> String {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

async fn body_json(resp: Response) -> Value {
    serde_json::from_str(&body_text(resp).await).unwrap()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn health_reports_ok() {
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({"status": "ok", "message": "Toon microservice running"})
    );
}

// ============================================================================
// JSON → TOON
// ============================================================================

#[tokio::test]
async fn json_to_toon_returns_plain_text() {
    let req = post(
        "/convert/json-to-toon",
        Some("application/json"),
        r#"{"Employee":{"Name":"Mohan","Salary":50000}}"#,
    );

    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert_eq!(
        body_text(resp).await,
        "Employee:\n  Name: Mohan\n  Salary: 50000"
    );
}

#[tokio::test]
async fn json_to_toon_accepts_any_json_value() {
    for (json, toon) in [
        ("[1,2,3]", "[3]: 1,2,3"),
        (r#""hello""#, "hello"),
        ("null", "null"),
        ("{}", ""),
    ] {
        let resp = app()
            .oneshot(post("/convert/json-to-toon", Some("application/json"), json))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{json}");
        assert_eq!(body_text(resp).await, toon, "{json}");
    }
}

#[tokio::test]
async fn json_to_toon_empty_body_is_missing_input() {
    let resp = app()
        .oneshot(post("/convert/json-to-toon", Some("application/json"), ""))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp).await,
        json!({"error": "Missing JSON data in body"})
    );
}

#[tokio::test]
async fn json_to_toon_malformed_json_is_400() {
    let resp = app()
        .oneshot(post("/convert/json-to-toon", None, r#"{"a": }"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["kind"], "InvalidJson");
    assert_eq!(body["line"], 1);
}

#[tokio::test]
async fn json_to_toon_nan_is_unencodable() {
    let resp = app()
        .oneshot(post(
            "/convert/json-to-toon",
            Some("application/json"),
            r#"{"Salary": NaN}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Failed to convert JSON to TOON");
    assert_eq!(body["kind"], "Unencodable");
    assert!(body["details"].as_str().unwrap().contains("NaN"), "{body}");
}

#[tokio::test]
async fn json_to_toon_uses_configured_codec() {
    let codec = Toon::new(
        EncodeOptions {
            indent: 4,
            delimiter: Delimiter::Pipe,
        },
        DecodeOptions::default(),
    );
    let app = router(AppState::new(codec), LIMIT);
    let resp = app
        .oneshot(post(
            "/convert/json-to-toon",
            None,
            r#"{"a":{"t":["x,y","z"]}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "a:\n    t[2|]: x,y|z");
}

// ============================================================================
// TOON → JSON
// ============================================================================

#[tokio::test]
async fn toon_to_json_raw_text_body() {
    let resp = app()
        .oneshot(post(
            "/convert/toon-to-json",
            Some("text/plain"),
            "users[2]{id,name}:\n  1,Alice\n  2,Bob",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    assert_eq!(
        body_text(resp).await,
        r#"{"users":[{"id":1,"name":"Alice"},{"id":2,"name":"Bob"}]}"#
    );
}

#[tokio::test]
async fn toon_to_json_json_envelope() {
    let envelope = json!({"toon": "Employee:\n  Name: Mohan\n  Salary: 50000"}).to_string();
    let resp = app()
        .oneshot(post(
            "/convert/toon-to-json",
            Some("application/json"),
            envelope,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({"Employee": {"Name": "Mohan", "Salary": 50000}})
    );
}

#[tokio::test]
async fn toon_to_json_empty_body_is_missing_input() {
    for content_type in [None, Some("application/json"), Some("text/plain")] {
        let resp = app()
            .oneshot(post("/convert/toon-to-json", content_type, ""))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{content_type:?}");
        assert_eq!(
            body_json(resp).await,
            json!({"error": "Missing 'toon' data in body"})
        );
    }
}

#[tokio::test]
async fn toon_to_json_envelope_without_toon_is_missing_input() {
    for envelope in [r#"{}"#, r#"{"toon": ""}"#, r#"{"toon": null}"#, r#"{"data": "a: 1"}"#] {
        let resp = app()
            .oneshot(post(
                "/convert/toon-to-json",
                Some("application/json"),
                envelope,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{envelope}");
        assert_eq!(
            body_json(resp).await,
            json!({"error": "Missing 'toon' data in body"})
        );
    }
}

#[tokio::test]
async fn toon_to_json_malformed_envelope_is_400() {
    let resp = app()
        .oneshot(post(
            "/convert/toon-to-json",
            Some("application/json"),
            r#"{"toon": "#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["kind"], "InvalidJson");
}

#[tokio::test]
async fn toon_to_json_syntax_error_is_500_with_position() {
    let resp = app()
        .oneshot(post("/convert/toon-to-json", None, "a: 1\nb: \"oops"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "Failed to convert TOON to JSON");
    assert_eq!(body["kind"], "SyntaxError");
    assert_eq!(body["line"], 2);
    assert_eq!(body["column"], 4);
    assert_eq!(body["details"], "unterminated string");
}

#[tokio::test]
async fn toon_to_json_invalid_utf8_is_syntax_error() {
    let resp = app()
        .oneshot(post(
            "/convert/toon-to-json",
            Some("text/plain"),
            b"a: \xff".to_vec(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert_eq!(body["kind"], "SyntaxError");
    assert_eq!(body["column"], 4);
}

#[tokio::test]
async fn toon_to_json_strictness_follows_codec() {
    let strict = app()
        .oneshot(post("/convert/toon-to-json", None, "tags[3]: a,b"))
        .await
        .unwrap();
    assert_eq!(strict.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let lax = router(
        AppState::new(Toon::new(
            EncodeOptions::default(),
            DecodeOptions {
                indent: 2,
                strict: false,
            },
        )),
        LIMIT,
    );
    let resp = lax
        .oneshot(post("/convert/toon-to-json", None, "tags[3]: a,b"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"tags": ["a", "b"]}));
}

// ============================================================================
// Round trip through both endpoints
// ============================================================================

#[tokio::test]
async fn conversions_round_trip() {
    let original = json!({
        "name": "Alice",
        "tags": ["a,b", "", "true"],
        "rows": [{"id": 1, "note": "x: y"}, {"id": 2, "note": null}],
        "mixed": [1, {"k": []}, [2.5]]
    });

    let resp = app()
        .oneshot(post(
            "/convert/json-to-toon",
            Some("application/json"),
            original.to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let toon = body_text(resp).await;

    let resp = app()
        .oneshot(post("/convert/toon-to-json", Some("text/plain"), toon))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, original);
}

// ============================================================================
// Limits, routing, CORS
// ============================================================================

#[tokio::test]
async fn oversized_body_is_413() {
    let app = router(AppState::new(Toon::default()), 16);
    let body = format!(r#"{{"padding": "{}"}}"#, "x".repeat(64));
    for uri in ["/convert/json-to-toon", "/convert/toon-to-json"] {
        let resp = app
            .clone()
            .oneshot(post(uri, Some("application/json"), body.clone()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE, "{uri}");
    }
}

#[tokio::test]
async fn unknown_route_is_404() {
    let req = Request::builder()
        .uri("/convert/yaml-to-toon")
        .body(Body::empty())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn wrong_method_is_405() {
    let req = Request::builder()
        .uri("/convert/json-to-toon")
        .body(Body::empty())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn cors_preflight_is_permissive() {
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/convert/json-to-toon")
        .header(header::ORIGIN, "http://example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}
