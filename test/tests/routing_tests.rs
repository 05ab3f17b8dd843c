//! Path routing tests.
//!
//! Which chain guards which path, for both values of the API flag.

mod common;

use actix_web::http::StatusCode;
use actix_web::test;

use auth_gateway_core::http::security::FilterName;

use common::{create_test_app, login_cookie, test_gateway};

// =============================================================================
// Anonymous Paths
// =============================================================================

#[actix_web::test]
async fn test_doc_page_is_public() {
    let app = create_test_app(true).await;

    let req = test::TestRequest::get().uri("/doc.html").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_swagger_resources_is_public() {
    let app = create_test_app(true).await;

    let req = test::TestRequest::get().uri("/swagger-resources").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_login_endpoint_reachable_without_session() {
    let app = create_test_app(false).await;

    // reaches the handler, which rejects the credentials itself
    let req = test::TestRequest::post()
        .uri("/api/anno/login")
        .set_json(serde_json::json!({ "username": "alice", "password": "wrong" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/anno/login")
        .set_json(serde_json::json!({ "username": "alice", "password": "alice" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

// =============================================================================
// Protected Paths
// =============================================================================

#[actix_web::test]
async fn test_console_requires_session() {
    let app = create_test_app(false).await;

    let req = test::TestRequest::get().uri("/console/groups").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body = test::read_body(resp).await;
    assert_eq!(
        String::from_utf8_lossy(&body),
        r#"{"success":false,"errMsg":"unauthorized"}"#
    );
}

#[actix_web::test]
async fn test_unknown_path_falls_to_catch_all() {
    let app = create_test_app(false).await;

    let req = test::TestRequest::get().uri("/no/such/page").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_openapi_root_is_not_open_api() {
    // "/openapi/**/*" needs at least one segment after the prefix
    let app = create_test_app(false).await;

    let req = test::TestRequest::get().uri("/openapi").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// API Flag
// =============================================================================

#[actix_web::test]
async fn test_openapi_open_when_flag_off() {
    let app = create_test_app(false).await;

    let req = test::TestRequest::post().uri("/openapi/publish").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["publishedBy"].is_null());
}

#[actix_web::test]
async fn test_openapi_guarded_when_flag_on() {
    let app = create_test_app(true).await;

    let req = test::TestRequest::post().uri("/openapi/publish").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_encoded_openapi_path_keeps_api_chain() {
    let app = create_test_app(true).await;
    let cookie = login_cookie(&app, "alice", "alice").await.unwrap();

    for uri in ["/openapi/publish", "/%6Fpenapi/publish", "/%6f%70enapi/publish"] {
        let req = test::TestRequest::post()
            .uri(uri)
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }

    let req = test::TestRequest::post()
        .uri("/%6Fpenapi/publish")
        .insert_header(("X-API-Key", "sk_alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_encoded_anonymous_path_stays_public() {
    let app = create_test_app(true).await;

    let req = test::TestRequest::post()
        .uri("/api/%61nno/login")
        .set_json(serde_json::json!({ "username": "alice", "password": "alice" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_rule_tables() {
    let off = test_gateway(false).await;
    let on = test_gateway(true).await;

    let chain = off.router().route("/openapi/publish").unwrap();
    assert!(chain.is_anonymous());

    let chain = on.router().route("/openapi/publish").unwrap();
    assert_eq!(chain.filters(), &[FilterName::API_KEY, FilterName::TENANT]);

    for gateway in [&off, &on] {
        let chain = gateway.router().route("/console/groups").unwrap();
        assert_eq!(chain.filters(), &[FilterName::SESSION, FilterName::TENANT]);
        assert_eq!(gateway.router().rules().len(), 8);
    }
}
