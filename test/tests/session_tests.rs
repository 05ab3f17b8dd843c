//! Session chain tests: `[authWeb, authTenant]` on the console.

mod common;

use actix_web::http::StatusCode;
use actix_web::test;

use common::{create_test_app, login_cookie};

#[actix_web::test]
async fn test_login_then_console() {
    let app = create_test_app(false).await;

    let cookie = login_cookie(&app, "alice", "alice")
        .await
        .expect("login should succeed");

    let req = test::TestRequest::get()
        .uri("/console/groups")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    assert_eq!(String::from_utf8_lossy(&body), "Groups of alice in public");
}

#[actix_web::test]
async fn test_wrong_password_rejected() {
    let app = create_test_app(false).await;
    assert!(login_cookie(&app, "alice", "bob").await.is_none());
    assert!(login_cookie(&app, "nobody", "nobody").await.is_none());
}

#[actix_web::test]
async fn test_expired_account_cannot_login() {
    let app = create_test_app(false).await;
    assert!(login_cookie(&app, "retired", "retired").await.is_none());
}

#[actix_web::test]
async fn test_tenant_without_role_denied() {
    let app = create_test_app(false).await;
    let cookie = login_cookie(&app, "alice", "alice").await.unwrap();

    let req = test::TestRequest::get()
        .uri("/console/groups")
        .insert_header(("tenant", "team-a"))
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_unknown_tenant_denied() {
    let app = create_test_app(false).await;
    let cookie = login_cookie(&app, "admin", "admin").await.unwrap();

    let req = test::TestRequest::get()
        .uri("/console/groups")
        .insert_header(("tenant", "ghost"))
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_platform_admin_in_any_tenant() {
    let app = create_test_app(false).await;
    let cookie = login_cookie(&app, "admin", "admin").await.unwrap();

    let req = test::TestRequest::get()
        .uri("/console/groups")
        .insert_header(("tenant", "team-a"))
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    assert_eq!(String::from_utf8_lossy(&body), "Groups of admin in team-a");
}

#[actix_web::test]
async fn test_tenant_member_in_own_tenant() {
    let app = create_test_app(false).await;
    let cookie = login_cookie(&app, "bob", "bob").await.unwrap();

    let req = test::TestRequest::get()
        .uri("/console/groups")
        .insert_header(("tenant", "team-a"))
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // bob has no role in the default tenant
    let req = test::TestRequest::get()
        .uri("/console/groups")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_logout_ends_access() {
    let app = create_test_app(false).await;
    let cookie = login_cookie(&app, "alice", "alice").await.unwrap();

    let req = test::TestRequest::post()
        .uri("/api/anno/logout")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cleared = resp
        .response()
        .cookies()
        .next()
        .map(|c| c.into_owned())
        .expect("logout rewrites the session cookie");

    let req = test::TestRequest::get()
        .uri("/console/groups")
        .cookie(cleared)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
