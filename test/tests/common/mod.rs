//! Common test utilities and configuration.
//!
//! This module provides shared test infrastructure including:
//! - Seeded in-memory collaborators
//! - Test app builder
//! - Session login helper

#![allow(dead_code)]

use std::sync::Arc;

use actix_http::Request;
use actix_session::storage::CookieSessionStore;
use actix_session::{Session, SessionMiddleware};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{get, post, test, web, App, Error, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use auth_gateway_core::http::security::realm::{SessionError, SessionRealm};
use auth_gateway_core::http::security::service::{
    InMemoryRoleService, InMemoryTenantService, InMemoryUserService, Tenant,
};
use auth_gateway_core::http::security::{
    AuthenticatedUser, Collaborators, CredentialVerifier, Gateway, GatewayAssembler,
    GatewayConfig, GatewayTransform, OptionalUser, User,
};

// =============================================================================
// Test Configuration
// =============================================================================

/// Creates collaborators with predefined users, tenants and grants.
///
/// Users (password = username):
/// - admin: platform administrator, API key `sk_admin`
/// - alice: member of `public`, API key `sk_alice`
/// - bob: member of `team-a`
/// - retired: member of `public`, account expired
///
/// Tenants: `public`, `team-a`
pub async fn test_collaborators() -> Collaborators {
    let verifier = CredentialVerifier::default();
    let users = InMemoryUserService::new();
    for name in ["admin", "alice", "bob"] {
        users
            .add_user(User::with_encoded_password(name, verifier.hash(name)))
            .await;
    }
    users
        .add_user(
            User::with_encoded_password("retired", verifier.hash("retired"))
                .expires_at(std::time::SystemTime::UNIX_EPOCH),
        )
        .await;
    users.add_api_key("sk_admin", "admin").await;
    users.add_api_key("sk_alice", "alice").await;

    let tenants = InMemoryTenantService::new();
    tenants.add_tenant(Tenant::new("public")).await;
    tenants.add_tenant(Tenant::new("team-a")).await;

    let platform_roles = InMemoryRoleService::new();
    platform_roles.grant_all("admin").await;

    let tenant_roles = InMemoryRoleService::new();
    tenant_roles.grant("alice", "public").await;
    tenant_roles.grant("bob", "team-a").await;
    tenant_roles.grant("retired", "public").await;

    Collaborators {
        users: Arc::new(users),
        platform_roles: Arc::new(platform_roles),
        tenant_roles: Arc::new(tenant_roles),
        tenants: Arc::new(tenants),
    }
}

pub async fn test_gateway(api_auth_enabled: bool) -> Arc<Gateway> {
    let config = GatewayConfig::new().api_auth_enabled(api_auth_enabled);
    let gateway = GatewayAssembler::new(config, test_collaborators().await)
        .assemble()
        .expect("test gateway must assemble");
    Arc::new(gateway)
}

// =============================================================================
// Test Handlers
// =============================================================================

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[post("/api/anno/login")]
pub async fn login(
    session: Session,
    form: web::Json<LoginForm>,
    realm: web::Data<SessionRealm>,
) -> Result<HttpResponse, SessionError> {
    let user = realm.login(&session, &form.username, &form.password).await?;
    Ok(HttpResponse::Ok().body(format!("Welcome, {}!", user.get_username())))
}

#[post("/api/anno/logout")]
pub async fn logout(session: Session, realm: web::Data<SessionRealm>) -> impl Responder {
    realm.logout(&session);
    HttpResponse::Ok().body("Bye")
}

#[get("/doc.html")]
pub async fn doc() -> impl Responder {
    HttpResponse::Ok().body("docs")
}

#[get("/swagger-resources")]
pub async fn swagger_resources() -> impl Responder {
    HttpResponse::Ok().body("[]")
}

#[get("/console/groups")]
pub async fn groups(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().body(format!(
        "Groups of {} in {}",
        user.get_username(),
        user.get_tenant().unwrap_or("-")
    ))
}

#[get("/openapi")]
pub async fn openapi_root() -> impl Responder {
    HttpResponse::Ok().body("openapi root")
}

#[post("/openapi/publish")]
pub async fn publish(user: OptionalUser) -> impl Responder {
    match user.into_inner() {
        Some(u) => HttpResponse::Ok().json(json!({
            "publishedBy": u.get_username(),
            "tenant": u.get_tenant()
        })),
        None => HttpResponse::Ok().json(json!({ "publishedBy": null })),
    }
}

// =============================================================================
// Test App
// =============================================================================

/// Creates the test app with the gateway and a cookie session store.
pub async fn create_test_app(
    api_auth_enabled: bool,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = Error> {
    let gateway = test_gateway(api_auth_enabled).await;
    let session_realm = web::Data::from(
        gateway
            .session_realm()
            .cloned()
            .expect("assembled gateway has a session realm"),
    );

    test::init_service(
        App::new()
            .app_data(session_realm)
            .wrap(GatewayTransform::new(gateway))
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                    .cookie_secure(false)
                    .build(),
            )
            .service(login)
            .service(logout)
            .service(doc)
            .service(swagger_resources)
            .service(groups)
            .service(openapi_root)
            .service(publish),
    )
    .await
}

/// Logs in through `/api/anno/login` and returns the session cookie.
pub async fn login_cookie<S, B>(app: &S, username: &str, password: &str) -> Option<Cookie<'static>>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/anno/login")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();

    let resp = test::call_service(app, req).await;
    if !resp.status().is_success() {
        return None;
    }
    let cookie = resp.response().cookies().next().map(|c| c.into_owned());
    cookie
}
