//! Realms: independent strategies that establish or check a request's identity.
//!
//! - [`SessionRealm`]: principal stored in the session at login
//! - [`ApiKeyRealm`]: API key presented by a machine client
//! - [`TenantRealm`]: tenant membership of an already established principal
//!
//! Realms are built once, never mutated, and shared by every worker. They see
//! a request through [`RealmRequest`], an owned snapshot of the parts they
//! need, so their futures stay `Send` and free of actix internals.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use actix_session::SessionExt;
use actix_web::dev::ServiceRequest;
use async_trait::async_trait;

use crate::http::error::AuthFailure;
use crate::http::security::service::LookupError;
use crate::http::security::User;

mod api_key;
mod session;
mod tenant;

pub use api_key::{ApiKeyConfig, ApiKeyLocation, ApiKeyRealm};
pub use session::{SessionConfig, SessionError, SessionFixationStrategy, SessionRealm, SessionUser};
pub use tenant::{TenantConfig, TenantRealm};

/// Outcome of one realm for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthResult {
    /// Identity established (or confirmed); carries the principal for the next filter.
    Authenticated(User),
    /// The realm looked at the request and refused it.
    Rejected(AuthFailure),
    /// The realm had nothing to decide on.
    Indeterminate,
}

/// A strategy for authenticating a request from one signal source.
#[async_trait]
pub trait Realm: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Cheap precondition: does the request carry this realm's signal at all?
    fn supports(&self, request: &RealmRequest) -> bool;

    /// Authenticates `request`.
    ///
    /// `principal` is the identity established by earlier filters of the
    /// same chain, if any.
    async fn authenticate(&self, request: &RealmRequest, principal: Option<&User>) -> AuthResult;
}

/// Owned snapshot of the request data realms work on.
///
/// Header names are stored lowercase.
#[derive(Debug, Clone, Default)]
pub struct RealmRequest {
    path: String,
    headers: HashMap<String, String>,
    session_user: Option<SessionUser>,
}

impl RealmRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Captures path, UTF-8 headers and the session principal of `req`.
    ///
    /// The path is the percent-decoded one actix dispatches handlers on, so
    /// `/%6Fpenapi/x` is routed like `/openapi/x`.
    pub fn from_service_request(req: &ServiceRequest, session_config: &SessionConfig) -> Self {
        let headers = req
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_ascii_lowercase(), value.to_string()))
            })
            .collect();

        let session_user = req
            .get_session()
            .get::<SessionUser>(session_config.get_user_key())
            .ok()
            .flatten();

        Self {
            path: req.match_info().as_str().to_string(),
            headers,
            session_user,
        }
    }

    /// Adds a header (builder pattern).
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Sets the session principal (builder pattern).
    pub fn with_session_user(mut self, user: SessionUser) -> Self {
        self.session_user = Some(user);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn session_user(&self) -> Option<&SessionUser> {
        self.session_user.as_ref()
    }
}

/// Runs an external lookup under `timeout`.
///
/// Errors and timeouts both become [`AuthFailure::ServiceUnavailable`].
pub(crate) async fn lookup<T, F>(timeout: Duration, call: F) -> Result<T, AuthFailure>
where
    F: Future<Output = Result<T, LookupError>>,
{
    let result = tokio::time::timeout(timeout, call)
        .await
        .unwrap_or(Err(LookupError::Timeout));

    result.map_err(|err| {
        log::warn!("identity lookup failed: {}", err);
        AuthFailure::ServiceUnavailable
    })
}
