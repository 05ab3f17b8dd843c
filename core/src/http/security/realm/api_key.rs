//! API key realm for machine clients of the open API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{lookup, AuthResult, Realm, RealmRequest};
use crate::http::error::AuthFailure;
use crate::http::security::service::{CredentialId, UserService};
use crate::http::security::User;

/// Where to look for the API key in requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKeyLocation {
    /// A dedicated header (e.g., "X-API-Key").
    Header(String),
    /// The Authorization header with a custom scheme.
    /// Example: `Authorization: ApiKey sk_live_abc123`
    AuthorizationHeader(String),
}

impl Default for ApiKeyLocation {
    fn default() -> Self {
        Self::Header("X-API-Key".to_string())
    }
}

impl ApiKeyLocation {
    pub fn header(name: impl Into<String>) -> Self {
        Self::Header(name.into())
    }

    pub fn authorization(scheme: impl Into<String>) -> Self {
        Self::AuthorizationHeader(scheme.into())
    }

    fn extract<'r>(&self, request: &'r RealmRequest) -> Option<&'r str> {
        let key = match self {
            ApiKeyLocation::Header(name) => request.header(name),
            ApiKeyLocation::AuthorizationHeader(scheme) => {
                let (auth_scheme, token) = request.header("authorization")?.split_once(' ')?;
                auth_scheme
                    .eq_ignore_ascii_case(scheme)
                    .then_some(token.trim())
            }
        };
        key.filter(|key| !key.is_empty())
    }
}

/// Configuration for API key authentication.
#[derive(Debug, Clone)]
pub struct ApiKeyConfig {
    /// Checked in order; the first location carrying a key wins.
    locations: Vec<ApiKeyLocation>,
    validate_expiration: bool,
}

impl Default for ApiKeyConfig {
    fn default() -> Self {
        Self {
            locations: vec![
                ApiKeyLocation::default(),
                ApiKeyLocation::authorization("ApiKey"),
            ],
            validate_expiration: true,
        }
    }
}

impl ApiKeyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks for the key in a single header.
    pub fn header(name: impl Into<String>) -> Self {
        Self {
            locations: vec![ApiKeyLocation::Header(name.into())],
            ..Default::default()
        }
    }

    pub fn add_location(mut self, location: ApiKeyLocation) -> Self {
        self.locations.push(location);
        self
    }

    pub fn locations(mut self, locations: Vec<ApiKeyLocation>) -> Self {
        self.locations = locations;
        self
    }

    /// Sets whether keys of expired accounts are refused.
    pub fn validate_expiration(mut self, validate: bool) -> Self {
        self.validate_expiration = validate;
        self
    }

    pub fn get_locations(&self) -> &[ApiKeyLocation] {
        &self.locations
    }

    pub fn should_validate_expiration(&self) -> bool {
        self.validate_expiration
    }
}

/// Realm that resolves a presented API key through the [`UserService`].
///
/// # Example
/// ```ignore
/// let realm = ApiKeyRealm::new(users)
///     .config(ApiKeyConfig::header("X-Open-Key"))
///     .lookup_timeout(Duration::from_secs(2));
/// ```
#[derive(Clone)]
pub struct ApiKeyRealm {
    users: Arc<dyn UserService>,
    config: ApiKeyConfig,
    lookup_timeout: Duration,
}

impl ApiKeyRealm {
    pub fn new(users: Arc<dyn UserService>) -> Self {
        Self {
            users,
            config: ApiKeyConfig::default(),
            lookup_timeout: Duration::from_secs(5),
        }
    }

    pub fn config(mut self, config: ApiKeyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    fn extract_key<'r>(&self, request: &'r RealmRequest) -> Option<&'r str> {
        self.config
            .get_locations()
            .iter()
            .find_map(|location| location.extract(request))
    }
}

#[async_trait]
impl Realm for ApiKeyRealm {
    fn name(&self) -> &str {
        "api-key"
    }

    fn supports(&self, request: &RealmRequest) -> bool {
        self.extract_key(request).is_some()
    }

    async fn authenticate(&self, request: &RealmRequest, _principal: Option<&User>) -> AuthResult {
        let Some(key) = self.extract_key(request) else {
            return AuthResult::Rejected(AuthFailure::InvalidApiKey);
        };

        let found = lookup(
            self.lookup_timeout,
            self.users.find_by_credentials(CredentialId::ApiKey(key)),
        )
        .await;

        match found {
            Ok(Some(user)) if self.config.should_validate_expiration() && user.is_expired() => {
                AuthResult::Rejected(AuthFailure::AccountExpired)
            }
            Ok(Some(user)) => AuthResult::Authenticated(user.into_principal()),
            Ok(None) => AuthResult::Rejected(AuthFailure::InvalidApiKey),
            Err(failure) => AuthResult::Rejected(failure),
        }
    }
}
