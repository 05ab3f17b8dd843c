//! Gateway assembly and per-request authorization.
//!
//! [`GatewayAssembler`] turns a [`GatewayConfig`] and the external
//! [`Collaborators`] into an immutable [`Gateway`]: a filter registry plus a
//! validated path rule table. The gateway is built once at startup, shared
//! behind an `Arc` and never mutated afterwards.
//!
//! # Rule table
//!
//! | pattern                   | chain                      |
//! |---------------------------|----------------------------|
//! | `/api/anno/**/*`          | anon                       |
//! | `/doc.html`               | anon                       |
//! | `/v2/api-docs/**/**`      | anon                       |
//! | `/webjars/**/*`           | anon                       |
//! | `/swagger-resources/**/*` | anon                       |
//! | `/swagger-resources`      | anon                       |
//! | `/openapi/**/*`           | `[authAPI, authTenant]` when API auth is enabled, anon otherwise |
//! | `/**`                     | `[authWeb, authTenant]`    |

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::http::error::{AuthFailure, ConfigurationError};
use crate::http::security::ant_matcher::CATCH_ALL;
use crate::http::security::crypto::CredentialVerifier;
use crate::http::security::realm::{
    ApiKeyConfig, ApiKeyLocation, ApiKeyRealm, AuthResult, RealmRequest, SessionConfig, SessionRealm,
    TenantConfig, TenantRealm,
};
use crate::http::security::service::{RoleService, TenantService, UserService};
use crate::http::security::{FilterChainRegistry, FilterName, PathRouter, PathRule, User};

/// Public documentation and login endpoints.
pub const ANONYMOUS_PATTERNS: [&str; 6] = [
    "/api/anno/**/*",
    "/doc.html",
    "/v2/api-docs/**/**",
    "/webjars/**/*",
    "/swagger-resources/**/*",
    "/swagger-resources",
];

/// Machine-client API served under its own chain.
pub const OPEN_API_PATTERN: &str = "/openapi/**/*";

const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 5_000;

/// Gateway settings.
///
/// Deserializable so it can be embedded in an application's config file.
/// [`GatewayConfig::from_env`] reads the same fields from the environment.
///
/// # Example
/// ```
/// use auth_gateway_core::http::security::GatewayConfig;
///
/// let config: GatewayConfig = serde_json::from_str(r#"{"api_auth_enabled": true}"#).unwrap();
/// assert!(config.is_api_auth_enabled());
/// assert_eq!(config.get_tenant_header(), "tenant");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    api_auth_enabled: bool,
    lookup_timeout_ms: u64,
    tenant_header: String,
    default_tenant: String,
    api_key_header: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_auth_enabled: false,
            lookup_timeout_ms: DEFAULT_LOOKUP_TIMEOUT_MS,
            tenant_header: "tenant".to_string(),
            default_tenant: "public".to_string(),
            api_key_header: "X-API-Key".to_string(),
        }
    }
}

impl GatewayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads settings from `GATEWAY_*` environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = var("GATEWAY_API_AUTH_ENABLED") {
            match parse_flag(&value) {
                Some(flag) => config.api_auth_enabled = flag,
                None => log::warn!("ignoring GATEWAY_API_AUTH_ENABLED={:?}", value),
            }
        }
        if let Some(value) = var("GATEWAY_LOOKUP_TIMEOUT_MS") {
            match value.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.lookup_timeout_ms = ms,
                _ => log::warn!("ignoring GATEWAY_LOOKUP_TIMEOUT_MS={:?}", value),
            }
        }
        if let Some(value) = var("GATEWAY_TENANT_HEADER").filter(|v| !v.trim().is_empty()) {
            config.tenant_header = value.trim().to_string();
        }
        if let Some(value) = var("GATEWAY_DEFAULT_TENANT").filter(|v| !v.trim().is_empty()) {
            config.default_tenant = value.trim().to_string();
        }
        if let Some(value) = var("GATEWAY_API_KEY_HEADER").filter(|v| !v.trim().is_empty()) {
            config.api_key_header = value.trim().to_string();
        }
        config
    }

    /// Require API keys on the open API.
    pub fn api_auth_enabled(mut self, enabled: bool) -> Self {
        self.api_auth_enabled = enabled;
        self
    }

    /// Upper bound for each external lookup.
    pub fn lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn tenant_header(mut self, name: impl Into<String>) -> Self {
        self.tenant_header = name.into();
        self
    }

    pub fn default_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.default_tenant = tenant.into();
        self
    }

    pub fn api_key_header(mut self, name: impl Into<String>) -> Self {
        self.api_key_header = name.into();
        self
    }

    pub fn is_api_auth_enabled(&self) -> bool {
        self.api_auth_enabled
    }

    pub fn get_lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }

    pub fn get_tenant_header(&self) -> &str {
        &self.tenant_header
    }

    pub fn get_default_tenant(&self) -> &str {
        &self.default_tenant
    }

    pub fn get_api_key_header(&self) -> &str {
        &self.api_key_header
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// External services the realms consult.
#[derive(Clone)]
pub struct Collaborators {
    pub users: Arc<dyn UserService>,
    /// Platform-level grants, valid in every tenant.
    pub platform_roles: Arc<dyn RoleService>,
    /// Grants scoped to one tenant.
    pub tenant_roles: Arc<dyn RoleService>,
    pub tenants: Arc<dyn TenantService>,
}

/// Rule table with the open API protected by `[authAPI, authTenant]`.
pub fn secured_api_rules() -> Vec<PathRule> {
    let mut rules = anonymous_rules();
    rules.push(PathRule::new(
        OPEN_API_PATTERN,
        vec![FilterName::API_KEY, FilterName::TENANT],
    ));
    rules.push(catch_all_rule());
    rules
}

/// Rule table with the open API left public.
pub fn open_api_rules() -> Vec<PathRule> {
    let mut rules = anonymous_rules();
    rules.push(PathRule::anonymous(OPEN_API_PATTERN));
    rules.push(catch_all_rule());
    rules
}

fn anonymous_rules() -> Vec<PathRule> {
    ANONYMOUS_PATTERNS
        .iter()
        .map(|pattern| PathRule::anonymous(pattern))
        .collect()
}

fn catch_all_rule() -> PathRule {
    PathRule::new(CATCH_ALL, vec![FilterName::SESSION, FilterName::TENANT])
}

/// Builds a [`Gateway`] from configuration and collaborators.
///
/// # Example
/// ```ignore
/// let gateway = GatewayAssembler::new(GatewayConfig::from_env(), collaborators)
///     .assemble()?;
/// ```
pub struct GatewayAssembler {
    config: GatewayConfig,
    collaborators: Collaborators,
    verifier: CredentialVerifier,
    session_config: SessionConfig,
}

impl GatewayAssembler {
    pub fn new(config: GatewayConfig, collaborators: Collaborators) -> Self {
        Self {
            config,
            collaborators,
            verifier: CredentialVerifier::default(),
            session_config: SessionConfig::default(),
        }
    }

    /// Replaces the default SHA-256/1024 credential policy.
    pub fn verifier(mut self, verifier: CredentialVerifier) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Registers the filters, builds the rule table and validates both.
    ///
    /// Assembling twice from the same inputs yields equivalent gateways.
    pub fn assemble(&self) -> Result<Gateway, ConfigurationError> {
        let timeout = self.config.get_lookup_timeout();
        let c = &self.collaborators;

        let session_realm = Arc::new(
            SessionRealm::new(c.users.clone(), self.verifier)
                .config(self.session_config.clone())
                .lookup_timeout(timeout),
        );

        let mut registry = FilterChainRegistry::new();
        registry.register(FilterName::SESSION, session_realm.clone())?;
        if self.config.is_api_auth_enabled() {
            let api_key_config = ApiKeyConfig::header(self.config.get_api_key_header())
                .add_location(ApiKeyLocation::authorization("ApiKey"));
            registry.register(
                FilterName::API_KEY,
                Arc::new(
                    ApiKeyRealm::new(c.users.clone())
                        .config(api_key_config)
                        .lookup_timeout(timeout),
                ),
            )?;
        }
        // tenant scoping runs after whichever realm established the principal
        registry.register(
            FilterName::TENANT,
            Arc::new(
                TenantRealm::new(
                    c.tenants.clone(),
                    c.platform_roles.clone(),
                    c.tenant_roles.clone(),
                )
                .config(
                    TenantConfig::new()
                        .header(self.config.get_tenant_header())
                        .default_tenant(self.config.get_default_tenant()),
                )
                .lookup_timeout(timeout),
            ),
        )?;

        let rules = if self.config.is_api_auth_enabled() {
            secured_api_rules()
        } else {
            log::warn!(
                "API authentication is disabled: {} is served without authentication",
                OPEN_API_PATTERN
            );
            open_api_rules()
        };

        let gateway = Gateway::new(registry, PathRouter::new(rules)?)?
            .with_session_realm(session_realm);

        log::info!(
            "gateway assembled with filters {:?} and {} path rules",
            gateway.registry.names(),
            gateway.router.rules().len()
        );
        for rule in gateway.router.rules() {
            log::debug!("path rule {}", rule);
        }
        Ok(gateway)
    }
}

/// Immutable authorization engine shared by all workers.
pub struct Gateway {
    registry: FilterChainRegistry,
    router: PathRouter,
    session_realm: Option<Arc<SessionRealm>>,
    session_config: SessionConfig,
}

impl Gateway {
    /// Combines a registry and a router, checking that every filter name
    /// the rules reference is registered.
    pub fn new(registry: FilterChainRegistry, router: PathRouter) -> Result<Self, ConfigurationError> {
        if let Some(name) = router
            .referenced_filters()
            .find(|name| !registry.contains(name))
        {
            return Err(ConfigurationError::UnresolvedFilter { name: name.clone() });
        }

        Ok(Self {
            registry,
            router,
            session_realm: None,
            session_config: SessionConfig::default(),
        })
    }

    fn with_session_realm(mut self, realm: Arc<SessionRealm>) -> Self {
        self.session_config = realm.get_config().clone();
        self.session_realm = Some(realm);
        self
    }

    /// Decides whether `request` may proceed.
    ///
    /// Returns `Ok(None)` for public paths and the principal established by
    /// the chain otherwise. Filters run in order and the first denial ends
    /// the evaluation.
    pub async fn authorize(&self, request: &RealmRequest) -> Result<Option<User>, AuthFailure> {
        let chain = self.router.route(request.path())?;
        if chain.is_anonymous() {
            log::trace!("{} is public ({})", request.path(), chain.pattern());
            return Ok(None);
        }

        let mut principal: Option<User> = None;
        for name in chain.filters() {
            let Ok(filter) = self.registry.resolve(name) else {
                log::error!("filter '{}' vanished from the registry", name);
                return Err(AuthFailure::ServiceUnavailable);
            };

            match filter.apply(request, principal.as_ref()).await {
                AuthResult::Authenticated(user) => principal = Some(user),
                AuthResult::Rejected(failure) => {
                    log::debug!(
                        "filter '{}' denied {} ({}): {}",
                        name,
                        request.path(),
                        chain.pattern(),
                        failure
                    );
                    return Err(failure);
                }
                AuthResult::Indeterminate => {
                    log::debug!(
                        "filter '{}' could not identify the caller of {}",
                        name,
                        request.path()
                    );
                    return Err(AuthFailure::MissingIdentity);
                }
            }
        }
        Ok(principal)
    }

    pub fn registry(&self) -> &FilterChainRegistry {
        &self.registry
    }

    pub fn router(&self) -> &PathRouter {
        &self.router
    }

    /// Session realm used by login and logout handlers.
    pub fn session_realm(&self) -> Option<&Arc<SessionRealm>> {
        self.session_realm.as_ref()
    }

    /// Session key layout the middleware reads principals with.
    pub fn session_config(&self) -> &SessionConfig {
        &self.session_config
    }
}
