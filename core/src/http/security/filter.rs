//! Named authentication filters and the registry the router refers to.
//!
//! Path rules name filters instead of holding them, so the registry is
//! filled once at assembly time and every rule reference is checked
//! against it before the gateway serves a request.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::http::error::ConfigurationError;
use crate::http::security::realm::{AuthResult, Realm, RealmRequest};
use crate::http::security::User;

/// Symbolic filter name used by path rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterName(Cow<'static, str>);

impl FilterName {
    /// Session authentication for interactive users.
    pub const SESSION: FilterName = FilterName(Cow::Borrowed("authWeb"));
    /// API key authentication for machine clients.
    pub const API_KEY: FilterName = FilterName(Cow::Borrowed("authAPI"));
    /// Tenant scoping of an established principal.
    pub const TENANT: FilterName = FilterName(Cow::Borrowed("authTenant"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for FilterName {
    fn from(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }
}

impl From<String> for FilterName {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

/// A registered filter: one realm behind a name.
#[derive(Clone)]
pub struct AuthFilter {
    name: FilterName,
    realm: Arc<dyn Realm>,
}

impl AuthFilter {
    pub fn new(name: FilterName, realm: Arc<dyn Realm>) -> Self {
        Self { name, realm }
    }

    pub fn name(&self) -> &FilterName {
        &self.name
    }

    /// Runs the realm against `request`.
    ///
    /// A realm whose signal is absent still decides: it may reject with a
    /// specific failure or answer [`AuthResult::Indeterminate`].
    pub async fn apply(&self, request: &RealmRequest, principal: Option<&User>) -> AuthResult {
        if !self.realm.supports(request) {
            log::trace!(
                "filter '{}' ({}) found no signal on {}",
                self.name,
                self.realm.name(),
                request.path()
            );
        }
        self.realm.authenticate(request, principal).await
    }
}

impl fmt::Debug for AuthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthFilter")
            .field("name", &self.name)
            .field("realm", &self.realm.name())
            .finish()
    }
}

/// Name to filter mapping. Immutable once the gateway is built.
///
/// # Example
/// ```ignore
/// let mut registry = FilterChainRegistry::new();
/// registry.register(FilterName::SESSION, Arc::new(session_realm))?;
/// registry.register(FilterName::TENANT, Arc::new(tenant_realm))?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterChainRegistry {
    filters: HashMap<FilterName, AuthFilter>,
    /// Registration order, for logs.
    order: Vec<FilterName>,
}

impl FilterChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `realm` under `name`. Names are unique.
    pub fn register(
        &mut self,
        name: FilterName,
        realm: Arc<dyn Realm>,
    ) -> Result<(), ConfigurationError> {
        if self.filters.contains_key(&name) {
            return Err(ConfigurationError::DuplicateFilter { name });
        }
        self.order.push(name.clone());
        self.filters
            .insert(name.clone(), AuthFilter::new(name, realm));
        Ok(())
    }

    pub fn resolve(&self, name: &FilterName) -> Result<&AuthFilter, ConfigurationError> {
        self.filters
            .get(name)
            .ok_or_else(|| ConfigurationError::UnresolvedFilter { name: name.clone() })
    }

    pub fn contains(&self, name: &FilterName) -> bool {
        self.filters.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> &[FilterName] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
