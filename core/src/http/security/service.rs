//! Collaborator services consumed by the realms.
//!
//! User, role and tenant storage live outside the gateway. Realms only see
//! the narrow async traits below. In-memory implementations are provided for
//! tests and demos.
//!
//! # Example
//! ```rust,ignore
//! use auth_gateway_core::http::security::service::{UserService, CredentialId, LookupError};
//! use async_trait::async_trait;
//!
//! struct DatabaseUserService {
//!     pool: sqlx::PgPool,
//! }
//!
//! #[async_trait]
//! impl UserService for DatabaseUserService {
//!     async fn find_by_credentials(&self, id: CredentialId<'_>) -> Result<Option<User>, LookupError> {
//!         // query by username or by API key digest
//!     }
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use derive_more::{Display, Error};
use tokio::sync::RwLock;

use crate::http::security::User;

/// Grant that covers every tenant in [`InMemoryRoleService`].
pub const ALL_TENANTS: &str = "*";

/// Failure of an external lookup.
///
/// Realms turn every lookup error into a rejection.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum LookupError {
    /// The backing store could not be reached.
    #[display("service unavailable: {reason}")]
    Unavailable {
        /// Backend-specific detail.
        reason: String,
    },

    /// The lookup did not complete within the configured timeout.
    #[display("lookup timed out")]
    Timeout,
}

/// Identifier a user is looked up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialId<'a> {
    /// Login name (session login, session principal refresh).
    Username(&'a str),
    /// API key presented by a machine client.
    ApiKey(&'a str),
}

/// Tenant known to the tenant service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
    name: String,
    description: Option<String>,
}

impl Tenant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Resolves users by login name or API key.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Returns `Ok(None)` when no user matches.
    async fn find_by_credentials(&self, id: CredentialId<'_>) -> Result<Option<User>, LookupError>;
}

/// Decides whether a principal may act inside a tenant.
///
/// The gateway holds two instances: a platform-level one (administrators
/// valid in every tenant) and a tenant-level one.
#[async_trait]
pub trait RoleService: Send + Sync {
    async fn has_access(&self, principal: &User, tenant: &Tenant) -> Result<bool, LookupError>;
}

/// Resolves tenant keys.
#[async_trait]
pub trait TenantService: Send + Sync {
    /// Returns `Ok(None)` when the tenant does not exist.
    async fn resolve(&self, tenant_key: &str) -> Result<Option<Tenant>, LookupError>;
}

// =============================================================================
// In-Memory Implementations
// =============================================================================

/// In-memory [`UserService`].
#[derive(Clone, Default)]
pub struct InMemoryUserService {
    users: Arc<RwLock<HashMap<String, User>>>,
    api_keys: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryUserService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user.
    pub async fn add_user(&self, user: User) {
        let mut users = self.users.write().await;
        users.insert(user.get_username().to_string(), user);
    }

    /// Binds an API key to an existing username.
    pub async fn add_api_key(&self, key: impl Into<String>, username: impl Into<String>) {
        let mut keys = self.api_keys.write().await;
        keys.insert(key.into(), username.into());
    }

    pub async fn remove_user(&self, username: &str) -> Option<User> {
        let mut users = self.users.write().await;
        users.remove(username)
    }
}

#[async_trait]
impl UserService for InMemoryUserService {
    async fn find_by_credentials(&self, id: CredentialId<'_>) -> Result<Option<User>, LookupError> {
        let username = match id {
            CredentialId::Username(name) => name.to_string(),
            CredentialId::ApiKey(key) => match self.api_keys.read().await.get(key) {
                Some(name) => name.clone(),
                None => return Ok(None),
            },
        };
        let users = self.users.read().await;
        Ok(users.get(&username).cloned())
    }
}

/// In-memory [`RoleService`] keyed by username.
///
/// A grant on [`ALL_TENANTS`] admits the user into every tenant.
#[derive(Clone, Default)]
pub struct InMemoryRoleService {
    grants: Arc<RwLock<HashMap<String, HashSet<String>>>>,
}

impl InMemoryRoleService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grants `username` access to `tenant`.
    pub async fn grant(&self, username: impl Into<String>, tenant: impl Into<String>) {
        let mut grants = self.grants.write().await;
        grants
            .entry(username.into())
            .or_default()
            .insert(tenant.into());
    }

    /// Grants `username` access to every tenant.
    pub async fn grant_all(&self, username: impl Into<String>) {
        self.grant(username, ALL_TENANTS).await;
    }

    pub async fn revoke(&self, username: &str, tenant: &str) {
        let mut grants = self.grants.write().await;
        if let Some(tenants) = grants.get_mut(username) {
            tenants.remove(tenant);
        }
    }
}

#[async_trait]
impl RoleService for InMemoryRoleService {
    async fn has_access(&self, principal: &User, tenant: &Tenant) -> Result<bool, LookupError> {
        let grants = self.grants.read().await;
        Ok(grants
            .get(principal.get_username())
            .is_some_and(|tenants| {
                tenants.contains(ALL_TENANTS) || tenants.contains(tenant.get_name())
            }))
    }
}

/// In-memory [`TenantService`].
#[derive(Clone, Default)]
pub struct InMemoryTenantService {
    tenants: Arc<RwLock<HashMap<String, Tenant>>>,
}

impl InMemoryTenantService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_tenant(&self, tenant: Tenant) {
        let mut tenants = self.tenants.write().await;
        tenants.insert(tenant.get_name().to_string(), tenant);
    }
}

#[async_trait]
impl TenantService for InMemoryTenantService {
    async fn resolve(&self, tenant_key: &str) -> Result<Option<Tenant>, LookupError> {
        let tenants = self.tenants.read().await;
        Ok(tenants.get(tenant_key).cloned())
    }
}
