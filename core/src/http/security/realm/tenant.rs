//! Tenant realm: scopes an established principal to the requested tenant.
//!
//! The tenant key comes from a request header and falls back to a default
//! tenant. Access is granted when either the platform-level or the
//! tenant-level role service admits the principal.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{lookup, AuthResult, Realm, RealmRequest};
use crate::http::error::AuthFailure;
use crate::http::security::service::{RoleService, TenantService};
use crate::http::security::User;

/// Where the tenant key is read from.
#[derive(Debug, Clone)]
pub struct TenantConfig {
    header: String,
    default_tenant: String,
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self {
            header: "tenant".to_string(),
            default_tenant: "public".to_string(),
        }
    }
}

impl TenantConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>) -> Self {
        self.header = name.into();
        self
    }

    /// Tenant used when the request names none.
    pub fn default_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.default_tenant = tenant.into();
        self
    }

    pub fn get_header(&self) -> &str {
        &self.header
    }

    pub fn get_default_tenant(&self) -> &str {
        &self.default_tenant
    }
}

/// Realm checking tenant membership of the principal established earlier
/// in the chain.
///
/// It never authenticates on its own: without a principal it returns
/// [`AuthFailure::MissingIdentity`].
#[derive(Clone)]
pub struct TenantRealm {
    tenants: Arc<dyn TenantService>,
    platform_roles: Arc<dyn RoleService>,
    tenant_roles: Arc<dyn RoleService>,
    config: TenantConfig,
    lookup_timeout: Duration,
}

impl TenantRealm {
    pub fn new(
        tenants: Arc<dyn TenantService>,
        platform_roles: Arc<dyn RoleService>,
        tenant_roles: Arc<dyn RoleService>,
    ) -> Self {
        Self {
            tenants,
            platform_roles,
            tenant_roles,
            config: TenantConfig::default(),
            lookup_timeout: Duration::from_secs(5),
        }
    }

    pub fn config(mut self, config: TenantConfig) -> Self {
        self.config = config;
        self
    }

    pub fn lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    fn tenant_key<'r>(&'r self, request: &'r RealmRequest) -> &'r str {
        request
            .header(self.config.get_header())
            .map(str::trim)
            .filter(|tenant| !tenant.is_empty())
            .unwrap_or(self.config.get_default_tenant())
    }

    async fn check(&self, principal: &User, tenant_key: &str) -> Result<User, AuthFailure> {
        let denied = || AuthFailure::TenantAccessDenied {
            tenant: tenant_key.to_string(),
        };

        let tenant = lookup(self.lookup_timeout, self.tenants.resolve(tenant_key))
            .await?
            .ok_or_else(denied)?;

        let platform = lookup(
            self.lookup_timeout,
            self.platform_roles.has_access(principal, &tenant),
        )
        .await?;
        let allowed = platform
            || lookup(
                self.lookup_timeout,
                self.tenant_roles.has_access(principal, &tenant),
            )
            .await?;

        if !allowed {
            return Err(denied());
        }
        Ok(principal.clone().with_tenant(tenant.get_name()))
    }
}

#[async_trait]
impl Realm for TenantRealm {
    fn name(&self) -> &str {
        "tenant"
    }

    fn supports(&self, _request: &RealmRequest) -> bool {
        true
    }

    async fn authenticate(&self, request: &RealmRequest, principal: Option<&User>) -> AuthResult {
        let Some(principal) = principal else {
            return AuthResult::Rejected(AuthFailure::MissingIdentity);
        };

        match self.check(principal, self.tenant_key(request)).await {
            Ok(user) => AuthResult::Authenticated(user),
            Err(failure) => AuthResult::Rejected(failure),
        }
    }
}
