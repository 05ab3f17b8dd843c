//! Principal model shared by realms, the middleware and handlers.

use std::fmt;
use std::time::SystemTime;

/// An identity known to the user service, or the principal established
/// for a request.
///
/// # Example
/// ```
/// use auth_gateway_core::http::security::User;
///
/// let user = User::with_encoded_password("admin", "5e88...".to_string())
///     .roles(&["ADMIN".into()]);
///
/// assert!(user.has_role("ADMIN"));
/// assert!(user.get_tenant().is_none());
/// ```
#[derive(Clone, PartialEq)]
pub struct User {
    username: String,
    password: String,
    roles: Vec<String>,
    authorities: Vec<String>,
    expires_at: Option<SystemTime>,
    tenant: Option<String>,
}

impl User {
    /// Creates a user without a password (API clients, session principals).
    pub fn new(username: impl Into<String>) -> Self {
        Self::with_encoded_password(username, String::new())
    }

    /// Creates a user with a pre-encoded password hash.
    pub fn with_encoded_password(username: impl Into<String>, encoded_password: String) -> Self {
        User {
            username: username.into(),
            password: encoded_password,
            roles: Vec::new(),
            authorities: Vec::new(),
            expires_at: None,
            tenant: None,
        }
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }

    /// Returns the encoded password (empty for principals).
    pub fn get_password(&self) -> &str {
        &self.password
    }

    pub fn get_roles(&self) -> &[String] {
        &self.roles
    }

    pub fn get_authorities(&self) -> &[String] {
        &self.authorities
    }

    /// Tenant the request was scoped to, set by the tenant realm.
    pub fn get_tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    pub fn get_expires_at(&self) -> Option<SystemTime> {
        self.expires_at
    }

    /// Adds roles to the user (builder pattern).
    pub fn roles(mut self, roles: &[String]) -> Self {
        for role in roles {
            if !self.roles.contains(role) {
                self.roles.push(role.clone());
            }
        }
        self
    }

    /// Adds authorities to the user (builder pattern).
    pub fn authorities(mut self, authorities: &[String]) -> Self {
        for authority in authorities {
            if !self.authorities.contains(authority) {
                self.authorities.push(authority.clone());
            }
        }
        self
    }

    /// Sets the account due date.
    pub fn expires_at(mut self, at: SystemTime) -> Self {
        self.expires_at = Some(at);
        self
    }

    /// Returns a copy of this principal scoped to `tenant`.
    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Drops the password hash, leaving only what a principal needs.
    pub fn into_principal(mut self) -> Self {
        self.password.clear();
        self
    }

    /// True once the account's due date has passed.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= SystemTime::now())
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let password = if self.password.is_empty() { "" } else { "[redacted]" };
        f.debug_struct("User")
            .field("username", &self.username)
            .field("password", &password)
            .field("roles", &self.roles)
            .field("authorities", &self.authorities)
            .field("expires_at", &self.expires_at)
            .field("tenant", &self.tenant)
            .finish()
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "User {{ username: {}, roles: {:?}, tenant: {:?} }}",
            self.username, self.roles, self.tenant
        )
    }
}
