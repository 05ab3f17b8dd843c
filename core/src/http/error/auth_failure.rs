use derive_more::{Display, Error};

/// Reason a single request was denied.
///
/// Failures are recoverable and scoped to one request. They are logged at
/// debug level and then mapped to [`AuthError::Unauthorized`](super::AuthError),
/// never exposed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum AuthFailure {
    /// Password did not match the stored hash.
    #[display("invalid credentials")]
    InvalidCredentials,

    /// No user exists for the presented identity.
    #[display("unknown user")]
    UnknownUser,

    /// The user account is past its due date.
    #[display("account expired")]
    AccountExpired,

    /// The API key is missing or does not resolve to a user.
    #[display("invalid API key")]
    InvalidApiKey,

    /// The principal has no role in the requested tenant, or the tenant does not exist.
    #[display("access to tenant '{tenant}' denied")]
    TenantAccessDenied {
        /// Tenant that was requested.
        tenant: String,
    },

    /// An external lookup failed or timed out.
    #[display("identity service unavailable")]
    ServiceUnavailable,

    /// No path rule matched the request.
    #[display("no rule matches path '{path}'")]
    NoMatchingRule {
        /// Request path that fell through every rule.
        path: String,
    },

    /// A filter needed an identity established earlier in the chain and found none.
    #[display("no authenticated identity")]
    MissingIdentity,
}
