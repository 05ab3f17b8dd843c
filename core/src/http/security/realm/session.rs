//! Session realm: interactive users authenticated by an earlier login.
//!
//! # Flow
//! 1. The login handler calls [`SessionRealm::login`] with the submitted
//!    username and password. The password is checked with the realm's
//!    [`PasswordEncoder`], the session id is rotated and the principal is
//!    stored in the session. Unknown usernames pay the same hashing cost as
//!    known ones.
//! 2. On every later request the middleware reads the stored principal into
//!    the [`RealmRequest`] and the realm re-resolves it, so removed or expired
//!    accounts lose access without waiting for the session to end.
//!
//! # Example
//! ```rust,ignore
//! async fn login(
//!     session: Session,
//!     form: web::Json<LoginForm>,
//!     realm: web::Data<SessionRealm>,
//! ) -> Result<HttpResponse, SessionError> {
//!     let user = realm.login(&session, &form.username, &form.password).await?;
//!     Ok(HttpResponse::Ok().json(user.get_username()))
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use actix_session::Session;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use async_trait::async_trait;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

use super::{lookup, AuthResult, Realm, RealmRequest};
use crate::http::error::{AuthError, AuthFailure};
use crate::http::security::crypto::PasswordEncoder;
use crate::http::security::service::{CredentialId, UserService};
use crate::http::security::User;

/// Session id handling at login.
///
/// A session id fixed by an attacker before login must not survive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionFixationStrategy {
    /// Issue a new session id and keep existing attributes.
    #[default]
    MigrateSession,
    /// Issue a new session id and drop existing attributes.
    NewSession,
    /// Keep the session id. Only meant for tests.
    None,
}

/// Principal data stored in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub username: String,
    pub roles: Vec<String>,
    pub authorities: Vec<String>,
}

impl SessionUser {
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.get_username().to_string(),
            roles: user.get_roles().to_vec(),
            authorities: user.get_authorities().to_vec(),
        }
    }

    pub fn to_user(&self) -> User {
        User::new(self.username.clone())
            .roles(&self.roles)
            .authorities(&self.authorities)
    }
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self::from_user(user)
    }
}

/// Session realm configuration.
///
/// # Example
/// ```
/// use auth_gateway_core::http::security::realm::{SessionConfig, SessionFixationStrategy};
///
/// let config = SessionConfig::new()
///     .user_key("principal")
///     .fixation_strategy(SessionFixationStrategy::NewSession);
/// assert_eq!(config.get_user_key(), "principal");
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    user_key: String,
    fixation_strategy: SessionFixationStrategy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self {
            user_key: "gateway_user".to_string(),
            fixation_strategy: SessionFixationStrategy::MigrateSession,
        }
    }

    /// Set the session key the principal is stored under.
    pub fn user_key(mut self, key: &str) -> Self {
        self.user_key = key.to_string();
        self
    }

    pub fn fixation_strategy(mut self, strategy: SessionFixationStrategy) -> Self {
        self.fixation_strategy = strategy;
        self
    }

    pub fn get_user_key(&self) -> &str {
        &self.user_key
    }

    pub fn get_fixation_strategy(&self) -> SessionFixationStrategy {
        self.fixation_strategy
    }
}

/// Login failure.
#[derive(Debug, Display, Error)]
pub enum SessionError {
    /// Credentials were refused.
    #[display("login rejected: {failure}")]
    Rejected {
        failure: AuthFailure,
    },

    /// The principal could not be written to the session.
    #[display("session insert error: {reason}")]
    InsertError { reason: String },
}

impl SessionError {
    /// The underlying rejection, if credentials were refused.
    pub fn failure(&self) -> Option<&AuthFailure> {
        match self {
            SessionError::Rejected { failure } => Some(failure),
            SessionError::InsertError { .. } => None,
        }
    }
}

impl From<AuthFailure> for SessionError {
    fn from(failure: AuthFailure) -> Self {
        SessionError::Rejected { failure }
    }
}

impl ResponseError for SessionError {
    fn status_code(&self) -> StatusCode {
        match self {
            SessionError::Rejected { .. } => StatusCode::UNAUTHORIZED,
            SessionError::InsertError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            // same body as every other denial
            SessionError::Rejected { .. } => AuthError::Unauthorized.error_response(),
            SessionError::InsertError { .. } => HttpResponse::build(self.status_code()).finish(),
        }
    }
}

/// Realm backed by the HTTP session.
#[derive(Clone)]
pub struct SessionRealm {
    users: Arc<dyn UserService>,
    encoder: Arc<dyn PasswordEncoder>,
    // checked when the username is unknown
    dummy_hash: String,
    config: SessionConfig,
    lookup_timeout: Duration,
}

impl SessionRealm {
    pub fn new(users: Arc<dyn UserService>, encoder: impl PasswordEncoder + 'static) -> Self {
        let dummy_hash = encoder.encode("");
        Self {
            users,
            encoder: Arc::new(encoder),
            dummy_hash,
            config: SessionConfig::default(),
            lookup_timeout: Duration::from_secs(5),
        }
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Upper bound for each user lookup.
    pub fn lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn get_config(&self) -> &SessionConfig {
        &self.config
    }

    /// Checks `username`/`password` and stores the principal in `session`.
    ///
    /// The session is only touched when the credentials are accepted.
    pub async fn login(
        &self,
        session: &Session,
        username: &str,
        password: &str,
    ) -> Result<User, SessionError> {
        let user = self.check_credentials(username, password).await?;

        self.apply_fixation_protection(session);
        session
            .insert(self.config.get_user_key(), SessionUser::from_user(&user))
            .map_err(|e| SessionError::InsertError {
                reason: e.to_string(),
            })?;

        log::debug!("user '{}' logged in", user.get_username());
        Ok(user)
    }

    /// Removes the principal from `session`.
    pub fn logout(&self, session: &Session) {
        session.remove(self.config.get_user_key());
    }

    /// Verifies credentials without touching any session.
    pub async fn check_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<User, AuthFailure> {
        let found = lookup(
            self.lookup_timeout,
            self.users.find_by_credentials(CredentialId::Username(username)),
        )
        .await?;

        let Some(user) = found else {
            self.encoder.matches(password, &self.dummy_hash);
            return Err(AuthFailure::UnknownUser);
        };

        if !self.encoder.matches(password, user.get_password()) {
            return Err(AuthFailure::InvalidCredentials);
        }
        if user.is_expired() {
            return Err(AuthFailure::AccountExpired);
        }
        Ok(user.into_principal())
    }

    fn apply_fixation_protection(&self, session: &Session) {
        match self.config.get_fixation_strategy() {
            SessionFixationStrategy::MigrateSession => session.renew(),
            // purge() would also block the insert that follows
            SessionFixationStrategy::NewSession => {
                session.clear();
                session.renew();
            }
            SessionFixationStrategy::None => {}
        }
    }
}

#[async_trait]
impl Realm for SessionRealm {
    fn name(&self) -> &str {
        "session"
    }

    fn supports(&self, request: &RealmRequest) -> bool {
        request.session_user().is_some()
    }

    async fn authenticate(&self, request: &RealmRequest, _principal: Option<&User>) -> AuthResult {
        let Some(session_user) = request.session_user() else {
            return AuthResult::Indeterminate;
        };

        let found = lookup(
            self.lookup_timeout,
            self.users
                .find_by_credentials(CredentialId::Username(&session_user.username)),
        )
        .await;

        match found {
            Ok(Some(user)) if user.is_expired() => AuthResult::Rejected(AuthFailure::AccountExpired),
            Ok(Some(user)) => AuthResult::Authenticated(user.into_principal()),
            Ok(None) => AuthResult::Rejected(AuthFailure::UnknownUser),
            Err(failure) => AuthResult::Rejected(failure),
        }
    }
}
