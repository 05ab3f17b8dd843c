//! Error types of the gateway.
//!
//! - [`AuthError`]: the HTTP answer sent to a denied client
//! - [`AuthFailure`]: why a realm or the router denied a request (never sent to the client)
//! - [`ConfigurationError`]: fatal assembly errors

mod auth_error;
mod auth_failure;
mod config_error;

pub use auth_error::AuthError;
pub use auth_failure::AuthFailure;
pub use config_error::ConfigurationError;
