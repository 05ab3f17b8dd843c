//! # Auth Gateway Core
//!
//! Request-authentication gateway for management web services built on
//! Actix Web.
//!
//! A [`Gateway`](http::security::Gateway) is assembled once at startup. It
//! owns a registry of named filters, each backed by a realm (session,
//! API key, tenant), and an ordered table mapping Ant-style path patterns
//! to filter chains. The [`GatewayTransform`](http::security::GatewayTransform)
//! middleware runs the chain selected for every inbound request.
//!
//! ```ignore
//! use std::sync::Arc;
//! use auth_gateway_core::http::security::{
//!     Collaborators, GatewayAssembler, GatewayConfig, GatewayTransform,
//! };
//!
//! let gateway = GatewayAssembler::new(GatewayConfig::from_env(), collaborators)
//!     .assemble()?;
//! let gateway = Arc::new(gateway);
//!
//! App::new()
//!     .wrap(GatewayTransform::new(gateway.clone()))
//!     .wrap(session_middleware)
//! ```

pub mod http;
