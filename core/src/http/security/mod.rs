//! Authentication gateway: realms, filter chains and path routing.
//!
//! # Module Structure
//!
//! - `ant_matcher` - Ant-style path patterns
//! - `crypto` - Iterated-hash credential verification
//! - `extractor` - Actix Web extractors (AuthenticatedUser, OptionalUser)
//! - `filter` - Filter names and the filter chain registry
//! - `gateway` - Configuration, assembly and per-request authorization
//! - `middleware` - Gateway middleware (GatewayTransform)
//! - `realm` - Session, API key and tenant realms
//! - `router` - Ordered path rules
//! - `service` - User, role and tenant collaborator traits
//! - `user` - User model

// Re-exports for convenience
pub use crypto::{CredentialVerifier, HashAlgorithm, PasswordEncoder};
pub use extractor::{AuthenticatedUser, OptionalUser};
pub use filter::{AuthFilter, FilterChainRegistry, FilterName};
pub use gateway::{Collaborators, Gateway, GatewayAssembler, GatewayConfig};
pub use middleware::GatewayTransform;
pub use realm::{AuthResult, Realm, RealmRequest};
pub use router::{PathRouter, PathRule, ResolvedChain};
pub use user::User;

pub mod ant_matcher;
pub mod crypto;
pub mod extractor;
pub mod filter;
pub mod gateway;
pub mod middleware;
pub mod realm;
pub mod router;
pub mod service;
pub mod user;
