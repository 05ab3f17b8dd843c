use derive_more::{Display, Error};

use crate::http::security::FilterName;

/// Fatal gateway assembly error.
///
/// A gateway that fails to assemble must not serve requests.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ConfigurationError {
    /// A rule references a filter name that was never registered.
    #[display("filter '{name}' referenced by a path rule is not registered")]
    UnresolvedFilter {
        /// The missing filter name.
        name: FilterName,
    },

    /// Two filters were registered under the same name.
    #[display("filter '{name}' is already registered")]
    DuplicateFilter {
        /// The duplicated filter name.
        name: FilterName,
    },

    /// Two rules share the same pattern.
    #[display("path pattern '{pattern}' is defined twice")]
    DuplicatePattern {
        /// The duplicated pattern.
        pattern: String,
    },

    /// The rule table does not end with the `/**` catch-all.
    #[display("the last path rule must be the catch-all '/**'")]
    MissingCatchAll,

    /// A credential verifier was configured with zero hash iterations.
    #[display("hash iterations must be positive")]
    InvalidIterations,
}
