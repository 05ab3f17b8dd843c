//! Ordered path rules mapping request paths to filter chains.
//!
//! Rules are evaluated top to bottom and the first match wins. The table is
//! validated when the router is built: patterns are unique and the catch-all
//! `/**` closes the table, so every path resolves to exactly one chain.
//!
//! # Example
//! ```
//! use auth_gateway_core::http::security::{FilterName, PathRouter, PathRule};
//!
//! let router = PathRouter::new(vec![
//!     PathRule::anonymous("/api/anno/**/*"),
//!     PathRule::new("/**", vec![FilterName::SESSION, FilterName::TENANT]),
//! ])
//! .unwrap();
//!
//! assert!(router.route("/api/anno/login").unwrap().is_anonymous());
//! assert_eq!(router.route("/console").unwrap().filters().len(), 2);
//! ```

use std::collections::HashSet;
use std::fmt;

use crate::http::error::{AuthFailure, ConfigurationError};
use crate::http::security::ant_matcher::AntMatcher;
use crate::http::security::FilterName;

/// One entry of the rule table: a pattern and the filters it requires.
///
/// An empty filter list means the path is public.
#[derive(Debug, Clone)]
pub struct PathRule {
    matcher: AntMatcher,
    filters: Vec<FilterName>,
}

impl PathRule {
    pub fn new(pattern: &str, filters: Vec<FilterName>) -> Self {
        Self {
            matcher: AntMatcher::new(pattern),
            filters,
        }
    }

    /// A rule that lets matching requests through without authentication.
    pub fn anonymous(pattern: &str) -> Self {
        Self::new(pattern, Vec::new())
    }

    pub fn pattern(&self) -> &str {
        self.matcher.pattern()
    }

    pub fn filters(&self) -> &[FilterName] {
        &self.filters
    }

    pub fn is_anonymous(&self) -> bool {
        self.filters.is_empty()
    }

    fn matches(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }
}

impl fmt::Display for PathRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_anonymous() {
            return write!(f, "{} => anon", self.pattern());
        }
        let names: Vec<&str> = self.filters.iter().map(FilterName::as_str).collect();
        write!(f, "{} => [{}]", self.pattern(), names.join(", "))
    }
}

/// Chain selected for a request path.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedChain<'a> {
    rule: &'a PathRule,
}

impl<'a> ResolvedChain<'a> {
    /// Pattern of the rule that matched.
    pub fn pattern(&self) -> &'a str {
        self.rule.pattern()
    }

    /// Filters to run, in order.
    pub fn filters(&self) -> &'a [FilterName] {
        self.rule.filters()
    }

    pub fn is_anonymous(&self) -> bool {
        self.rule.is_anonymous()
    }
}

/// Validated, immutable rule table.
#[derive(Debug, Clone)]
pub struct PathRouter {
    rules: Vec<PathRule>,
}

impl PathRouter {
    /// Builds a router from rules in priority order.
    pub fn new(rules: Vec<PathRule>) -> Result<Self, ConfigurationError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.pattern()) {
                return Err(ConfigurationError::DuplicatePattern {
                    pattern: rule.pattern().to_string(),
                });
            }
        }

        match rules.last() {
            Some(last) if last.matcher.is_catch_all() => {}
            _ => return Err(ConfigurationError::MissingCatchAll),
        }

        // a catch-all earlier in the table would shadow everything after it
        if let Some(shadowing) = rules[..rules.len() - 1]
            .iter()
            .find(|rule| rule.matcher.is_catch_all())
        {
            return Err(ConfigurationError::DuplicatePattern {
                pattern: shadowing.pattern().to_string(),
            });
        }

        Ok(Self { rules })
    }

    /// Returns the chain of the first rule matching `path`.
    ///
    /// A query string, if present, is ignored.
    pub fn route(&self, path: &str) -> Result<ResolvedChain<'_>, AuthFailure> {
        let path = path.split_once('?').map_or(path, |(path, _)| path);
        self.rules
            .iter()
            .find(|rule| rule.matches(path))
            .map(|rule| ResolvedChain { rule })
            .ok_or_else(|| AuthFailure::NoMatchingRule {
                path: path.to_string(),
            })
    }

    pub fn rules(&self) -> &[PathRule] {
        &self.rules
    }

    /// Every filter name referenced by at least one rule.
    pub fn referenced_filters(&self) -> impl Iterator<Item = &FilterName> {
        self.rules.iter().flat_map(|rule| rule.filters.iter())
    }
}
