//! Ant-style path patterns used by the path router.
//!
//! # Pattern Syntax
//!
//! - `**` matches zero or more path segments
//! - `*` alone matches exactly one path segment
//! - `*` inside a segment matches zero or more characters of that segment (`*.html`)
//! - `?` matches exactly one character
//!
//! Matching only looks at the request path; a query string must be
//! stripped before calling [`AntMatcher::matches`].
//!
//! # Examples
//!
//! ```rust
//! use auth_gateway_core::http::security::ant_matcher::AntMatcher;
//!
//! let matcher = AntMatcher::new("/api/anno/**/*");
//! assert!(matcher.matches("/api/anno/login"));
//! assert!(matcher.matches("/api/anno/user/register"));
//! assert!(!matcher.matches("/api/anno"));
//!
//! let matcher = AntMatcher::new("/**");
//! assert!(matcher.matches("/"));
//! assert!(matcher.matches("/console/groups"));
//! ```

use std::fmt;

/// The catch-all pattern that must close every rule table.
pub const CATCH_ALL: &str = "/**";

/// Compiled Ant-style pattern.
#[derive(Debug, Clone)]
pub struct AntMatcher {
    pattern: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    /// `*`
    AnySegment,
    /// `**`
    AnyPath,
    /// Segment containing `*` or `?` mixed with literal text.
    Wildcard(Vec<char>),
}

impl AntMatcher {
    /// Compiles `pattern`.
    ///
    /// Leading, trailing and repeated slashes are ignored, so `/api/`
    /// and `/api` compile to the same matcher.
    pub fn new(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .map(|part| match part {
                "**" => Segment::AnyPath,
                "*" => Segment::AnySegment,
                p if p.contains('*') || p.contains('?') => Segment::Wildcard(p.chars().collect()),
                p => Segment::Literal(p.to_string()),
            })
            .collect();

        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Returns the source pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// True when the pattern matches every path.
    pub fn is_catch_all(&self) -> bool {
        !self.segments.is_empty() && self.segments.iter().all(|s| *s == Segment::AnyPath)
    }

    /// Checks whether `path` matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        let path_segments: Vec<&str> = split_path(path).collect();
        match_segments(&self.segments, &path_segments)
    }
}

impl PartialEq for AntMatcher {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl Eq for AntMatcher {}

impl fmt::Display for AntMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    let Some((head, rest)) = pattern.split_first() else {
        return path.is_empty();
    };

    match head {
        // try consuming 0, 1, 2, ... path segments
        Segment::AnyPath => (0..=path.len()).any(|skip| match_segments(rest, &path[skip..])),
        Segment::AnySegment => !path.is_empty() && match_segments(rest, &path[1..]),
        Segment::Literal(literal) => path
            .first()
            .is_some_and(|segment| *segment == literal.as_str() && match_segments(rest, &path[1..])),
        Segment::Wildcard(chars) => path.first().is_some_and(|segment| {
            let text: Vec<char> = segment.chars().collect();
            match_chars(chars, &text) && match_segments(rest, &path[1..])
        }),
    }
}

fn match_chars(pattern: &[char], text: &[char]) -> bool {
    let Some((head, rest)) = pattern.split_first() else {
        return text.is_empty();
    };

    match head {
        '*' => (0..=text.len()).any(|skip| match_chars(rest, &text[skip..])),
        '?' => !text.is_empty() && match_chars(rest, &text[1..]),
        c => text.first() == Some(c) && match_chars(rest, &text[1..]),
    }
}
