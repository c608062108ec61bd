//! Path pattern matching.
//!
//! # Responsibilities
//! - Parse patterns such as `/orders/:id` or `/files/*filepath`
//! - Match request paths segment by segment (case-sensitive)
//! - Bind named segments into path parameters (percent-decoded)
//!
//! # Design Decisions
//! - `:name` binds exactly one non-empty segment
//! - `*name` must be last and binds the rest of the path
//! - Segments are decoded after splitting, so `%2F` stays inside a segment

use std::borrow::Cow;
use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;

use crate::routing::RouteError;

/// Path parameters bound by a match, keyed by segment name.
pub type PathParams = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    CatchAll(String),
}

/// A compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

fn split_segments(path: &str) -> Vec<&str> {
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    }
}

fn decode(segment: &str) -> Cow<'_, str> {
    percent_decode_str(segment).decode_utf8_lossy()
}

impl PathPattern {
    /// Parse a pattern. It must start with `/`.
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        if raw.is_empty() {
            return Err(RouteError::EmptyPath);
        }
        let invalid = |reason| RouteError::InvalidPattern {
            path: raw.to_string(),
            reason,
        };

        let rest = raw.strip_prefix('/').ok_or_else(|| invalid("must start with '/'"))?;
        let parts = split_segments(rest);
        let mut segments = Vec::with_capacity(parts.len());
        let mut names: Vec<&str> = Vec::new();

        for (i, part) in parts.iter().enumerate() {
            let segment = if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(invalid("parameter name must not be empty"));
                }
                if names.contains(&name) {
                    return Err(invalid("parameter name used twice"));
                }
                names.push(name);
                Segment::Param(name.to_string())
            } else if let Some(name) = part.strip_prefix('*') {
                if name.is_empty() {
                    return Err(invalid("catch-all name must not be empty"));
                }
                if i + 1 != parts.len() {
                    return Err(invalid("catch-all must be the last segment"));
                }
                if names.contains(&name) {
                    return Err(invalid("parameter name used twice"));
                }
                names.push(name);
                Segment::CatchAll(name.to_string())
            } else {
                Segment::Static(part.to_string())
            };
            segments.push(segment);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The pattern as written in configuration.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Match a request path, returning the bound parameters.
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let rest = path.strip_prefix('/')?;
        let parts = split_segments(rest);
        let mut params = PathParams::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Static(expected) => {
                    let part = parts.get(i)?;
                    if decode(part) != expected.as_str() {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let part = parts.get(i)?;
                    if part.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), decode(part).into_owned());
                }
                Segment::CatchAll(name) => {
                    if i >= parts.len() {
                        return None;
                    }
                    let remainder = parts[i..]
                        .iter()
                        .map(|p| decode(p))
                        .collect::<Vec<_>>()
                        .join("/");
                    params.insert(name.clone(), remainder);
                    return Some(params);
                }
            }
        }

        if parts.len() == self.segments.len() {
            Some(params)
        } else {
            None
        }
    }

    /// Ranking used when several patterns match the same path.
    /// Higher is more specific.
    pub(crate) fn specificity(&self) -> (usize, bool) {
        let statics = self
            .segments
            .iter()
            .filter(|s| matches!(s, Segment::Static(_)))
            .count();
        let has_catch_all = self
            .segments
            .iter()
            .any(|s| matches!(s, Segment::CatchAll(_)));
        (statics, !has_catch_all)
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
