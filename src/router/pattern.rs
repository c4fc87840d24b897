//! Route pattern compilation and canonical path segmentation.
//!
//! Registered patterns and incoming resource paths go through the same
//! [`split_segments`] so that `"/"`, `""` and `"//"` all denote the root and a
//! trailing slash never changes which route matches.
//!
//! Pattern syntax, per segment:
//!
//! - literal: `users`
//! - parameter: `:id` or `{id}` (matches exactly one non-empty segment)
//! - wildcard: `*` or `*rest` (trailing only, matches one or more segments)
//!
//! A `?` is not allowed in a registered pattern; query strings are only
//! stripped from incoming paths.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use super::matcher::ParamVec;

/// Name bound by a bare `*` wildcard.
pub const WILDCARD_PARAM: &str = "*";

static PARAM_NAME: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("parameter name regex is valid")
});

/// Why a route pattern was rejected at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("wildcard segment '{segment}' in pattern '{pattern}' must be the last segment")]
    WildcardNotTrailing { pattern: String, segment: String },
    #[error("empty parameter name in pattern '{pattern}'")]
    EmptyParamName { pattern: String },
    #[error("invalid parameter name '{name}' in pattern '{pattern}'")]
    InvalidParamName { pattern: String, name: String },
    #[error("parameter '{name}' bound twice in pattern '{pattern}'")]
    DuplicateParam { pattern: String, name: String },
    #[error("query string not allowed in pattern '{pattern}'")]
    QueryInPattern { pattern: String },
}

/// Split a path on `/`, dropping every empty segment.
///
/// Any query string is cut off first; the matcher never sees it.
#[must_use]
pub fn split_segments(path: &str) -> Vec<&str> {
    let path = path.split_once('?').map_or(path, |(p, _)| p);
    raw_segments(path)
}

fn raw_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn pattern_segments<'p>(display: &str, pattern: &'p str) -> Result<Vec<&'p str>, PatternError> {
    if pattern.contains('?') {
        return Err(PatternError::QueryInPattern {
            pattern: display.to_string(),
        });
    }
    Ok(raw_segments(pattern))
}

/// One compiled segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(Box<str>),
    Param(Arc<str>),
    Wildcard(Arc<str>),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(s) => f.write_str(s),
            Segment::Param(name) => write!(f, ":{name}"),
            Segment::Wildcard(name) if &**name == WILDCARD_PARAM => f.write_str("*"),
            Segment::Wildcard(name) => write!(f, "*{name}"),
        }
    }
}

/// A compiled route pattern: the resource base path joined with a route's sub-path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Compile the concatenation of `base` and `sub_path`.
    pub fn join(base: &str, sub_path: &str) -> Result<Self, PatternError> {
        let display = format!("{}/{}", base.trim_end_matches('/'), sub_path.trim_start_matches('/'));
        let mut raw = pattern_segments(&display, base)?;
        raw.extend(pattern_segments(&display, sub_path)?);
        Self::compile(&display, &raw)
    }

    /// Compile a single pattern string.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        Self::compile(pattern, &pattern_segments(pattern, pattern)?)
    }

    fn compile(pattern: &str, raw: &[&str]) -> Result<Self, PatternError> {
        let mut segments = Vec::with_capacity(raw.len());
        for (idx, seg) in raw.iter().enumerate() {
            let compiled = if let Some(rest) = seg.strip_prefix('*') {
                if idx + 1 != raw.len() {
                    return Err(PatternError::WildcardNotTrailing {
                        pattern: pattern.to_string(),
                        segment: (*seg).to_string(),
                    });
                }
                let name = if rest.is_empty() { WILDCARD_PARAM } else { rest };
                if name != WILDCARD_PARAM {
                    validate_name(pattern, name)?;
                }
                Segment::Wildcard(Arc::from(name))
            } else if let Some(name) = seg.strip_prefix(':') {
                validate_name(pattern, name)?;
                Segment::Param(Arc::from(name))
            } else if seg.starts_with('{') && seg.ends_with('}') && seg.len() >= 2 {
                let name = &seg[1..seg.len() - 1];
                validate_name(pattern, name)?;
                Segment::Param(Arc::from(name))
            } else {
                Segment::Literal(Box::from(*seg))
            };

            if let Segment::Param(name) | Segment::Wildcard(name) = &compiled {
                let seen = segments.iter().any(|s: &Segment| {
                    matches!(s, Segment::Param(n) | Segment::Wildcard(n) if n == name)
                });
                if seen {
                    return Err(PatternError::DuplicateParam {
                        pattern: pattern.to_string(),
                        name: name.to_string(),
                    });
                }
            }
            segments.push(compiled);
        }
        Ok(Self { segments })
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Match already-split request segments, appending bound values to `params`.
    ///
    /// On a failed match `params` is left as it was.
    pub fn matches(&self, request: &[&str], params: &mut ParamVec) -> bool {
        let mark = params.len();
        let mut consumed = 0;

        for seg in &self.segments {
            match seg {
                Segment::Wildcard(name) => {
                    if consumed >= request.len() {
                        params.truncate(mark);
                        return false;
                    }
                    let rest = request[consumed..].join("/");
                    params.push((Arc::clone(name), rest));
                    return true;
                }
                Segment::Literal(lit) => match request.get(consumed) {
                    Some(value) if *value == &**lit => {}
                    _ => {
                        params.truncate(mark);
                        return false;
                    }
                },
                Segment::Param(name) => match request.get(consumed) {
                    Some(value) if !value.is_empty() => {
                        params.push((Arc::clone(name), (*value).to_string()));
                    }
                    _ => {
                        params.truncate(mark);
                        return false;
                    }
                },
            }
            consumed += 1;
        }

        if consumed == request.len() {
            true
        } else {
            params.truncate(mark);
            false
        }
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for seg in &self.segments {
            write!(f, "/{seg}")?;
        }
        Ok(())
    }
}

fn validate_name(pattern: &str, name: &str) -> Result<(), PatternError> {
    if name.is_empty() {
        return Err(PatternError::EmptyParamName {
            pattern: pattern.to_string(),
        });
    }
    if !PARAM_NAME.is_match(name) {
        return Err(PatternError::InvalidParamName {
            pattern: pattern.to_string(),
            name: name.to_string(),
        });
    }
    Ok(())
}
