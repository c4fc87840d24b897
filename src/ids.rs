use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Strongly typed identifier for one dispatched call, backed by ULID.
///
/// Only used to correlate log events of a call; it never reaches the wire.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct CallId(pub ulid::Ulid);

impl CallId {
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Reuse an id supplied by the caller if it parses, otherwise mint one.
    #[must_use]
    pub fn from_header_or_new(header_value: Option<&str>) -> Self {
        header_value
            .and_then(|s| s.parse::<CallId>().ok())
            .unwrap_or_default()
    }
}

impl Default for CallId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for CallId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CallId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ulid::Ulid::from_string(s).map(CallId)
    }
}
