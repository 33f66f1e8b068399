use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of one call room.
///
/// Both parties of a call derive the key independently, so it must not
/// depend on which side computes it: the two party identifiers are ordered
/// lexicographically before rendering.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct RoomKey(String);

impl RoomKey {
    pub fn for_pair(a: &str, b: &str) -> Self {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Self(format!("call-{lo}-{hi}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RoomKey {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<&str> for RoomKey {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
