//! Dispatch identifiers.
//!
//! 1 回の send / publish ごとに ULID を払い出し、ログの相関 ID として使います。
//! ULID は生成順にソートできるため、ログを時系列で並べやすくなります。

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Correlation id attached to the tracing span of one dispatch.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DispatchId(Ulid);

impl DispatchId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl Default for DispatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Ulid> for DispatchId {
    fn from(ulid: Ulid) -> Self {
        Self(ulid)
    }
}

impl fmt::Display for DispatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dispatch-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_has_prefix() {
        let id = DispatchId::from(Ulid::nil());
        assert_eq!(id.to_string(), format!("dispatch-{}", Ulid::nil()));
    }

    #[test]
    fn fresh_ids_differ() {
        assert_ne!(DispatchId::new(), DispatchId::new());
    }
}
