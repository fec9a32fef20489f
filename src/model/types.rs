use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type Timestamp = DateTime<Utc>;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CategoryId(i64);

impl CategoryId {
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> i64 {
        self.0
    }

    /// The id that follows the largest of `existing`, or `1` for an empty
    /// collection. `None` once the largest id is `i64::MAX`.
    pub fn next_after(existing: impl IntoIterator<Item = CategoryId>) -> Option<Self> {
        let last = existing.into_iter().map(|id| id.0).max().unwrap_or(0);

        last.checked_add(1).map(Self)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn now() -> Timestamp {
    Utc::now()
}
