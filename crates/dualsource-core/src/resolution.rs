//! Per-item resolution outcome and the response set built from it.

use std::collections::BTreeSet;

/// A set of items submitted for resolution. Duplicates are impossible by construction.
pub type ItemSet = BTreeSet<String>;

/// Resolved values returned to the caller.
pub type ResolvedSet = BTreeSet<String>;

/// Outcome of resolving a single item.
///
/// `Absent` covers every failure mode; the reason has already been handed to
/// the notifier by the time a `Resolution` exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Present(String),
    Absent,
}

impl Resolution {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    pub fn into_value(self) -> Option<String> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent => None,
        }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::Absent
    }
}

impl<E> From<std::result::Result<String, E>> for Resolution {
    fn from(result: std::result::Result<String, E>) -> Self {
        match result {
            Ok(value) => Self::Present(value),
            Err(_) => Self::Absent,
        }
    }
}

/// Collect present values, dropping absences.
pub fn collect_present<I>(resolutions: I) -> ResolvedSet
where
    I: IntoIterator<Item = Resolution>,
{
    resolutions
        .into_iter()
        .filter_map(Resolution::into_value)
        .collect()
}
