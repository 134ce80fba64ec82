//! Fetch lifecycle state for a remote collection.

use serde::{Deserialize, Serialize};

/// State of the most recent non-superseded fetch of a collection.
///
/// At most one `Loading` transition is in flight per store; a newer fetch
/// supersedes (never queues behind) an older one. Stale rows are kept by the
/// owning store across `Loading` and `Failed` so the UI degrades to
/// stale-but-visible rather than blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum FetchState<T> {
    /// No fetch has been issued yet.
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The latest fetch completed with these rows.
    Ready { rows: Vec<T> },
    /// The latest fetch failed; previously fetched rows remain visible.
    Failed { error: String },
}

impl<T> FetchState<T> {
    /// Whether a request is currently in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Whether the latest settled fetch failed.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Rows of a `Ready` state, if any.
    #[must_use]
    pub fn rows(&self) -> Option<&[T]> {
        match self {
            Self::Ready { rows } => Some(rows),
            _ => None,
        }
    }
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        let state: FetchState<u32> = FetchState::default();
        assert_eq!(state, FetchState::Idle);
        assert!(!state.is_loading());
    }

    #[test]
    fn test_ready_rows() {
        let state = FetchState::Ready { rows: vec![1, 2, 3] };
        assert_eq!(state.rows(), Some(&[1, 2, 3][..]));
        assert!(!state.is_failed());
    }

    #[test]
    fn test_failed_has_no_rows() {
        let state: FetchState<u32> = FetchState::Failed {
            error: "timeout".to_string(),
        };
        assert!(state.is_failed());
        assert_eq!(state.rows(), None);
    }
}
