use serde::Serialize;
use std::collections::BTreeSet;

use crate::error::{AppError, AppResult};

/// Queue state encoded in a container key's suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueState {
    Failed,
    Active,
    /// Waiting, paused or delayed
    Queued,
}

impl QueueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Failed => "failed",
            Self::Active => "active",
            Self::Queued => "queued",
        }
    }
}

/// Suffix table, checked by exact suffix match
const SUFFIXES: [(&str, QueueState); 6] = [
    (":failed", QueueState::Failed),
    (":active", QueueState::Active),
    (":waiting", QueueState::Queued),
    (":wait", QueueState::Queued),
    (":paused", QueueState::Queued),
    (":delayed", QueueState::Queued),
];

/// Map a container key to its queue state. Keys with no known suffix are `None`.
pub fn classify(key: impl AsRef<[u8]>) -> Option<QueueState> {
    let key = key.as_ref();
    SUFFIXES
        .iter()
        .find(|(suffix, _)| key.ends_with(suffix.as_bytes()))
        .map(|(_, state)| *state)
}

/// Non-empty set of queue states selected for cleaning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSelection {
    states: BTreeSet<QueueState>,
}

impl StateSelection {
    pub fn new(states: impl IntoIterator<Item = QueueState>) -> AppResult<Self> {
        let states: BTreeSet<QueueState> = states.into_iter().collect();
        if states.is_empty() {
            return Err(AppError::Usage(
                "Select at least one: --clean-failed --clean-active --clean-queued".to_string(),
            ));
        }
        Ok(Self { states })
    }

    /// Build a selection from the three `--clean-*` flags
    pub fn from_flags(failed: bool, active: bool, queued: bool) -> AppResult<Self> {
        let flagged = [
            (failed, QueueState::Failed),
            (active, QueueState::Active),
            (queued, QueueState::Queued),
        ];
        Self::new(
            flagged
                .into_iter()
                .filter(|(on, _)| *on)
                .map(|(_, state)| state),
        )
    }

    pub fn contains(&self, state: QueueState) -> bool {
        self.states.contains(&state)
    }

    pub fn states(&self) -> impl Iterator<Item = QueueState> + '_ {
        self.states.iter().copied()
    }
}
