//! Entity stores
//!
//! Each store owns one snapshot cache and the writes for its entity. Every
//! successful write re-fetches the affected collection before returning, so
//! a caller awaiting a write observes the change in the cache afterwards.

mod employee;
mod skill;

pub use employee::EmployeeStore;
pub use skill::SkillStore;

use std::sync::{Mutex, PoisonError};

/// Result of the most recent list fetch of a store
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchOutcome {
    /// No fetch has completed yet
    #[default]
    NotLoaded,
    /// The snapshot was replaced with this many entities
    Loaded(usize),
    /// The fetch failed and the snapshot was emptied
    Failed(String),
}

impl FetchOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Last fetch outcome shared by both stores
#[derive(Debug, Default)]
struct FetchStatus(Mutex<FetchOutcome>);

impl FetchStatus {
    fn record(&self, outcome: FetchOutcome) -> FetchOutcome {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = outcome.clone();
        outcome
    }

    fn get(&self) -> FetchOutcome {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
