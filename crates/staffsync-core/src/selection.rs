//! Skill selection used to filter the employee list
//!
//! Client-only state: it is never persisted and never cleared by fetches.

use std::collections::BTreeSet;

use tracing::debug;

use crate::cache::{EntityCache, SnapshotStream};
use crate::model::SkillId;

/// Set of selected skill ids with an observation stream
#[derive(Debug, Default)]
pub struct SelectionState {
    ids: EntityCache<SkillId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected ids
    pub fn current(&self) -> BTreeSet<SkillId> {
        self.ids.current().iter().copied().collect()
    }

    pub fn contains(&self, id: SkillId) -> bool {
        self.ids.current().contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.current().is_empty()
    }

    /// Replace the whole selection
    pub fn replace(&self, ids: impl IntoIterator<Item = SkillId>) {
        self.publish(ids.into_iter().collect());
    }

    pub fn select(&self, id: SkillId) {
        self.modify(|ids| ids.insert(id));
    }

    pub fn deselect(&self, id: SkillId) {
        self.modify(|ids| ids.remove(&id));
    }

    /// Flip membership of one id; returns whether it is selected afterwards
    pub fn toggle(&self, id: SkillId) -> bool {
        let mut selected = false;
        self.modify(|ids| {
            selected = !ids.remove(&id);
            if selected {
                ids.insert(id);
            }
            true
        });
        selected
    }

    pub fn clear(&self) {
        self.publish(BTreeSet::new());
    }

    /// Stream replaying the current selection, then every change
    pub fn observe(&self) -> SnapshotStream<SkillId> {
        self.ids.observe()
    }

    fn publish(&self, ids: BTreeSet<SkillId>) {
        debug!(selected = ids.len(), "Skill selection changed");
        self.ids.set(ids.into_iter().collect());
    }

    /// Read, change and publish under the cache lock; `change` reports
    /// whether the set was modified
    fn modify(&self, change: impl FnOnce(&mut BTreeSet<SkillId>) -> bool) {
        self.ids.update(|current| {
            let mut ids: BTreeSet<SkillId> = current.iter().copied().collect();
            if !change(&mut ids) {
                return None;
            }
            debug!(selected = ids.len(), "Skill selection changed");
            Some(ids.into_iter().collect())
        });
    }
}
