//! Cascading skill deletion
//!
//! Deletes a skill that may still be assigned: every holder has the skill
//! removed from its skill set, then the delete is retried. Detachments that
//! succeeded before a failure are not rolled back.

use std::sync::Arc;

use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::{Employee, EmployeeId, SkillId};
use crate::stores::{EmployeeStore, SkillStore};

/// Default number of query/detach/delete rounds before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Summary of a completed cascade delete
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CascadeReport {
    pub skill_id: SkillId,
    /// Rounds used, starting at 1
    pub attempts: u32,
    /// Employees the skill was removed from, in detach order
    pub detached: Vec<EmployeeId>,
}

/// Coordinates detaching a skill from every holder and deleting it
#[derive(Debug, Clone)]
pub struct CascadeDeleteCoordinator {
    employees: Arc<EmployeeStore>,
    skills: Arc<SkillStore>,
    max_attempts: u32,
}

impl CascadeDeleteCoordinator {
    pub fn new(employees: Arc<EmployeeStore>, skills: Arc<SkillStore>) -> Self {
        Self {
            employees,
            skills,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Bound the number of rounds; at least one round always runs
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delete a skill after detaching it from every employee holding it
    ///
    /// Each round queries the current holders, detaches the skill from all
    /// of them concurrently and then deletes it. A failed detach aborts the
    /// cascade with that error and the delete is not attempted. A delete the
    /// service refuses (for instance because an assignment raced in) starts
    /// another round until the attempts are used up, which yields
    /// [`Error::StillReferenced`]. Both caches reflect the deletion once
    /// this returns `Ok`.
    pub async fn delete_skill(&self, skill_id: SkillId) -> Result<CascadeReport> {
        let mut report = CascadeReport {
            skill_id,
            ..CascadeReport::default()
        };
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            report.attempts = attempt;

            let holders = self.employees.employees_by_skill(skill_id).await?;
            if holders.is_empty() {
                debug!(skill_id, attempt, "Skill has no holders");
            } else {
                info!(skill_id, attempt, holders = holders.len(), "Detaching skill from employees");
                report.detached.extend(self.detach_all(skill_id, &holders).await?);
            }

            match self.skills.delete(Some(skill_id)).await {
                Ok(()) => {
                    info!(skill_id, attempts = attempt, "Skill deleted after cascade");
                    return Ok(report);
                }
                Err(e) if e.may_indicate_in_use() => {
                    warn!(skill_id, attempt, error = %e, "Skill delete refused, retrying cascade");
                    last_error = e.to_string();
                }
                Err(e) => return Err(e),
            }
        }

        Err(Error::StillReferenced {
            skill_id,
            attempts: report.attempts,
            last_error,
        })
    }

    /// Remove the skill from every holder, awaiting all of them
    ///
    /// Returns the first error in holder order if any detach failed.
    async fn detach_all(&self, skill_id: SkillId, holders: &[Employee]) -> Result<Vec<EmployeeId>> {
        let ids: Vec<EmployeeId> = holders.iter().filter_map(|e| e.id).collect();
        let results = join_all(ids.iter().map(|&id| self.detach(id, skill_id))).await;

        let mut detached = Vec::with_capacity(ids.len());
        let mut first_error = None;
        for (id, result) in ids.into_iter().zip(results) {
            match result {
                Ok(()) => detached.push(id),
                Err(e) => {
                    warn!(employee_id = id, skill_id, error = %e, "Failed to detach skill");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(detached),
        }
    }

    /// Reload one employee and write it back without the skill
    async fn detach(&self, employee_id: EmployeeId, skill_id: SkillId) -> Result<()> {
        let employee = self.employees.get_one(employee_id).await?;
        if !employee.has_skill(skill_id) {
            debug!(employee_id, skill_id, "Skill already detached");
            return Ok(());
        }
        self.employees.update(&employee.without_skill(skill_id)).await?;
        Ok(())
    }
}
