//! Skill store and employee/skill assignments

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::cache::{DEFAULT_CHANNEL_CAPACITY, EntityCache, Snapshot, SnapshotStream};
use crate::error::{Error, Result};
use crate::model::{EmployeeId, Skill, SkillId, sort_skills_by_label};
use crate::remote::RemoteStore;

use super::{EmployeeStore, FetchOutcome, FetchStatus};

/// Cached skill collection with its writes and the assignment edges
///
/// Assignments live inside employee records, so edge changes refresh the
/// employee store this store was built with.
pub struct SkillStore {
    remote: Arc<dyn RemoteStore>,
    cache: EntityCache<Skill>,
    status: FetchStatus,
    employees: Arc<EmployeeStore>,
}

impl std::fmt::Debug for SkillStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillStore")
            .field("cache", &self.cache)
            .field("last_fetch", &self.status.get())
            .finish()
    }
}

impl SkillStore {
    pub fn new(remote: Arc<dyn RemoteStore>, employees: Arc<EmployeeStore>) -> Self {
        Self::with_capacity(remote, employees, DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(
        remote: Arc<dyn RemoteStore>,
        employees: Arc<EmployeeStore>,
        capacity: usize,
    ) -> Self {
        Self {
            remote,
            cache: EntityCache::with_capacity(capacity),
            status: FetchStatus::default(),
            employees,
        }
    }

    pub fn cache(&self) -> &EntityCache<Skill> {
        &self.cache
    }

    /// Latest cached skills, sorted by label
    pub fn current(&self) -> Snapshot<Skill> {
        self.cache.current()
    }

    pub fn observe(&self) -> SnapshotStream<Skill> {
        self.cache.observe()
    }

    /// The employee store refreshed by assignment changes
    pub fn employees(&self) -> &Arc<EmployeeStore> {
        &self.employees
    }

    pub fn last_fetch(&self) -> FetchOutcome {
        self.status.get()
    }

    /// Reload the whole collection, emptying the cache on failure
    pub async fn fetch_all(&self) -> FetchOutcome {
        match self.remote.list_skills().await {
            Ok(mut skills) => {
                sort_skills_by_label(&mut skills);
                let count = skills.len();
                self.cache.set(skills);
                debug!(count, "Skills loaded");
                self.status.record(FetchOutcome::Loaded(count))
            }
            Err(e) => {
                error!(error = %e, code = e.code(), "Failed to load skills");
                self.cache.set(Vec::new());
                self.status.record(FetchOutcome::Failed(e.to_string()))
            }
        }
    }

    /// Create a skill from a label; surrounding whitespace is dropped
    pub async fn create(&self, name: &str) -> Result<Skill> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidArgument("skill name must not be empty".to_string()));
        }

        let created = self
            .remote
            .create_skill(name)
            .await
            .inspect_err(|e| warn!(skill = name, error = %e, "Failed to create skill"))?;

        info!(skill_id = ?created.id, skill = %created.skill, "Skill created");
        self.fetch_all().await;
        Ok(created)
    }

    /// Rename a skill
    pub async fn update(&self, skill: &Skill) -> Result<Skill> {
        let id = skill
            .id
            .ok_or_else(|| Error::InvalidArgument("skill update requires an id".to_string()))?;
        if skill.skill.trim().is_empty() {
            return Err(Error::InvalidArgument("skill name must not be empty".to_string()));
        }

        let updated = self
            .remote
            .update_skill(id, skill)
            .await
            .inspect_err(|e| warn!(skill_id = id, error = %e, "Failed to update skill"))?;

        info!(skill_id = id, "Skill updated");
        self.fetch_all().await;
        Ok(updated)
    }

    /// Delete a skill; a missing id is a no-op
    ///
    /// Succeeds only if the service accepts the delete, which it may refuse
    /// while employees still hold the skill. Both caches are refreshed on
    /// success; a failure leaves them untouched.
    pub async fn delete(&self, id: Option<SkillId>) -> Result<()> {
        let Some(id) = id else {
            debug!("Ignoring skill delete without id");
            return Ok(());
        };

        self.remote
            .delete_skill(id)
            .await
            .inspect_err(|e| error!(skill_id = id, error = %e, "Failed to delete skill"))?;

        info!(skill_id = id, "Skill deleted");
        tokio::join!(self.fetch_all(), self.employees.fetch_all());
        Ok(())
    }

    /// Assign a skill to an employee by label
    pub async fn assign(&self, employee_id: EmployeeId, skill_name: &str) -> Result<()> {
        self.remote
            .assign_skill(employee_id, skill_name)
            .await
            .inspect_err(|e| {
                warn!(employee_id, skill = skill_name, error = %e, "Failed to assign skill")
            })?;

        info!(employee_id, skill = skill_name, "Skill assigned");
        self.employees.fetch_all().await;
        Ok(())
    }

    /// Assign a cached skill to an employee by id
    pub async fn assign_by_id(&self, employee_id: EmployeeId, skill_id: SkillId) -> Result<()> {
        let label = self
            .cache
            .current()
            .iter()
            .find(|s| s.id == Some(skill_id))
            .map(|s| s.skill.clone())
            .ok_or_else(|| Error::skill_not_found(skill_id))?;

        self.assign(employee_id, &label).await
    }

    /// Remove a skill from an employee
    pub async fn unassign(&self, employee_id: EmployeeId, skill_id: SkillId) -> Result<()> {
        self.remote
            .unassign_skill(employee_id, skill_id)
            .await
            .inspect_err(|e| {
                warn!(employee_id, skill_id, error = %e, "Failed to unassign skill")
            })?;

        info!(employee_id, skill_id, "Skill unassigned");
        self.employees.fetch_all().await;
        Ok(())
    }

    /// Skills of one employee as reported by the service, sorted by label
    pub async fn employee_skills(&self, employee_id: EmployeeId) -> Result<Vec<Skill>> {
        let mut employee = self.remote.employee_skills(employee_id).await?;
        employee.normalize_skill_set();
        Ok(employee.skills())
    }

    /// Create a skill and assign it to an employee in one step
    pub async fn create_and_assign(&self, employee_id: EmployeeId, name: &str) -> Result<Skill> {
        let created = self.create(name).await?;
        self.assign(employee_id, &created.skill).await?;
        Ok(created)
    }
}
