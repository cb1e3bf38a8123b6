//! Employee store

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::cache::{DEFAULT_CHANNEL_CAPACITY, EntityCache, Snapshot, SnapshotStream};
use crate::error::{Error, Result};
use crate::model::{Employee, EmployeeId, EmployeePayload, SkillId};
use crate::remote::RemoteStore;

use super::{FetchOutcome, FetchStatus};

/// Cached employee collection with its writes
pub struct EmployeeStore {
    remote: Arc<dyn RemoteStore>,
    cache: EntityCache<Employee>,
    status: FetchStatus,
}

impl std::fmt::Debug for EmployeeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmployeeStore")
            .field("cache", &self.cache)
            .field("last_fetch", &self.status.get())
            .finish()
    }
}

impl EmployeeStore {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self::with_capacity(remote, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Store whose cache buffers `capacity` snapshots per observer
    pub fn with_capacity(remote: Arc<dyn RemoteStore>, capacity: usize) -> Self {
        Self {
            remote,
            cache: EntityCache::with_capacity(capacity),
            status: FetchStatus::default(),
        }
    }

    pub fn cache(&self) -> &EntityCache<Employee> {
        &self.cache
    }

    /// Latest cached employees
    pub fn current(&self) -> Snapshot<Employee> {
        self.cache.current()
    }

    pub fn observe(&self) -> SnapshotStream<Employee> {
        self.cache.observe()
    }

    /// Outcome of the most recent `fetch_all`
    pub fn last_fetch(&self) -> FetchOutcome {
        self.status.get()
    }

    /// Reload the whole collection
    ///
    /// On failure the error is logged and the cache is emptied rather than
    /// left holding a stale snapshot.
    pub async fn fetch_all(&self) -> FetchOutcome {
        match self.remote.list_employees().await {
            Ok(mut employees) => {
                for employee in &mut employees {
                    employee.normalize_skill_set();
                }
                let count = employees.len();
                self.cache.set(employees);
                debug!(count, "Employees loaded");
                self.status.record(FetchOutcome::Loaded(count))
            }
            Err(e) => {
                error!(error = %e, code = e.code(), "Failed to load employees");
                self.cache.set(Vec::new());
                self.status.record(FetchOutcome::Failed(e.to_string()))
            }
        }
    }

    /// Fetch one employee directly from the service, skill set sorted by label
    pub async fn get_one(&self, id: EmployeeId) -> Result<Employee> {
        let mut employee = self.remote.get_employee(id).await?;
        employee.normalize_skill_set();
        Ok(employee)
    }

    /// Create an employee; returns the stored record with its new id
    pub async fn create(&self, employee: &Employee) -> Result<Employee> {
        let payload = EmployeePayload::from(employee);
        let created = self.remote.create_employee(&payload).await.inspect_err(|e| {
            warn!(error = %e, "Failed to create employee");
        })?;

        info!(employee_id = ?created.id, "Employee created");
        self.fetch_all().await;
        Ok(created)
    }

    /// Update an existing employee
    pub async fn update(&self, employee: &Employee) -> Result<Employee> {
        let id = employee
            .id
            .ok_or_else(|| Error::InvalidArgument("employee update requires an id".to_string()))?;

        let payload = EmployeePayload::from(employee);
        let updated = self
            .remote
            .update_employee(id, &payload)
            .await
            .inspect_err(|e| warn!(employee_id = id, error = %e, "Failed to update employee"))?;

        info!(employee_id = id, "Employee updated");
        self.fetch_all().await;
        Ok(updated)
    }

    /// Delete an employee; a missing id is a no-op
    ///
    /// A failed delete leaves the cache untouched.
    pub async fn delete(&self, id: Option<EmployeeId>) -> Result<()> {
        let Some(id) = id else {
            debug!("Ignoring employee delete without id");
            return Ok(());
        };

        self.remote
            .delete_employee(id)
            .await
            .inspect_err(|e| error!(employee_id = id, error = %e, "Failed to delete employee"))?;

        info!(employee_id = id, "Employee deleted");
        self.fetch_all().await;
        Ok(())
    }

    /// Employees currently holding a skill, as reported by the service
    pub async fn employees_by_skill(&self, skill_id: SkillId) -> Result<Vec<Employee>> {
        let holders = self.remote.employees_by_skill(skill_id).await?;
        debug!(skill_id, holders = holders.employees.len(), "Loaded skill holders");
        Ok(holders.employees)
    }
}
