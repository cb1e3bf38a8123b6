//! Remote employee service
//!
//! This module provides:
//! - The `RemoteStore` trait every store talks to
//! - A reqwest-backed implementation with bearer authentication
//! - Token providers supplying the bearer credential

mod http;
mod token;

pub use http::{HttpRemoteStore, HttpRemoteStoreBuilder};
pub use token::{EnvTokenProvider, StaticTokenProvider, TokenProvider};

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Employee, EmployeeId, EmployeePayload, Skill, SkillHolders, SkillId};

/// Request/response access to employees, skills and their assignments
///
/// Every call either returns the expected payload or fails with an error
/// classifiable through [`crate::Error::kind`].
#[async_trait]
pub trait RemoteStore: Send + Sync {
    // ========== Employees ==========

    /// `GET /employees`
    async fn list_employees(&self) -> Result<Vec<Employee>>;

    /// `GET /employees/{id}`, skill set as full skill objects
    async fn get_employee(&self, id: EmployeeId) -> Result<Employee>;

    /// `POST /employees`
    async fn create_employee(&self, employee: &EmployeePayload) -> Result<Employee>;

    /// `PUT /employees/{id}`
    async fn update_employee(&self, id: EmployeeId, employee: &EmployeePayload) -> Result<Employee>;

    /// `DELETE /employees/{id}`
    async fn delete_employee(&self, id: EmployeeId) -> Result<()>;

    // ========== Skills ==========

    /// `GET /skills`
    async fn list_skills(&self) -> Result<Vec<Skill>>;

    /// `POST /skills` with `{skill: name}`
    async fn create_skill(&self, name: &str) -> Result<Skill>;

    /// `PUT /skills/{id}`
    async fn update_skill(&self, id: SkillId, skill: &Skill) -> Result<Skill>;

    /// `DELETE /skills/{id}`; may fail while the skill is still assigned
    async fn delete_skill(&self, id: SkillId) -> Result<()>;

    /// `GET /skills/{id}/employees`
    async fn employees_by_skill(&self, id: SkillId) -> Result<SkillHolders>;

    // ========== Assignments ==========

    /// `GET /employees/{id}/skills`
    async fn employee_skills(&self, employee_id: EmployeeId) -> Result<Employee>;

    /// `POST /employees/{id}/skills` with `{skill: name}`
    async fn assign_skill(&self, employee_id: EmployeeId, skill_name: &str) -> Result<()>;

    /// `DELETE /employees/{id}/skills/{skillId}`
    async fn unassign_skill(&self, employee_id: EmployeeId, skill_id: SkillId) -> Result<()>;
}
