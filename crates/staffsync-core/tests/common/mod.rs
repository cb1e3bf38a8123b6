//! In-memory employee service used by the integration tests
//!
//! Employees keep their skill set as ids and are expanded to full skills on
//! every read, in assignment order, the way the real service answers.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use staffsync_core::model::{
    Employee, EmployeeId, EmployeePayload, Skill, SkillHolders, SkillId, SkillRef,
};
use staffsync_core::remote::RemoteStore;
use staffsync_core::{Error, Result};

#[derive(Debug, Clone)]
struct StoredEmployee {
    record: Employee,
    skill_ids: Vec<SkillId>,
}

#[derive(Debug, Default)]
struct State {
    employees: BTreeMap<EmployeeId, StoredEmployee>,
    skills: BTreeMap<SkillId, String>,
    next_employee_id: EmployeeId,
    next_skill_id: SkillId,
}

/// Switches for making individual calls fail
#[derive(Debug, Default)]
struct Faults {
    fail_list_employees: bool,
    fail_list_skills: bool,
    fail_update_for: HashSet<EmployeeId>,
    fail_delete_employee: bool,
    fail_delete_skill_status: Option<u16>,
    /// Reject skill deletes while any employee still holds the skill
    refuse_referenced_deletes: bool,
    /// Assignments applied right after a holder query, simulating a
    /// concurrent client assigning the skill between query and delete
    racing_assignments: Vec<(EmployeeId, SkillId)>,
}

#[derive(Debug, Default)]
pub struct FakeRemote {
    state: Mutex<State>,
    faults: Mutex<Faults>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl FakeRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    // ========== Seeding ==========

    pub fn add_skill(&self, id: SkillId, label: &str) {
        let mut state = self.state.lock().unwrap();
        state.skills.insert(id, label.to_string());
        state.next_skill_id = state.next_skill_id.max(id);
    }

    pub fn add_employee(&self, id: EmployeeId, first: &str, last: &str, skill_ids: &[SkillId]) {
        let mut state = self.state.lock().unwrap();
        let record = Employee::new(first, last).with_id(id);
        state.employees.insert(
            id,
            StoredEmployee {
                record,
                skill_ids: skill_ids.to_vec(),
            },
        );
        state.next_employee_id = state.next_employee_id.max(id);
    }

    // ========== Fault injection ==========

    pub fn fail_list_employees(&self, fail: bool) {
        self.faults.lock().unwrap().fail_list_employees = fail;
    }

    pub fn fail_list_skills(&self, fail: bool) {
        self.faults.lock().unwrap().fail_list_skills = fail;
    }

    pub fn fail_update_for(&self, id: EmployeeId) {
        self.faults.lock().unwrap().fail_update_for.insert(id);
    }

    pub fn fail_delete_employee(&self, fail: bool) {
        self.faults.lock().unwrap().fail_delete_employee = fail;
    }

    pub fn fail_delete_skill_with(&self, status: u16) {
        self.faults.lock().unwrap().fail_delete_skill_status = Some(status);
    }

    pub fn refuse_referenced_deletes(&self) {
        self.faults.lock().unwrap().refuse_referenced_deletes = true;
    }

    pub fn race_assignment(&self, employee_id: EmployeeId, skill_id: SkillId) {
        self.faults
            .lock()
            .unwrap()
            .racing_assignments
            .push((employee_id, skill_id));
    }

    // ========== Inspection ==========

    pub fn calls(&self, name: &str) -> usize {
        self.calls.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    pub fn skill_ids_of(&self, id: EmployeeId) -> Vec<SkillId> {
        self.state
            .lock()
            .unwrap()
            .employees
            .get(&id)
            .map(|e| e.skill_ids.clone())
            .unwrap_or_default()
    }

    pub fn has_skill(&self, id: SkillId) -> bool {
        self.state.lock().unwrap().skills.contains_key(&id)
    }

    fn record(&self, name: &'static str) {
        *self.calls.lock().unwrap().entry(name).or_default() += 1;
    }
}

impl State {
    fn expand(&self, stored: &StoredEmployee) -> Employee {
        let mut employee = stored.record.clone();
        employee.skill_set = stored
            .skill_ids
            .iter()
            .map(|id| match self.skills.get(id) {
                Some(label) => SkillRef::Full(Skill::new(*id, label.clone())),
                None => SkillRef::Id(*id),
            })
            .collect();
        employee
    }

    fn employee(&self, id: EmployeeId) -> Result<Employee> {
        self.employees
            .get(&id)
            .map(|e| self.expand(e))
            .ok_or_else(|| Error::employee_not_found(id))
    }

    fn holders(&self, skill_id: SkillId) -> Vec<Employee> {
        self.employees
            .values()
            .filter(|e| e.skill_ids.contains(&skill_id))
            .map(|e| self.expand(e))
            .collect()
    }

    fn store(&mut self, id: EmployeeId, payload: &EmployeePayload) -> Result<Employee> {
        if let Some(unknown) = payload.skill_set.iter().find(|s| !self.skills.contains_key(*s)) {
            return Err(Error::ClientError {
                status: 400,
                message: format!("Unknown skill {}", unknown),
            });
        }

        let record = Employee {
            id: Some(id),
            last_name: payload.last_name.clone(),
            first_name: payload.first_name.clone(),
            street: payload.street.clone(),
            postcode: payload.postcode.clone(),
            city: payload.city.clone(),
            phone: payload.phone.clone(),
            skill_set: Vec::new(),
        };
        let stored = StoredEmployee {
            record,
            skill_ids: payload.skill_set.clone(),
        };
        let expanded = self.expand(&stored);
        self.employees.insert(id, stored);
        Ok(expanded)
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn list_employees(&self) -> Result<Vec<Employee>> {
        self.record("list_employees");
        if self.faults.lock().unwrap().fail_list_employees {
            return Err(Error::ServerError {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        let state = self.state.lock().unwrap();
        Ok(state.employees.values().map(|e| state.expand(e)).collect())
    }

    async fn get_employee(&self, id: EmployeeId) -> Result<Employee> {
        self.record("get_employee");
        self.state.lock().unwrap().employee(id)
    }

    async fn create_employee(&self, employee: &EmployeePayload) -> Result<Employee> {
        self.record("create_employee");
        let mut state = self.state.lock().unwrap();
        state.next_employee_id += 1;
        let id = state.next_employee_id;
        state.store(id, employee)
    }

    async fn update_employee(&self, id: EmployeeId, employee: &EmployeePayload) -> Result<Employee> {
        self.record("update_employee");
        if self.faults.lock().unwrap().fail_update_for.contains(&id) {
            return Err(Error::ServerError {
                status: 500,
                message: "update failed".to_string(),
            });
        }
        let mut state = self.state.lock().unwrap();
        if !state.employees.contains_key(&id) {
            return Err(Error::employee_not_found(id));
        }
        state.store(id, employee)
    }

    async fn delete_employee(&self, id: EmployeeId) -> Result<()> {
        self.record("delete_employee");
        if self.faults.lock().unwrap().fail_delete_employee {
            return Err(Error::ServerError {
                status: 500,
                message: "delete failed".to_string(),
            });
        }
        match self.state.lock().unwrap().employees.remove(&id) {
            Some(_) => Ok(()),
            None => Err(Error::employee_not_found(id)),
        }
    }

    async fn list_skills(&self) -> Result<Vec<Skill>> {
        self.record("list_skills");
        if self.faults.lock().unwrap().fail_list_skills {
            return Err(Error::ServerError {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .skills
            .iter()
            .map(|(id, label)| Skill::new(*id, label.clone()))
            .collect())
    }

    async fn create_skill(&self, name: &str) -> Result<Skill> {
        self.record("create_skill");
        let mut state = self.state.lock().unwrap();
        if state.skills.values().any(|s| s.eq_ignore_ascii_case(name)) {
            return Err(Error::ClientError {
                status: 400,
                message: "Skill already exists".to_string(),
            });
        }
        state.next_skill_id += 1;
        let id = state.next_skill_id;
        state.skills.insert(id, name.to_string());
        Ok(Skill::new(id, name))
    }

    async fn update_skill(&self, id: SkillId, skill: &Skill) -> Result<Skill> {
        self.record("update_skill");
        let mut state = self.state.lock().unwrap();
        match state.skills.get_mut(&id) {
            Some(label) => {
                *label = skill.skill.clone();
                Ok(Skill::new(id, skill.skill.clone()))
            }
            None => Err(Error::skill_not_found(id)),
        }
    }

    async fn delete_skill(&self, id: SkillId) -> Result<()> {
        self.record("delete_skill");
        let (fail_status, refuse_referenced) = {
            let faults = self.faults.lock().unwrap();
            (faults.fail_delete_skill_status, faults.refuse_referenced_deletes)
        };
        if let Some(status) = fail_status {
            return Err(Error::from_status(status, "Skill", Some(id.to_string()), String::new()));
        }

        let mut state = self.state.lock().unwrap();
        if !state.skills.contains_key(&id) {
            return Err(Error::skill_not_found(id));
        }
        if refuse_referenced && !state.holders(id).is_empty() {
            return Err(Error::ClientError {
                status: 409,
                message: "Skill is still assigned".to_string(),
            });
        }
        state.skills.remove(&id);
        Ok(())
    }

    async fn employees_by_skill(&self, id: SkillId) -> Result<SkillHolders> {
        self.record("employees_by_skill");
        let mut state = self.state.lock().unwrap();
        let label = state
            .skills
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::skill_not_found(id))?;
        let holders = SkillHolders {
            skill: Skill::new(id, label),
            employees: state.holders(id),
        };

        let mut faults = self.faults.lock().unwrap();
        if let Some(pos) = faults.racing_assignments.iter().position(|(_, s)| *s == id) {
            let (employee_id, skill_id) = faults.racing_assignments.remove(pos);
            if let Some(employee) = state.employees.get_mut(&employee_id) {
                employee.skill_ids.push(skill_id);
            }
        }

        Ok(holders)
    }

    async fn employee_skills(&self, employee_id: EmployeeId) -> Result<Employee> {
        self.record("employee_skills");
        self.state.lock().unwrap().employee(employee_id)
    }

    async fn assign_skill(&self, employee_id: EmployeeId, skill_name: &str) -> Result<()> {
        self.record("assign_skill");
        let mut state = self.state.lock().unwrap();
        let skill_id = state
            .skills
            .iter()
            .find(|(_, label)| label.eq_ignore_ascii_case(skill_name))
            .map(|(id, _)| *id)
            .ok_or_else(|| Error::skill_not_found(skill_name))?;
        let employee = state
            .employees
            .get_mut(&employee_id)
            .ok_or_else(|| Error::employee_not_found(employee_id))?;
        if !employee.skill_ids.contains(&skill_id) {
            employee.skill_ids.push(skill_id);
        }
        Ok(())
    }

    async fn unassign_skill(&self, employee_id: EmployeeId, skill_id: SkillId) -> Result<()> {
        self.record("unassign_skill");
        let mut state = self.state.lock().unwrap();
        let employee = state
            .employees
            .get_mut(&employee_id)
            .ok_or_else(|| Error::employee_not_found(employee_id))?;
        employee.skill_ids.retain(|id| *id != skill_id);
        Ok(())
    }
}

/// Service seeded with the skills Java (7), Go (3) and Rust (5)
pub fn seeded() -> Arc<FakeRemote> {
    let remote = FakeRemote::new();
    remote.add_skill(7, "Java");
    remote.add_skill(3, "Go");
    remote.add_skill(5, "Rust");
    remote
}
