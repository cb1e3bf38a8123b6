//! Derived views joining employees, skills and the skill selection
//!
//! Everything here is a pure function of snapshots. [`RelationshipView`]
//! recomputes them whenever one of its inputs changes.

mod sort;
mod view;

pub use sort::{SortColumn, SortDirection, SortSpec, sort_employees};
pub use view::{RelationshipView, RosterQuery, ViewInputs, ViewStream};

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use crate::model::{Employee, Skill, SkillId};

/// A skill together with the number of employees holding it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillUsage {
    pub skill: Skill,
    pub usage_count: usize,
}

impl SkillUsage {
    /// Deleting this skill would detach it from employees
    pub fn requires_confirmation(&self) -> bool {
        self.usage_count > 0
    }
}

/// Result of filtering the skill dropdown by free text
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SkillSearch {
    /// Assignable skills whose label contains the text
    pub matches: Vec<Skill>,
    /// No existing skill carries exactly this label, so it may be created
    pub can_create: bool,
}

/// Number of employees whose skill set contains `skill_id`
pub fn usage_count(skill_id: SkillId, employees: &[Employee]) -> usize {
    employees.iter().filter(|e| e.has_skill(skill_id)).count()
}

/// Every skill with its usage count, in skill order
pub fn skill_usage(skills: &[Skill], employees: &[Employee]) -> Vec<SkillUsage> {
    skills
        .iter()
        .map(|skill| SkillUsage {
            skill: skill.clone(),
            usage_count: skill.id.map_or(0, |id| usage_count(id, employees)),
        })
        .collect()
}

/// Employees holding every selected skill; an empty selection keeps everyone
pub fn filter_by_skills(employees: &[Employee], selection: &BTreeSet<SkillId>) -> Vec<Employee> {
    if selection.is_empty() {
        return employees.to_vec();
    }

    employees
        .iter()
        .filter(|employee| {
            let held: HashSet<SkillId> = employee.skill_ids().into_iter().collect();
            selection.iter().all(|id| held.contains(id))
        })
        .cloned()
        .collect()
}

/// Case-insensitive substring match over first name, last name, city and street
pub fn filter_by_text(employees: &[Employee], text: &str) -> Vec<Employee> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return employees.to_vec();
    }

    employees
        .iter()
        .filter(|e| {
            let haystack = [&e.first_name, &e.last_name, &e.city, &e.street]
                .iter()
                .map(|field| field.as_deref().unwrap_or(""))
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase();
            haystack.contains(&needle)
        })
        .cloned()
        .collect()
}

/// All skills minus the ones the employee already holds
pub fn assignable_skills(skills: &[Skill], employee: &Employee) -> Vec<Skill> {
    let assigned: HashSet<SkillId> = employee.skill_ids().into_iter().collect();
    skills
        .iter()
        .filter(|s| s.id.is_none_or(|id| !assigned.contains(&id)))
        .cloned()
        .collect()
}

/// Filter the assignable skills of an employee by free text
///
/// Matching is a case-insensitive substring test. Creating a new skill is
/// offered when the text is non-empty and no skill, assigned or not, has
/// exactly that label ignoring case.
pub fn search_skills(skills: &[Skill], employee: &Employee, text: &str) -> SkillSearch {
    let assignable = assignable_skills(skills, employee);
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return SkillSearch {
            matches: assignable,
            can_create: false,
        };
    }

    let matches = assignable
        .into_iter()
        .filter(|s| s.skill.to_lowercase().contains(&needle))
        .collect();
    let exact = skills.iter().any(|s| s.skill.to_lowercase() == needle);

    SkillSearch {
        matches,
        can_create: !exact,
    }
}
