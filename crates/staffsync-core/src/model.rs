//! Employee and skill records as exchanged with the employee service
//!
//! The service returns `skillSet` as full skill objects on reads but expects
//! bare ids on writes. [`SkillRef`] accepts both shapes; [`EmployeePayload`]
//! is the write-side projection that always carries ids.

use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned employee identifier
pub type EmployeeId = i64;

/// Server-assigned skill identifier
pub type SkillId = i64;

/// A skill (the service calls it a qualification)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SkillId>,
    /// Label, unique by case-insensitive comparison
    #[serde(default, deserialize_with = "null_as_default")]
    pub skill: String,
}

impl Skill {
    pub fn new(id: SkillId, label: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            skill: label.into(),
        }
    }

    /// A skill that has not been stored yet
    pub fn unsaved(label: impl Into<String>) -> Self {
        Self {
            id: None,
            skill: label.into(),
        }
    }
}

/// Reference to a skill inside an employee's skill set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SkillRef {
    Id(SkillId),
    Full(Skill),
}

impl SkillRef {
    pub fn id(&self) -> Option<SkillId> {
        match self {
            Self::Id(id) => Some(*id),
            Self::Full(skill) => skill.id,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Id(_) => None,
            Self::Full(skill) => Some(&skill.skill),
        }
    }
}

impl From<Skill> for SkillRef {
    fn from(skill: Skill) -> Self {
        Self::Full(skill)
    }
}

impl From<SkillId> for SkillRef {
    fn from(id: SkillId) -> Self {
        Self::Id(id)
    }
}

/// An employee record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EmployeeId>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skill_set: Vec<SkillRef>,
}

impl Employee {
    /// Create an unsaved employee
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: EmployeeId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_address(
        mut self,
        street: impl Into<String>,
        postcode: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        self.street = Some(street.into());
        self.postcode = Some(postcode.into());
        self.city = Some(city.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_skills(mut self, skills: impl IntoIterator<Item = impl Into<SkillRef>>) -> Self {
        self.skill_set = skills.into_iter().map(Into::into).collect();
        self
    }

    /// Ids of the referenced skills, in skill-set order
    pub fn skill_ids(&self) -> Vec<SkillId> {
        self.skill_set.iter().filter_map(SkillRef::id).collect()
    }

    pub fn has_skill(&self, skill_id: SkillId) -> bool {
        self.skill_set.iter().any(|s| s.id() == Some(skill_id))
    }

    /// Full skills of the skill set; bare id references are skipped
    pub fn skills(&self) -> Vec<Skill> {
        self.skill_set
            .iter()
            .filter_map(|s| match s {
                SkillRef::Full(skill) => Some(skill.clone()),
                SkillRef::Id(_) => None,
            })
            .collect()
    }

    /// Drop one skill from the skill set
    pub fn without_skill(mut self, skill_id: SkillId) -> Self {
        self.skill_set.retain(|s| s.id() != Some(skill_id));
        self
    }

    /// Sort the skill set by label; id-only references keep their order at the end
    pub fn normalize_skill_set(&mut self) {
        self.skill_set.sort_by(|a, b| match (a.label(), b.label()) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
    }

    /// "Last, First" display name
    pub fn display_name(&self) -> String {
        match (&self.last_name, &self.first_name) {
            (Some(last), Some(first)) => format!("{}, {}", last, first),
            (Some(last), None) => last.clone(),
            (None, Some(first)) => first.clone(),
            (None, None) => String::new(),
        }
    }
}

/// Write-side shape of an employee: the skill set as bare, de-duplicated ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EmployeeId>,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub street: Option<String>,
    pub postcode: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub skill_set: Vec<SkillId>,
}

impl From<&Employee> for EmployeePayload {
    fn from(employee: &Employee) -> Self {
        let mut skill_set: Vec<SkillId> = Vec::with_capacity(employee.skill_set.len());
        for id in employee.skill_ids() {
            if !skill_set.contains(&id) {
                skill_set.push(id);
            }
        }

        Self {
            id: employee.id,
            last_name: employee.last_name.clone(),
            first_name: employee.first_name.clone(),
            street: employee.street.clone(),
            postcode: employee.postcode.clone(),
            city: employee.city.clone(),
            phone: employee.phone.clone(),
            skill_set,
        }
    }
}

/// Body for creating a skill or assigning one by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillName {
    pub skill: String,
}

/// Response of the employees-by-skill endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillHolders {
    pub skill: Skill,
    #[serde(default, deserialize_with = "null_as_default")]
    pub employees: Vec<Employee>,
}

/// Sort skills by label, keeping input order for equal labels
pub fn sort_skills_by_label(skills: &mut [Skill]) {
    skills.sort_by(|a, b| a.skill.cmp(&b.skill));
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
