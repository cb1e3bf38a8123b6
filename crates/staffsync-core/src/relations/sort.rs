//! Employee list ordering

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::Employee;

/// Column the employee list is sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    /// "last, first" compared as one string
    #[default]
    Name,
    FirstName,
    LastName,
    Street,
    Postcode,
    City,
    Phone,
    Id,
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Name => "name",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Street => "street",
            Self::Postcode => "postcode",
            Self::City => "city",
            Self::Phone => "phone",
            Self::Id => "id",
        };
        f.write_str(name)
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "name" => Ok(Self::Name),
            "first_name" | "firstname" => Ok(Self::FirstName),
            "last_name" | "lastname" => Ok(Self::LastName),
            "street" => Ok(Self::Street),
            "postcode" => Ok(Self::Postcode),
            "city" => Ok(Self::City),
            "phone" => Ok(Self::Phone),
            "id" => Ok(Self::Id),
            other => Err(format!("Unknown sort column: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Column plus direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    pub fn ascending(column: SortColumn) -> Self {
        Self::new(column, SortDirection::Asc)
    }

    pub fn descending(column: SortColumn) -> Self {
        Self::new(column, SortDirection::Desc)
    }

    /// Header click: the active column flips direction, another column starts ascending
    pub fn toggle(self, column: SortColumn) -> Self {
        if self.column == column {
            Self::new(column, self.direction.reversed())
        } else {
            Self::ascending(column)
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Number(i64),
    Text(String),
}

fn text_key(value: &Option<String>) -> Option<SortKey> {
    value.as_ref().map(|v| SortKey::Text(v.to_lowercase()))
}

fn sort_key(employee: &Employee, column: SortColumn) -> Option<SortKey> {
    match column {
        SortColumn::Name => {
            if employee.last_name.is_none() && employee.first_name.is_none() {
                return None;
            }
            let combined = format!(
                "{}, {}",
                employee.last_name.as_deref().unwrap_or(""),
                employee.first_name.as_deref().unwrap_or("")
            );
            Some(SortKey::Text(combined.to_lowercase()))
        }
        SortColumn::FirstName => text_key(&employee.first_name),
        SortColumn::LastName => text_key(&employee.last_name),
        SortColumn::Street => text_key(&employee.street),
        SortColumn::Postcode => text_key(&employee.postcode),
        SortColumn::City => text_key(&employee.city),
        SortColumn::Phone => text_key(&employee.phone),
        SortColumn::Id => employee.id.map(SortKey::Number),
    }
}

/// Stable sort by the chosen column
///
/// Missing values always come last; the direction only orders the present ones.
pub fn sort_employees(employees: &[Employee], spec: &SortSpec) -> Vec<Employee> {
    let mut keyed: Vec<(Option<SortKey>, &Employee)> = employees
        .iter()
        .map(|e| (sort_key(e, spec.column), e))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match spec.direction {
            SortDirection::Asc => a.cmp(b),
            SortDirection::Desc => b.cmp(a),
        },
    });

    keyed.into_iter().map(|(_, e)| e.clone()).collect()
}
