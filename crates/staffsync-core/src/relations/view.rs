//! Reactive recomputation of the derived views

use std::collections::BTreeSet;
use std::pin::Pin;
use std::sync::Arc;

use futures_core::Stream;
use futures_util::StreamExt;
use futures_util::stream::select;

use crate::cache::Snapshot;
use crate::model::{Employee, Skill, SkillId};
use crate::selection::SelectionState;
use crate::stores::{EmployeeStore, SkillStore};

use super::{
    SkillSearch, SkillUsage, SortSpec, assignable_skills, filter_by_skills, filter_by_text,
    search_skills, skill_usage, sort_employees,
};

/// Stream of recomputed derived values
pub type ViewStream<T> = Pin<Box<dyn Stream<Item = T> + Send>>;

/// How the employee list is narrowed and ordered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterQuery {
    pub sort: SortSpec,
    /// Free-text filter over name and address; empty keeps everyone
    pub text: String,
}

impl RosterQuery {
    pub fn sorted(sort: SortSpec) -> Self {
        Self {
            sort,
            text: String::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

/// The three inputs every derived view is computed from
#[derive(Debug, Clone)]
pub struct ViewInputs {
    pub employees: Snapshot<Employee>,
    pub skills: Snapshot<Skill>,
    pub selection: BTreeSet<SkillId>,
}

impl ViewInputs {
    /// Employees matching the selection and text, in query order
    pub fn roster(&self, query: &RosterQuery) -> Vec<Employee> {
        let selected = filter_by_skills(&self.employees, &self.selection);
        let matching = filter_by_text(&selected, &query.text);
        sort_employees(&matching, &query.sort)
    }

    pub fn usage(&self) -> Vec<SkillUsage> {
        skill_usage(&self.skills, &self.employees)
    }

    pub fn assignable_for(&self, employee: &Employee) -> Vec<Skill> {
        assignable_skills(&self.skills, employee)
    }

    pub fn search(&self, employee: &Employee, text: &str) -> SkillSearch {
        search_skills(&self.skills, employee, text)
    }
}

enum Change {
    Employees(Snapshot<Employee>),
    Skills(Snapshot<Skill>),
    Selection(Snapshot<SkillId>),
}

/// Joins the employee and skill caches with the selection
///
/// Holds no state of its own; every value is computed from the latest
/// snapshots.
#[derive(Debug, Clone)]
pub struct RelationshipView {
    employees: Arc<EmployeeStore>,
    skills: Arc<SkillStore>,
    selection: Arc<SelectionState>,
}

impl RelationshipView {
    pub fn new(
        employees: Arc<EmployeeStore>,
        skills: Arc<SkillStore>,
        selection: Arc<SelectionState>,
    ) -> Self {
        Self {
            employees,
            skills,
            selection,
        }
    }

    /// Latest inputs, read without any network activity
    pub fn inputs(&self) -> ViewInputs {
        ViewInputs {
            employees: self.employees.current(),
            skills: self.skills.current(),
            selection: self.selection.current(),
        }
    }

    pub fn roster(&self, query: &RosterQuery) -> Vec<Employee> {
        self.inputs().roster(query)
    }

    pub fn usage(&self) -> Vec<SkillUsage> {
        self.inputs().usage()
    }

    pub fn assignable_for(&self, employee: &Employee) -> Vec<Skill> {
        self.inputs().assignable_for(employee)
    }

    pub fn search(&self, employee: &Employee, text: &str) -> SkillSearch {
        self.inputs().search(employee, text)
    }

    /// Inputs now, then again after every change to any of them
    pub fn observe_inputs(&self) -> ViewStream<ViewInputs> {
        let mut employees = self.employees.observe();
        let mut skills = self.skills.observe();
        let mut selection = self.selection.observe();

        Box::pin(async_stream::stream! {
            // Each observation replays its current value immediately
            let (Some(e), Some(s), Some(sel)) =
                (employees.next().await, skills.next().await, selection.next().await)
            else {
                return;
            };

            let mut inputs = ViewInputs {
                employees: e,
                skills: s,
                selection: sel.iter().copied().collect(),
            };
            yield inputs.clone();

            let mut changes = select(
                select(employees.map(Change::Employees), skills.map(Change::Skills)),
                selection.map(Change::Selection),
            );

            while let Some(change) = changes.next().await {
                match change {
                    Change::Employees(e) => inputs.employees = e,
                    Change::Skills(s) => inputs.skills = s,
                    Change::Selection(sel) => inputs.selection = sel.iter().copied().collect(),
                }
                yield inputs.clone();
            }
        })
    }

    /// The filtered, sorted employee list, recomputed on every input change
    pub fn observe_roster(&self, query: RosterQuery) -> ViewStream<Vec<Employee>> {
        Box::pin(self.observe_inputs().map(move |inputs| inputs.roster(&query)))
    }

    /// Usage counts per skill, recomputed on every input change
    pub fn observe_usage(&self) -> ViewStream<Vec<SkillUsage>> {
        Box::pin(self.observe_inputs().map(|inputs| inputs.usage()))
    }
}
