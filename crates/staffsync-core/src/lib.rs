//! Staffsync Core Library
//!
//! This crate provides the synchronized data layer for the employee/skill
//! service, including:
//! - Remote access to the employee service (REST over reqwest)
//! - Observable snapshot caches for employees and skills
//! - Stores that re-fetch after every write
//! - The skill selection filter
//! - Derived views (usage counts, filtering, sorting, assignable skills)
//! - Cascading skill deletion
//! - User-facing notices

pub mod cache;
pub mod cascade;
pub mod config;
pub mod error;
pub mod model;
pub mod notice;
pub mod relations;
pub mod remote;
pub mod selection;
pub mod stores;

use std::sync::Arc;

use tracing::info;

use crate::cascade::CascadeDeleteCoordinator;
use crate::config::Config;
use crate::relations::RelationshipView;
use crate::remote::{EnvTokenProvider, HttpRemoteStore, RemoteStore, TokenProvider};
use crate::selection::SelectionState;
use crate::stores::{EmployeeStore, FetchOutcome, SkillStore};

pub use error::{Error, ErrorKind, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::DataLayer;
    pub use crate::cascade::{CascadeDeleteCoordinator, CascadeReport};
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::model::{Employee, EmployeeId, Skill, SkillId, SkillRef};
    pub use crate::notice::{Notice, Severity};
    pub use crate::relations::{RelationshipView, RosterQuery, SortColumn, SortDirection, SortSpec};
    pub use crate::remote::RemoteStore;
    pub use crate::selection::SelectionState;
    pub use crate::stores::{EmployeeStore, FetchOutcome, SkillStore};
}

/// Every store and view of one application, wired once
///
/// Clones share the same caches.
#[derive(Debug, Clone)]
pub struct DataLayer {
    employees: Arc<EmployeeStore>,
    skills: Arc<SkillStore>,
    selection: Arc<SelectionState>,
    view: RelationshipView,
    cascade: CascadeDeleteCoordinator,
}

impl DataLayer {
    /// Wire the layer over any remote store
    pub fn new(remote: Arc<dyn RemoteStore>, config: &Config) -> Self {
        let capacity = config.cache.channel_capacity;
        let employees = Arc::new(EmployeeStore::with_capacity(remote.clone(), capacity));
        let skills = Arc::new(SkillStore::with_capacity(remote, employees.clone(), capacity));
        let selection = Arc::new(SelectionState::new());
        let view = RelationshipView::new(employees.clone(), skills.clone(), selection.clone());
        let cascade = CascadeDeleteCoordinator::new(employees.clone(), skills.clone())
            .with_max_attempts(config.cascade.max_attempts);

        Self {
            employees,
            skills,
            selection,
            view,
            cascade,
        }
    }

    /// Wire the layer over the HTTP service named in `config`
    pub fn connect(config: &Config, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        let remote = HttpRemoteStore::builder()
            .config(config.remote.clone())
            .token_provider(tokens)
            .build()?;
        info!(base_url = %remote.base_url(), "Connected data layer");
        Ok(Self::new(Arc::new(remote), config))
    }

    /// [`DataLayer::connect`] with the token taken from the environment
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::connect(config, Arc::new(EnvTokenProvider::default()))
    }

    /// Fetch skills and employees concurrently
    pub async fn load_all(&self) -> (FetchOutcome, FetchOutcome) {
        let (employees, skills) = tokio::join!(self.employees.fetch_all(), self.skills.fetch_all());
        (employees, skills)
    }

    pub fn employees(&self) -> &Arc<EmployeeStore> {
        &self.employees
    }

    pub fn skills(&self) -> &Arc<SkillStore> {
        &self.skills
    }

    pub fn selection(&self) -> &Arc<SelectionState> {
        &self.selection
    }

    pub fn view(&self) -> &RelationshipView {
        &self.view
    }

    pub fn cascade(&self) -> &CascadeDeleteCoordinator {
        &self.cascade
    }
}
