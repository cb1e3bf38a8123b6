//! reqwest implementation of the remote employee service
//!
//! Provides an async HTTP client with:
//! - Bearer authentication from a pluggable token provider
//! - JSON bodies and content type on writes
//! - Status classification into not-found, client and server errors

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client as HttpClient, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::RemoteConfig;
use crate::error::{Error, Result};
use crate::model::{Employee, EmployeeId, EmployeePayload, Skill, SkillHolders, SkillId, SkillName};

use super::RemoteStore;
use super::token::{StaticTokenProvider, TokenProvider};

/// Default collection path for skills
const DEFAULT_SKILL_COLLECTION: &str = "skills";

const EMPLOYEE: &str = "Employee";
const SKILL: &str = "Skill";
const ASSIGNMENT: &str = "Assignment";

/// HTTP client for the employee service
#[derive(Clone)]
pub struct HttpRemoteStore {
    http_client: HttpClient,
    base_url: String,
    skill_collection: String,
    tokens: Arc<dyn TokenProvider>,
}

impl std::fmt::Debug for HttpRemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRemoteStore")
            .field("base_url", &self.base_url)
            .field("skill_collection", &self.skill_collection)
            .finish()
    }
}

/// Builder for creating an HttpRemoteStore
pub struct HttpRemoteStoreBuilder {
    config: Option<RemoteConfig>,
    base_url: Option<String>,
    skill_collection: Option<String>,
    tokens: Option<Arc<dyn TokenProvider>>,
    timeout_secs: Option<u64>,
}

impl Default for HttpRemoteStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpRemoteStoreBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            base_url: None,
            skill_collection: None,
            tokens: None,
            timeout_secs: None,
        }
    }

    /// Take base URL, collection and timeout from configuration
    pub fn config(mut self, config: RemoteConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Path segment of the skill collection (`skills` or `qualifications`)
    pub fn skill_collection(mut self, collection: impl Into<String>) -> Self {
        self.skill_collection = Some(collection.into());
        self
    }

    pub fn token_provider(mut self, tokens: Arc<dyn TokenProvider>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn build(self) -> Result<HttpRemoteStore> {
        let config = self.config.unwrap_or_default();
        config
            .enforce_env_only()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        let base_url = self
            .base_url
            .unwrap_or(config.base_url)
            .trim_end_matches('/')
            .to_string();
        if base_url.is_empty() {
            return Err(Error::ConfigError("base URL is required".to_string()));
        }

        let skill_collection = self
            .skill_collection
            .unwrap_or(config.skill_collection)
            .trim_matches('/')
            .to_string();
        let skill_collection = if skill_collection.is_empty() {
            DEFAULT_SKILL_COLLECTION.to_string()
        } else {
            skill_collection
        };

        let timeout_secs = self.timeout_secs.unwrap_or(config.timeout_secs);

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(Error::NetworkError)?;

        Ok(HttpRemoteStore {
            http_client,
            base_url,
            skill_collection,
            tokens: self
                .tokens
                .unwrap_or_else(|| Arc::new(StaticTokenProvider::anonymous())),
        })
    }
}

impl HttpRemoteStore {
    /// Client against the default local service without credentials
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        HttpRemoteStoreBuilder::new().base_url(base_url).build()
    }

    pub fn builder() -> HttpRemoteStoreBuilder {
        HttpRemoteStoreBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn skills_path(&self) -> String {
        format!("/{}", self.skill_collection)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let is_write = method != Method::GET;
        let mut builder = self.http_client.request(method, self.url(path));
        if let Some(token) = self.tokens.access_token() {
            builder = builder.bearer_auth(token);
        }
        if is_write {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        builder
    }

    /// Send and turn non-success statuses into classified errors
    async fn execute(
        &self,
        builder: RequestBuilder,
        resource: &'static str,
        id: Option<String>,
    ) -> Result<Response> {
        let response = builder.send().await.map_err(Error::NetworkError)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), resource, "Employee service rejected request");
            return Err(Error::from_status(status.as_u16(), resource, id, body));
        }

        Ok(response)
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        resource: &'static str,
        id: Option<String>,
    ) -> Result<T> {
        let response = self.execute(builder, resource, id).await?;
        response
            .json()
            .await
            .map_err(|e| Error::Decode(format!("{} response: {}", resource, e)))
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn list_employees(&self) -> Result<Vec<Employee>> {
        debug!("Listing employees");
        self.fetch_json(self.request(Method::GET, "/employees"), EMPLOYEE, None)
            .await
    }

    async fn get_employee(&self, id: EmployeeId) -> Result<Employee> {
        let path = format!("/employees/{}", id);
        self.fetch_json(self.request(Method::GET, &path), EMPLOYEE, Some(id.to_string()))
            .await
    }

    async fn create_employee(&self, employee: &EmployeePayload) -> Result<Employee> {
        let builder = self.request(Method::POST, "/employees").json(employee);
        self.fetch_json(builder, EMPLOYEE, None).await
    }

    async fn update_employee(&self, id: EmployeeId, employee: &EmployeePayload) -> Result<Employee> {
        let path = format!("/employees/{}", id);
        let builder = self.request(Method::PUT, &path).json(employee);
        self.fetch_json(builder, EMPLOYEE, Some(id.to_string())).await
    }

    async fn delete_employee(&self, id: EmployeeId) -> Result<()> {
        let path = format!("/employees/{}", id);
        self.execute(self.request(Method::DELETE, &path), EMPLOYEE, Some(id.to_string()))
            .await?;
        Ok(())
    }

    async fn list_skills(&self) -> Result<Vec<Skill>> {
        debug!(collection = %self.skill_collection, "Listing skills");
        self.fetch_json(self.request(Method::GET, &self.skills_path()), SKILL, None)
            .await
    }

    async fn create_skill(&self, name: &str) -> Result<Skill> {
        let body = SkillName {
            skill: name.to_string(),
        };
        let builder = self.request(Method::POST, &self.skills_path()).json(&body);
        self.fetch_json(builder, SKILL, None).await
    }

    async fn update_skill(&self, id: SkillId, skill: &Skill) -> Result<Skill> {
        let path = format!("{}/{}", self.skills_path(), id);
        let builder = self.request(Method::PUT, &path).json(skill);
        self.fetch_json(builder, SKILL, Some(id.to_string())).await
    }

    async fn delete_skill(&self, id: SkillId) -> Result<()> {
        let path = format!("{}/{}", self.skills_path(), id);
        self.execute(self.request(Method::DELETE, &path), SKILL, Some(id.to_string()))
            .await?;
        Ok(())
    }

    async fn employees_by_skill(&self, id: SkillId) -> Result<SkillHolders> {
        let path = format!("{}/{}/employees", self.skills_path(), id);
        self.fetch_json(self.request(Method::GET, &path), SKILL, Some(id.to_string()))
            .await
    }

    async fn employee_skills(&self, employee_id: EmployeeId) -> Result<Employee> {
        let path = format!("/employees/{}/{}", employee_id, self.skill_collection);
        self.fetch_json(
            self.request(Method::GET, &path),
            EMPLOYEE,
            Some(employee_id.to_string()),
        )
        .await
    }

    async fn assign_skill(&self, employee_id: EmployeeId, skill_name: &str) -> Result<()> {
        let path = format!("/employees/{}/{}", employee_id, self.skill_collection);
        let body = SkillName {
            skill: skill_name.to_string(),
        };
        let builder = self.request(Method::POST, &path).json(&body);
        self.execute(builder, EMPLOYEE, Some(employee_id.to_string()))
            .await?;
        Ok(())
    }

    async fn unassign_skill(&self, employee_id: EmployeeId, skill_id: SkillId) -> Result<()> {
        let path = format!(
            "/employees/{}/{}/{}",
            employee_id, self.skill_collection, skill_id
        );
        // A 404 here may mean either side is missing
        self.execute(
            self.request(Method::DELETE, &path),
            ASSIGNMENT,
            Some(assignment_id(employee_id, skill_id)),
        )
        .await?;
        Ok(())
    }
}

fn assignment_id(employee_id: EmployeeId, skill_id: SkillId) -> String {
    format!("employee {} / skill {}", employee_id, skill_id)
}
