use crate::scanning::domain::{HealthStatus, Project, ProjectRequest, Repository, SystemInfo, Tag};
use crate::shared::Result;

/// Paging and search parameters for catalog listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub page_size: u32,
    /// Harbor query expression, e.g. `name=~nginx`
    pub query: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            query: None,
        }
    }
}

/// CatalogRepository port for project, repository, tag and system endpoints
pub trait CatalogRepository {
    fn list_projects(&self, query: &ListQuery) -> Result<Vec<Project>>;

    fn get_project(&self, name: &str) -> Result<Project>;

    /// `Ok(false)` when the server answers 404
    fn project_exists(&self, name: &str) -> Result<bool>;

    fn create_project(&self, request: &ProjectRequest) -> Result<()>;

    /// Applies only the fields set in `request`
    fn update_project(&self, name: &str, request: &ProjectRequest) -> Result<()>;

    fn delete_project(&self, name: &str) -> Result<()>;

    /// Lists one page of repositories under a project
    fn list_repositories_page(&self, project: &str, query: &ListQuery) -> Result<Vec<Repository>>;

    fn get_repository(&self, project: &str, repository: &str) -> Result<Repository>;

    fn delete_repository(&self, project: &str, repository: &str) -> Result<()>;

    /// Tags of one page of artifacts, in artifact order
    fn list_tags(&self, project: &str, repository: &str, query: &ListQuery) -> Result<Vec<Tag>>;

    /// Deletes one artifact together with all of its tags
    fn delete_artifact(&self, project: &str, repository: &str, reference: &str) -> Result<()>;

    /// # Arguments
    /// * `with_storage` - Also fetch registry storage volumes
    fn system_info(&self, with_storage: bool) -> Result<SystemInfo>;

    fn health(&self) -> Result<HealthStatus>;
}
