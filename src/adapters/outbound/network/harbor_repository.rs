use super::api_client::{artifact_path, repository_path, segment, with_query, HarborClient};
use crate::ports::outbound::{
    AdministrationRepository, ArtifactListOptions, ArtifactRepository, CatalogRepository,
    LabelFilter, ListQuery, ReportFetcher,
};
use crate::scanning::domain::{
    Artifact, HealthStatus, Label, LabelRequest, Project, ProjectRequest, Registry,
    RegistryRequest, ReplicationExecution, ReplicationPolicy, ReportMode, Repository,
    SbomDocument, SystemInfo, Tag, User, UserRequest, VulnerabilityReport,
};
use crate::shared::error::HarborError;
use crate::shared::Result;
use serde::de::DeserializeOwned;

/// HarborRepository adapter backed by the Harbor REST API
///
/// Implements every outbound Harbor port on top of one [`HarborClient`], so
/// a command builds a single instance and hands it to its use case.
pub struct HarborRepository {
    client: HarborClient,
}

impl HarborRepository {
    const PAGE_SIZE: usize = 100;

    pub fn new(client: HarborClient) -> Self {
        Self { client }
    }

    /// GETs every page of a list endpoint
    fn fetch_all<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        what: &str,
    ) -> Result<Vec<T>> {
        collect_pages(Self::PAGE_SIZE, |page| {
            let mut query = params.to_vec();
            query.push(("page", page.to_string()));
            query.push(("page_size", Self::PAGE_SIZE.to_string()));
            let batch: Option<Vec<T>> = self.client.get_json(&with_query(path, &query), what)?;
            Ok(batch.unwrap_or_default())
        })
    }

    /// GETs a single page; Harbor sends `null` for an empty list
    fn fetch_page<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        what: &str,
    ) -> Result<Vec<T>> {
        let items: Option<Vec<T>> = self.client.get_json(&with_query(path, params), what)?;
        Ok(items.unwrap_or_default())
    }
}

/// Calls `fetch` with pages 1, 2, ... until it returns fewer than `page_size` items
///
/// A full last page costs one extra call that comes back empty.
pub(crate) fn collect_pages<T, F>(page_size: usize, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(usize) -> Result<Vec<T>>,
{
    let mut items = Vec::new();
    for page in 1usize.. {
        let batch = fetch(page)?;
        let last = batch.len() < page_size;
        items.extend(batch);
        if last {
            break;
        }
    }
    Ok(items)
}

fn list_params(query: &ListQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("page", query.page.to_string()),
        ("page_size", query.page_size.to_string()),
    ];
    if let Some(q) = query.query.as_deref().filter(|q| !q.is_empty()) {
        params.push(("q", q.to_string()));
    }
    params
}

fn artifact_params(options: &ArtifactListOptions) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if options.with_tag {
        params.push(("with_tag", "true".to_string()));
    }
    if options.with_scan_overview {
        params.push(("with_scan_overview", "true".to_string()));
    }
    params
}

impl ReportFetcher for HarborRepository {
    fn list_repositories(&self, project: &str) -> Result<Vec<String>> {
        let path = format!("/projects/{}/repositories", segment(project));
        let repositories: Vec<Repository> = self.fetch_all(&path, &[], "repositories")?;
        Ok(repositories.into_iter().map(|r| r.name).collect())
    }

    fn list_artifacts(
        &self,
        project: &str,
        repository: &str,
        options: &ArtifactListOptions,
    ) -> Result<Vec<Artifact>> {
        let path = format!("{}/artifacts", repository_path(project, repository));
        self.fetch_all(&path, &artifact_params(options), "artifacts")
    }

    fn get_vulnerability_report(
        &self,
        project: &str,
        repository: &str,
        reference: &str,
    ) -> Result<VulnerabilityReport> {
        let path = format!(
            "{}/additions/vulnerabilities",
            artifact_path(project, repository, reference)
        );
        let body = self.client.get_value(&path, "vulnerability report")?;
        let report = VulnerabilityReport::from_response(body).map_err(|e| HarborError::Decode {
            what: "vulnerability report".to_string(),
            details: e.to_string(),
        })?;
        Ok(report.unwrap_or_default())
    }

    fn get_sbom(&self, project: &str, repository: &str, reference: &str) -> Result<SbomDocument> {
        let path = format!(
            "{}/additions/sbom",
            artifact_path(project, repository, reference)
        );
        Ok(SbomDocument(self.client.get_value(&path, "SBOM")?))
    }
}

impl ArtifactRepository for HarborRepository {
    fn get_artifact(
        &self,
        project: &str,
        repository: &str,
        reference: &str,
        options: &ArtifactListOptions,
    ) -> Result<Artifact> {
        let path = with_query(
            &artifact_path(project, repository, reference),
            &artifact_params(options),
        );
        self.client.get_json(&path, "artifact")
    }

    fn scan_artifact(
        &self,
        project: &str,
        repository: &str,
        reference: &str,
        scan_type: Option<ReportMode>,
    ) -> Result<()> {
        let path = format!("{}/scan", artifact_path(project, repository, reference));
        let body = scan_type.map(|mode| serde_json::json!({ "scan_type": mode.to_string() }));
        self.client.post(&path, body.as_ref())
    }
}

impl CatalogRepository for HarborRepository {
    fn list_projects(&self, query: &ListQuery) -> Result<Vec<Project>> {
        self.fetch_page("/projects", &list_params(query), "projects")
    }

    fn get_project(&self, name: &str) -> Result<Project> {
        self.client
            .get_json(&format!("/projects/{}", segment(name)), "project")
    }

    fn project_exists(&self, name: &str) -> Result<bool> {
        self.client.exists(&with_query(
            "/projects",
            &[("project_name", name.to_string())],
        ))
    }

    fn create_project(&self, request: &ProjectRequest) -> Result<()> {
        self.client
            .post("/projects", Some(&serde_json::to_value(request)?))
    }

    fn update_project(&self, name: &str, request: &ProjectRequest) -> Result<()> {
        self.client.put(
            &format!("/projects/{}", segment(name)),
            &serde_json::to_value(request)?,
        )
    }

    fn delete_project(&self, name: &str) -> Result<()> {
        self.client.delete(&format!("/projects/{}", segment(name)))
    }

    fn list_repositories_page(&self, project: &str, query: &ListQuery) -> Result<Vec<Repository>> {
        let path = format!("/projects/{}/repositories", segment(project));
        self.fetch_page(&path, &list_params(query), "repositories")
    }

    fn get_repository(&self, project: &str, repository: &str) -> Result<Repository> {
        self.client
            .get_json(&repository_path(project, repository), "repository")
    }

    fn delete_repository(&self, project: &str, repository: &str) -> Result<()> {
        self.client.delete(&repository_path(project, repository))
    }

    fn list_tags(&self, project: &str, repository: &str, query: &ListQuery) -> Result<Vec<Tag>> {
        let path = format!("{}/artifacts", repository_path(project, repository));
        let mut params = artifact_params(&ArtifactListOptions::tags_only());
        params.extend(list_params(query));
        let artifacts: Vec<Artifact> = self.fetch_page(&path, &params, "artifacts")?;
        Ok(artifacts.into_iter().flat_map(|a| a.tags).collect())
    }

    fn delete_artifact(&self, project: &str, repository: &str, reference: &str) -> Result<()> {
        self.client
            .delete(&artifact_path(project, repository, reference))
    }

    fn system_info(&self, with_storage: bool) -> Result<SystemInfo> {
        let params = if with_storage {
            vec![("with_storage", "true".to_string())]
        } else {
            Vec::new()
        };
        self.client
            .get_json(&with_query("/systeminfo", &params), "system info")
    }

    fn health(&self) -> Result<HealthStatus> {
        self.client.get_json("/health", "health status")
    }
}

impl AdministrationRepository for HarborRepository {
    fn list_registries(&self, query: Option<&str>) -> Result<Vec<Registry>> {
        let params: Vec<(&str, String)> = query
            .filter(|q| !q.is_empty())
            .map(|q| ("q", q.to_string()))
            .into_iter()
            .collect();
        self.fetch_all("/registries", &params, "registries")
    }

    fn get_registry(&self, id: i64) -> Result<Registry> {
        self.client
            .get_json(&format!("/registries/{}", id), "registry")
    }

    fn create_registry(&self, request: &RegistryRequest) -> Result<Registry> {
        let id = self
            .client
            .create("/registries", &serde_json::to_value(request)?, "registry")?;
        self.get_registry(id)
    }

    fn delete_registry(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("/registries/{}", id))
    }

    fn ping_registry(&self, request: &RegistryRequest) -> Result<()> {
        self.client
            .post("/registries/ping", Some(&serde_json::to_value(request)?))
    }

    fn list_replication_policies(&self) -> Result<Vec<ReplicationPolicy>> {
        self.fetch_all("/replication/policies", &[], "replication policies")
    }

    fn get_replication_policy(&self, id: i64) -> Result<ReplicationPolicy> {
        self.client.get_json(
            &format!("/replication/policies/{}", id),
            "replication policy",
        )
    }

    fn start_replication(&self, policy_id: i64) -> Result<ReplicationExecution> {
        let body = serde_json::json!({ "policy_id": policy_id });
        let id = self
            .client
            .create("/replication/executions", &body, "replication execution")?;
        self.get_replication_execution(id)
    }

    fn list_replication_executions(
        &self,
        policy_id: Option<i64>,
        query: &ListQuery,
    ) -> Result<Vec<ReplicationExecution>> {
        let mut params = list_params(query);
        if let Some(id) = policy_id {
            params.push(("policy_id", id.to_string()));
        }
        self.fetch_page("/replication/executions", &params, "replication executions")
    }

    fn get_replication_execution(&self, id: i64) -> Result<ReplicationExecution> {
        self.client.get_json(
            &format!("/replication/executions/{}", id),
            "replication execution",
        )
    }

    fn list_users(&self, query: &ListQuery) -> Result<Vec<User>> {
        let mut params = vec![
            ("page", query.page.to_string()),
            ("page_size", query.page_size.to_string()),
        ];
        match query.query.as_deref().filter(|q| !q.is_empty()) {
            Some(username) => {
                params.push(("username", username.to_string()));
                self.fetch_page("/users/search", &params, "users")
            }
            None => self.fetch_page("/users", &params, "users"),
        }
    }

    fn create_user(&self, request: &UserRequest) -> Result<User> {
        let id = self
            .client
            .create("/users", &serde_json::to_value(request)?, "user")?;
        self.client.get_json(&format!("/users/{}", id), "user")
    }

    fn set_sysadmin(&self, user_id: i64, sysadmin: bool) -> Result<()> {
        self.client.put(
            &format!("/users/{}/sysadmin", user_id),
            &serde_json::json!({ "sysadmin_flag": sysadmin }),
        )
    }

    fn delete_user(&self, user_id: i64) -> Result<()> {
        self.client.delete(&format!("/users/{}", user_id))
    }

    fn list_labels(&self, filter: &LabelFilter) -> Result<Vec<Label>> {
        self.fetch_page("/labels", &label_params(filter), "labels")
    }

    fn get_label(&self, id: i64) -> Result<Label> {
        self.client.get_json(&format!("/labels/{}", id), "label")
    }

    fn create_label(&self, request: &LabelRequest) -> Result<Label> {
        let id = self
            .client
            .create("/labels", &serde_json::to_value(request)?, "label")?;
        self.get_label(id)
    }

    fn update_label(&self, id: i64, request: &LabelRequest) -> Result<()> {
        self.client
            .put(&format!("/labels/{}", id), &serde_json::to_value(request)?)
    }

    fn delete_label(&self, id: i64) -> Result<()> {
        self.client.delete(&format!("/labels/{}", id))
    }
}

fn label_params(filter: &LabelFilter) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("page", filter.page.to_string()),
        ("page_size", filter.page_size.to_string()),
    ];
    if let Some(name) = filter.name.as_deref().filter(|n| !n.is_empty()) {
        params.push(("name", name.to_string()));
    }
    if let Some(scope) = filter.scope {
        params.push(("scope", scope.as_str().to_string()));
    }
    if let Some(id) = filter.project_id {
        params.push(("project_id", id.to_string()));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanning::domain::LabelScope;

    #[test]
    fn test_list_params_skip_empty_query() {
        let params = list_params(&ListQuery {
            query: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(
            params,
            vec![("page", "1".to_string()), ("page_size", "10".to_string())]
        );

        let params = list_params(&ListQuery {
            page: 2,
            page_size: 50,
            query: Some("name=~nginx".to_string()),
        });
        assert_eq!(params.last(), Some(&("q", "name=~nginx".to_string())));
    }

    /// Serves `sizes[n]` items for page `n + 1` and records each requested page
    fn paged(sizes: &[usize]) -> (Vec<usize>, Result<Vec<usize>>) {
        let mut pages = Vec::new();
        let result = collect_pages(100, |page| {
            pages.push(page);
            let size = sizes.get(page - 1).copied().unwrap_or(0);
            Ok((0..size).map(|i| (page - 1) * 100 + i).collect())
        });
        (pages, result)
    }

    #[test]
    fn test_collect_pages_stops_at_short_page() {
        let (pages, result) = paged(&[100, 100, 3]);
        let items = result.unwrap();
        assert_eq!(pages, vec![1, 2, 3]);
        assert_eq!(items.len(), 203);
        assert_eq!(items[0], 0);
        assert_eq!(items[202], 202);
    }

    #[test]
    fn test_collect_pages_full_last_page_needs_empty_page() {
        let (pages, result) = paged(&[100]);
        assert_eq!(pages, vec![1, 2]);
        assert_eq!(result.unwrap().len(), 100);
    }

    #[test]
    fn test_collect_pages_empty_first_page() {
        let (pages, result) = paged(&[]);
        assert_eq!(pages, vec![1]);
        assert!(result.unwrap().is_empty());
    }

    #[test]
    fn test_collect_pages_stops_on_error() {
        let mut calls = 0;
        let result: Result<Vec<u8>> = collect_pages(2, |page| {
            calls += 1;
            if page == 2 {
                anyhow::bail!("page 2 failed");
            }
            Ok(vec![1, 2])
        });
        assert!(result.unwrap_err().to_string().contains("page 2 failed"));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_label_params() {
        let params = label_params(&LabelFilter {
            name: Some("release".to_string()),
            scope: Some(LabelScope::Project),
            project_id: Some(4),
            ..Default::default()
        });
        assert_eq!(
            params,
            vec![
                ("page", "1".to_string()),
                ("page_size", "20".to_string()),
                ("name", "release".to_string()),
                ("scope", "p".to_string()),
                ("project_id", "4".to_string()),
            ]
        );
        assert_eq!(label_params(&LabelFilter::default()).len(), 2);
    }

    #[test]
    fn test_artifact_params() {
        assert!(artifact_params(&ArtifactListOptions::default()).is_empty());
        assert_eq!(
            artifact_params(&ArtifactListOptions::with_overview()),
            vec![
                ("with_tag", "true".to_string()),
                ("with_scan_overview", "true".to_string())
            ]
        );
        assert_eq!(artifact_params(&ArtifactListOptions::tags_only()).len(), 1);
    }
}
