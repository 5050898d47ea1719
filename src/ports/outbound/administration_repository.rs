use super::ListQuery;
use crate::scanning::domain::{
    Label, LabelRequest, LabelScope, Registry, RegistryRequest, ReplicationExecution,
    ReplicationPolicy, User, UserRequest,
};
use crate::shared::Result;

/// Filters for the label listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFilter {
    pub page: u32,
    pub page_size: u32,
    pub name: Option<String>,
    pub scope: Option<LabelScope>,
    /// Required by Harbor when `scope` is project
    pub project_id: Option<i64>,
}

impl Default for LabelFilter {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
            name: None,
            scope: None,
            project_id: None,
        }
    }
}

/// AdministrationRepository port for registry endpoints, replication, users and labels
///
/// Create operations return the stored object as read back from the
/// server, so callers see server-assigned ids and defaults.
pub trait AdministrationRepository {
    /// Every registry endpoint, optionally narrowed by a Harbor query
    fn list_registries(&self, query: Option<&str>) -> Result<Vec<Registry>>;

    fn get_registry(&self, id: i64) -> Result<Registry>;

    fn create_registry(&self, request: &RegistryRequest) -> Result<Registry>;

    fn delete_registry(&self, id: i64) -> Result<()>;

    /// Asks Harbor to connect to an endpoint without saving it
    fn ping_registry(&self, request: &RegistryRequest) -> Result<()>;

    fn list_replication_policies(&self) -> Result<Vec<ReplicationPolicy>>;

    fn get_replication_policy(&self, id: i64) -> Result<ReplicationPolicy>;

    /// Starts a manual run of a policy
    fn start_replication(&self, policy_id: i64) -> Result<ReplicationExecution>;

    /// # Arguments
    /// * `policy_id` - Restricts the listing to one policy
    fn list_replication_executions(
        &self,
        policy_id: Option<i64>,
        query: &ListQuery,
    ) -> Result<Vec<ReplicationExecution>>;

    fn get_replication_execution(&self, id: i64) -> Result<ReplicationExecution>;

    /// One page of users; `query.query` is a username search
    fn list_users(&self, query: &ListQuery) -> Result<Vec<User>>;

    fn create_user(&self, request: &UserRequest) -> Result<User>;

    fn set_sysadmin(&self, user_id: i64, sysadmin: bool) -> Result<()>;

    fn delete_user(&self, user_id: i64) -> Result<()>;

    fn list_labels(&self, filter: &LabelFilter) -> Result<Vec<Label>>;

    fn get_label(&self, id: i64) -> Result<Label>;

    fn create_label(&self, request: &LabelRequest) -> Result<Label>;

    fn update_label(&self, id: i64, request: &LabelRequest) -> Result<()>;

    fn delete_label(&self, id: i64) -> Result<()>;
}
