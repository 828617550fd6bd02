/*!

The external services the agents talk to, expressed as traits so that the stage logic can run
against the AWS implementations in [`crate::aws`] or against in-memory mocks in tests.

Every method is a single service call. Paging is left to the caller: list methods take the token
returned by the previous [`Page`] and the stage logic loops until no token is returned.

!*/

use crate::error::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// One page of a paginated listing.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

/// An image produced by a build pipeline.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PipelineImage {
    pub arn: Option<String>,
    pub version: String,
    /// Creation time as reported by the pipeline, e.g. `2024-01-01T00:00:00.000000+00:00`.
    pub date_created: String,
    pub status: Option<String>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StackParameter {
    pub key: String,
    pub value: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ManagedParameter {
    pub name: String,
    pub value: String,
    pub last_modified: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClusterDescription {
    pub name: String,
    pub tags: HashMap<String, String>,
    pub certificate_authority: Option<String>,
    pub endpoint: Option<String>,
    pub service_ipv4_cidr: Option<String>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NodegroupLaunchTemplate {
    pub id: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NodegroupDescription {
    pub name: String,
    pub arn: Option<String>,
    pub cluster_name: String,
    pub launch_template: Option<NodegroupLaunchTemplate>,
    pub release_version: Option<String>,
    pub status: Option<String>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UpdateRecord {
    pub id: Option<String>,
    pub status: Option<String>,
    pub update_type: Option<String>,
    pub params: Vec<(Option<String>, Option<String>)>,
    pub created_at: Option<DateTime<Utc>>,
    pub errors: Vec<UpdateErrorRecord>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UpdateErrorRecord {
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub resource_ids: Vec<String>,
}

/// The image build pipeline. Read only.
#[async_trait::async_trait]
pub trait ImagePipelineService: Send + Sync {
    /// The pipeline's most recent images, at most `max_results` of them.
    async fn list_pipeline_images(
        &self,
        pipeline_arn: &str,
        max_results: i32,
    ) -> Result<Vec<PipelineImage>>;

    /// The ARN of the recipe the pipeline builds.
    async fn pipeline_recipe_arn(&self, pipeline_arn: &str) -> Result<String>;

    /// The parent image declared by a recipe.
    async fn recipe_parent_image(&self, recipe_arn: &str) -> Result<String>;
}

/// Stack outputs and managed parameters.
#[async_trait::async_trait]
pub trait ParameterService: Send + Sync {
    async fn stack_parameters(
        &self,
        stack_name: &str,
        next_token: Option<String>,
    ) -> Result<Page<StackParameter>>;

    /// Reads a managed parameter, `None` when it does not exist.
    async fn managed_parameter(&self, name: &str) -> Result<Option<ManagedParameter>>;
}

/// The Kubernetes control plane service.
#[async_trait::async_trait]
pub trait ClusterService: Send + Sync {
    async fn list_clusters(&self, next_token: Option<String>) -> Result<Page<String>>;

    async fn describe_cluster(&self, name: &str) -> Result<ClusterDescription>;

    async fn list_nodegroups(
        &self,
        cluster_name: &str,
        next_token: Option<String>,
    ) -> Result<Page<String>>;

    async fn describe_nodegroup(
        &self,
        cluster_name: &str,
        nodegroup_name: &str,
    ) -> Result<NodegroupDescription>;

    /// Points a node group at a launch template version.
    async fn update_nodegroup_version(
        &self,
        cluster_name: &str,
        nodegroup_name: &str,
        launch_template_id: &str,
        version: &str,
    ) -> Result<UpdateRecord>;
}

/// Launch template versions in the compute service.
#[async_trait::async_trait]
pub trait LaunchTemplateService: Send + Sync {
    /// Creates a version from `source_version` with a new image and user data, returning the new
    /// version number.
    async fn create_launch_template_version(
        &self,
        launch_template_id: &str,
        source_version: Option<&str>,
        image_id: &str,
        user_data: &str,
    ) -> Result<i64>;

    async fn latest_version_number(&self, launch_template_id: &str) -> Result<i64>;
}

/// A fire-and-forget notification channel.
#[async_trait::async_trait]
pub trait NotificationService: Send + Sync {
    /// Publishes `message`, returning the message id when the service reports one.
    async fn publish(&self, topic_arn: &str, message: &str) -> Result<Option<String>>;
}

/// The workflow that runs discovery and the node group updates.
#[async_trait::async_trait]
pub trait WorkflowService: Send + Sync {
    /// Starts an execution with a JSON `input`, returning the execution ARN.
    async fn start_execution(&self, state_machine_arn: &str, input: &str) -> Result<String>;
}
