/*!

Node group discovery: finds every eligible node group and gives each one a launch template
version that boots the new image.

Node groups that share a launch template share its new version. The first node group seen for a
template creates the version, with boot configuration generated from that node group's cluster;
later node groups only look up the template's latest version. A launch template is therefore
assumed to serve a single AMI family and a single cluster configuration. The set of processed
templates lives for one invocation, so two concurrent runs may each create a version.

!*/

use crate::clusters::{eligible_clusters, eligible_nodegroups, NodeGroupDescriptor};
use crate::error::Result;
use crate::services::{ClusterService, LaunchTemplateService, ParameterService};
use crate::stack::stack_parameter_value;
use crate::userdata::ImageFamily;
use ami_refresh_types::{DiscoveryRequest, NodeGroupTarget, RequiredTags};
use log::info;
use std::collections::HashSet;

/// What discovery needs to know about its environment.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DiscoveryConfig {
    pub stack_name: String,
    pub stack_parameter_key: String,
}

/// Finds the eligible node groups of every eligible cluster.
pub async fn discover_nodegroups<C>(
    clusters: &C,
    required_tags: &RequiredTags,
) -> Result<Vec<NodeGroupDescriptor>>
where
    C: ClusterService + ?Sized,
{
    let mut nodegroups = Vec::new();
    for cluster in eligible_clusters(clusters, required_tags).await? {
        let found = eligible_nodegroups(clusters, &cluster).await?;
        info!(
            "Cluster '{}' has {} eligible node group(s)",
            cluster.name,
            found.len()
        );
        nodegroups.extend(found);
    }
    Ok(nodegroups)
}

/// Resolves a new launch template version for every node group, creating at most one version per
/// launch template.
pub async fn resolve_launch_template_versions<L>(
    templates: &L,
    nodegroups: Vec<NodeGroupDescriptor>,
    image_id: &str,
    family: ImageFamily,
) -> Result<Vec<NodeGroupTarget>>
where
    L: LaunchTemplateService + ?Sized,
{
    let mut processed_templates = HashSet::new();
    let mut targets = Vec::with_capacity(nodegroups.len());
    for nodegroup in nodegroups {
        let template_id = nodegroup.launch_template.id.clone();
        let version = if processed_templates.insert(template_id.clone()) {
            let user_data = family.user_data(&nodegroup.cluster);
            let version = templates
                .create_launch_template_version(
                    &template_id,
                    nodegroup.launch_template.version.as_deref(),
                    image_id,
                    &user_data,
                )
                .await?;
            info!(
                "Created version {} of launch template '{}' for node group '{}'",
                version, template_id, nodegroup.nodegroup_name
            );
            version
        } else {
            let version = templates.latest_version_number(&template_id).await?;
            info!(
                "Reusing version {} of launch template '{}' for node group '{}'",
                version, template_id, nodegroup.nodegroup_name
            );
            version
        };
        targets.push(NodeGroupTarget {
            launch_template: nodegroup.launch_template,
            cluster_name: nodegroup.cluster.name,
            nodegroup_name: nodegroup.nodegroup_name,
            version: version.to_string(),
        });
    }
    Ok(targets)
}

/// Runs discovery for `request`. The AMI family is resolved before any launch template version is
/// created, so an unsupported family fails the run without side effects.
pub async fn discover<S>(
    services: &S,
    config: &DiscoveryConfig,
    request: &DiscoveryRequest,
) -> Result<Vec<NodeGroupTarget>>
where
    S: ClusterService + LaunchTemplateService + ParameterService + ?Sized,
{
    let required_tags: RequiredTags = request.tags.iter().collect();
    info!(
        "Discovering node groups for image '{}' with {} required tag(s)",
        request.image_id,
        required_tags.len()
    );
    let nodegroups = discover_nodegroups(services, &required_tags).await?;
    if nodegroups.is_empty() {
        info!("No eligible node groups found");
        return Ok(Vec::new());
    }

    let parameter_name =
        stack_parameter_value(services, &config.stack_name, &config.stack_parameter_key).await?;
    let family = ImageFamily::from_parameter_name(&parameter_name)?;
    info!(
        "Generating {:?} boot configuration from parameter '{}'",
        family, parameter_name
    );
    resolve_launch_template_versions(services, nodegroups, &request.image_id, family).await
}
