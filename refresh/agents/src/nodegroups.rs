use crate::error::Result;
use crate::freshness::format_timestamp;
use crate::services::{ClusterService, UpdateRecord};
use ami_refresh_types::{
    NodeGroupTarget, NodeGroupUpdate, NodeGroupUpdateReport, UpdateErrorDetail, UpdateParam,
};
use log::info;

/// Converts an update record for transport, rendering its creation time as RFC 3339.
pub fn normalize_update(record: UpdateRecord) -> NodeGroupUpdate {
    NodeGroupUpdate {
        id: record.id,
        status: record.status,
        update_type: record.update_type,
        params: record
            .params
            .into_iter()
            .map(|(param_type, value)| UpdateParam { param_type, value })
            .collect(),
        created_at: record.created_at.as_ref().map(format_timestamp),
        errors: record
            .errors
            .into_iter()
            .map(|error| UpdateErrorDetail {
                error_code: error.error_code,
                error_message: error.error_message,
                resource_ids: error.resource_ids,
            })
            .collect(),
    }
}

/// Moves a node group to the launch template version discovery resolved for it.
pub async fn apply_launch_template_version<C>(
    clusters: &C,
    target: &NodeGroupTarget,
) -> Result<NodeGroupUpdateReport>
where
    C: ClusterService + ?Sized,
{
    info!(
        "Updating node group '{}' in cluster '{}' to version {} of launch template '{}'",
        target.nodegroup_name, target.cluster_name, target.version, target.launch_template.id
    );
    let record = clusters
        .update_nodegroup_version(
            &target.cluster_name,
            &target.nodegroup_name,
            &target.launch_template.id,
            &target.version,
        )
        .await?;
    let update = normalize_update(record);
    info!(
        "Update '{}' is '{}'",
        update.id.as_deref().unwrap_or("unknown"),
        update.status.as_deref().unwrap_or("unknown")
    );
    Ok(NodeGroupUpdateReport { update })
}
