/*!

Cluster and node group discovery: which clusters carry the required tags and an IPv4 service
CIDR, and which of their node groups are active, custom-AMI, launch template backed node groups.

!*/

use crate::constants::{CLUSTER_DNS_LAST_OCTET, CUSTOM_AMI_RELEASE_PREFIX, NODEGROUP_STATUS_ACTIVE};
use crate::error::{self, Result};
use crate::services::{ClusterDescription, ClusterService, NodegroupDescription};
use ami_refresh_types::{LaunchTemplateRef, RequiredTags};
use log::{debug, info};
use snafu::OptionExt;
use std::net::Ipv4Addr;

/// What a node group's boot configuration needs to know about its cluster.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClusterSummary {
    pub name: String,
    pub certificate_authority: String,
    pub endpoint: String,
    pub dns_ip: String,
    pub service_cidr: String,
}

/// A node group that will be moved to a new launch template version.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NodeGroupDescriptor {
    pub launch_template: LaunchTemplateRef,
    pub nodegroup_name: String,
    pub nodegroup_arn: Option<String>,
    pub cluster: ClusterSummary,
}

/// Derives the cluster DNS IP from an IPv4 service CIDR: the network address with its last octet
/// replaced by `10`, e.g. `10.100.0.0/16` becomes `10.100.0.10`. Host bits are masked off first,
/// so `10.100.5.0/16` also becomes `10.100.0.10`.
pub fn cluster_dns_ip(service_ipv4_cidr: &str) -> Result<String> {
    let mut parts = service_ipv4_cidr.splitn(2, '/');
    let address = parts
        .next()
        .and_then(|address| address.parse::<Ipv4Addr>().ok());
    let prefix_len = match parts.next() {
        Some(prefix) => prefix.parse::<u32>().ok().filter(|len| *len <= 32),
        None => Some(32),
    };
    let (address, prefix_len) = match (address, prefix_len) {
        (Some(address), Some(prefix_len)) => (address, prefix_len),
        _ => {
            return error::InvalidCidrSnafu {
                cidr: service_ipv4_cidr,
            }
            .fail()
        }
    };
    let mask = u32::MAX.checked_shl(32 - prefix_len).unwrap_or(0);
    let mut octets = Ipv4Addr::from(u32::from(address) & mask).octets();
    octets[3] = CLUSTER_DNS_LAST_OCTET;
    Ok(Ipv4Addr::from(octets).to_string())
}

/// Returns the summary of an eligible cluster, `None` for a cluster that should be skipped.
pub fn summarize_cluster(
    cluster: &ClusterDescription,
    required_tags: &RequiredTags,
) -> Result<Option<ClusterSummary>> {
    if !required_tags.matches(&cluster.tags) {
        info!("Skipping cluster '{}': required tags not present", cluster.name);
        return Ok(None);
    }
    let service_cidr = match cluster.service_ipv4_cidr.as_deref() {
        Some(cidr) if !cidr.is_empty() => cidr,
        _ => {
            info!("Skipping cluster '{}': no service IPv4 CIDR", cluster.name);
            return Ok(None);
        }
    };
    Ok(Some(ClusterSummary {
        name: cluster.name.clone(),
        certificate_authority: cluster.certificate_authority.clone().context(
            error::MissingSnafu {
                what: "certificate authority data",
                from: format!("cluster '{}'", cluster.name),
            },
        )?,
        endpoint: cluster.endpoint.clone().context(error::MissingSnafu {
            what: "endpoint",
            from: format!("cluster '{}'", cluster.name),
        })?,
        dns_ip: cluster_dns_ip(service_cidr)?,
        service_cidr: service_cidr.to_string(),
    }))
}

/// Whether a node group runs a custom AMI from a launch template and is ready to be updated.
pub fn is_eligible_nodegroup(nodegroup: &NodegroupDescription) -> bool {
    let has_launch_template = nodegroup
        .launch_template
        .as_ref()
        .and_then(|template| template.id.as_ref())
        .is_some();
    let custom_ami = nodegroup
        .release_version
        .as_deref()
        .map(|release| release.starts_with(CUSTOM_AMI_RELEASE_PREFIX))
        .unwrap_or(false);
    let active = nodegroup.status.as_deref() == Some(NODEGROUP_STATUS_ACTIVE);
    has_launch_template && custom_ami && active
}

/// Lists every cluster name, following pagination to the end.
pub async fn list_cluster_names<C>(clusters: &C) -> Result<Vec<String>>
where
    C: ClusterService + ?Sized,
{
    let mut names = Vec::new();
    let mut next_token = None;
    loop {
        let page = clusters.list_clusters(next_token).await?;
        names.extend(page.items);
        next_token = page.next_token;
        if next_token.is_none() {
            break;
        }
    }
    debug!("Found clusters: {:?}", names);
    Ok(names)
}

/// Describes every cluster and keeps the eligible ones.
pub async fn eligible_clusters<C>(
    clusters: &C,
    required_tags: &RequiredTags,
) -> Result<Vec<ClusterSummary>>
where
    C: ClusterService + ?Sized,
{
    let mut summaries = Vec::new();
    for name in list_cluster_names(clusters).await? {
        let cluster = clusters.describe_cluster(&name).await?;
        if let Some(summary) = summarize_cluster(&cluster, required_tags)? {
            info!("Cluster '{}' is eligible", summary.name);
            summaries.push(summary);
        }
    }
    Ok(summaries)
}

/// Lists and describes the node groups of `cluster`, keeping the eligible ones.
pub async fn eligible_nodegroups<C>(
    clusters: &C,
    cluster: &ClusterSummary,
) -> Result<Vec<NodeGroupDescriptor>>
where
    C: ClusterService + ?Sized,
{
    let mut names = Vec::new();
    let mut next_token = None;
    loop {
        let page = clusters.list_nodegroups(&cluster.name, next_token).await?;
        names.extend(page.items);
        next_token = page.next_token;
        if next_token.is_none() {
            break;
        }
    }

    let mut descriptors = Vec::new();
    for name in names {
        let nodegroup = clusters.describe_nodegroup(&cluster.name, &name).await?;
        if !is_eligible_nodegroup(&nodegroup) {
            info!(
                "Skipping node group '{}' in cluster '{}': release '{}', status '{}'",
                nodegroup.name,
                cluster.name,
                nodegroup.release_version.as_deref().unwrap_or("unknown"),
                nodegroup.status.as_deref().unwrap_or("unknown"),
            );
            continue;
        }
        // Eligibility guarantees the launch template id.
        let template = nodegroup.launch_template.unwrap_or_default();
        descriptors.push(NodeGroupDescriptor {
            launch_template: LaunchTemplateRef {
                id: template.id.unwrap_or_default(),
                name: template.name,
                version: template.version,
            },
            nodegroup_name: nodegroup.name,
            nodegroup_arn: nodegroup.arn,
            cluster: cluster.clone(),
        });
    }
    Ok(descriptors)
}
