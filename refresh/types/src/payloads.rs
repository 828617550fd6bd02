use serde::{Deserialize, Deserializer, Serialize};
use serde_plain::{derive_display_from_serialize, derive_fromstr_from_deserialize};
use std::collections::BTreeSet;

/// The cluster tag key and value pair used to select clusters. The field casing matches the
/// tag lists produced by CloudFormation and the AWS CLI.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl Tag {
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// The tags a cluster must carry to be refreshed. An empty set accepts every cluster.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RequiredTags(BTreeSet<(String, String)>);

impl RequiredTags {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether every required pair is present in `tags`.
    pub fn matches<'a, I>(&self, tags: I) -> bool
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        if self.0.is_empty() {
            return true;
        }
        let present: BTreeSet<(&str, &str)> = tags
            .into_iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        self.0
            .iter()
            .all(|(k, v)| present.contains(&(k.as_str(), v.as_str())))
    }
}

impl<'a> FromIterator<&'a Tag> for RequiredTags {
    fn from_iter<T: IntoIterator<Item = &'a Tag>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|tag| (tag.key.clone(), tag.value.clone()))
                .collect(),
        )
    }
}

/// Input of the node group discovery agent.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryRequest {
    /// The image that new launch template versions will boot.
    pub image_id: String,
    /// Missing or `null` tags select every cluster.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<Tag>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The launch template a node group references.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchTemplateRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The version the node group used when it was discovered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A node group paired with the launch template version it should be moved to. This is both an
/// element of the discovery output and the input of the node group update agent.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroupTarget {
    pub launch_template: LaunchTemplateRef,
    pub cluster_name: String,
    pub nodegroup_name: String,
    /// The launch template version to apply.
    pub version: String,
}

/// The outcome of comparing the pipeline's last image with the published parent image.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FreshnessDecision {
    UpdateAvailable,
    UpToDate,
}

derive_display_from_serialize!(FreshnessDecision);
derive_fromstr_from_deserialize!(FreshnessDecision);

impl FreshnessDecision {
    pub fn message(&self) -> &'static str {
        match self {
            FreshnessDecision::UpdateAvailable => {
                "A new version of the parent image for your pipeline is available"
            }
            FreshnessDecision::UpToDate => "Parent image is up to date",
        }
    }
}

/// The notification published by the image freshness agent.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FreshnessNotification {
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Parent image SSM Parameter path")]
    pub parameter_path: String,
    #[serde(rename = "New parent image AMI ID")]
    pub parameter_value: String,
    #[serde(rename = "Parent image last modified date")]
    pub parameter_last_modified: String,
    #[serde(rename = "Current parent image AMI ID")]
    pub current_parent_image: String,
    #[serde(rename = "Image Pipeline last image build date")]
    pub last_build_date: String,
    #[serde(rename = "Image Pipeline ARN")]
    pub pipeline_arn: String,
}

/// The response of the image freshness agent.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreshnessReport {
    pub decision: FreshnessDecision,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    pub notification: FreshnessNotification,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateParam {
    #[serde(rename = "type")]
    pub param_type: Option<String>,
    pub value: Option<String>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateErrorDetail {
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    #[serde(default)]
    pub resource_ids: Vec<String>,
}

/// A node group update as reported by the cluster control plane, with its creation time already
/// rendered as an RFC 3339 string.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeGroupUpdate {
    pub id: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub update_type: Option<String>,
    #[serde(default)]
    pub params: Vec<UpdateParam>,
    pub created_at: Option<String>,
    #[serde(default)]
    pub errors: Vec<UpdateErrorDetail>,
}

/// The response of the node group update agent.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct NodeGroupUpdateReport {
    pub update: NodeGroupUpdate,
}

/// The notification envelope delivered to the build notification agent.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    #[serde(rename = "Records")]
    pub records: Vec<NotificationRecord>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    #[serde(rename = "Sns")]
    pub sns: NotificationBody,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct NotificationBody {
    /// The image build message, itself serialized as JSON.
    #[serde(rename = "Message")]
    pub message: String,
}

/// The image state message published by the image build pipeline.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageBuildMessage {
    pub state: ImageState,
    #[serde(default)]
    pub output_resources: OutputResources,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ImageState {
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct OutputResources {
    #[serde(default)]
    pub amis: Vec<OutputAmi>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct OutputAmi {
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// The input handed to the refresh workflow. It is the discovery agent's input.
pub type WorkflowInput = DiscoveryRequest;

/// The response of the build notification agent.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ForwardOutcome {
    #[serde(rename_all = "camelCase")]
    Triggered { execution_arn: String },
    /// The build did not produce an image. The status travels with the reason so the workflow can
    /// tell a failed build from a cancelled one when no reason is given.
    #[serde(rename_all = "camelCase")]
    Skipped {
        image_status: String,
        reason: Option<String>,
    },
}
