/*!

In-memory implementations of the service traits so that the stages can be tested without AWS.
[`MockAws`] answers from fixture data and records every call it receives, in order, so that tests
can assert on exactly which mutating calls were made.

!*/

pub(crate) mod services;

use ami_refresh_agents::services::{
    ClusterDescription, ManagedParameter, NodegroupDescription, NodegroupLaunchTemplate, Page,
    PipelineImage, StackParameter, UpdateRecord,
};
use ami_refresh_agents::Error;
use chrono::{DateTime, Utc};
use maplit::hashmap;
use std::collections::HashMap;
use std::sync::Mutex;

pub(crate) const PIPELINE_ARN: &str =
    "arn:aws:imagebuilder:us-west-2:111122223333:image-pipeline/eks-nodes";
pub(crate) const RECIPE_ARN: &str =
    "arn:aws:imagebuilder:us-west-2:111122223333:image-recipe/eks-nodes/1.0.0";
pub(crate) const TOPIC_ARN: &str = "arn:aws:sns:us-west-2:111122223333:parent-image-updates";
pub(crate) const STATE_MACHINE_ARN: &str =
    "arn:aws:states:us-west-2:111122223333:stateMachine:ami-refresh";
pub(crate) const STACK_NAME: &str = "eks-ami-refresh";
pub(crate) const AL2023_PARAMETER: &str =
    "/aws/service/eks/optimized-ami/1.29/amazon-linux-2023/x86_64/standard/recommended/image_id";
pub(crate) const AL2_PARAMETER: &str =
    "/aws/service/eks/optimized-ami/1.29/amazon-linux-2/recommended/image_id";

/// A call received by [`MockAws`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Call {
    ListImagePipelineImages {
        pipeline_arn: String,
        max_results: i32,
    },
    GetImagePipeline {
        pipeline_arn: String,
    },
    GetImageRecipe {
        recipe_arn: String,
    },
    DescribeStacks {
        stack_name: String,
        next_token: Option<String>,
    },
    GetParameter {
        name: String,
    },
    ListClusters {
        next_token: Option<String>,
    },
    DescribeCluster {
        name: String,
    },
    ListNodegroups {
        cluster_name: String,
        next_token: Option<String>,
    },
    DescribeNodegroup {
        cluster_name: String,
        nodegroup_name: String,
    },
    UpdateNodegroupVersion {
        cluster_name: String,
        nodegroup_name: String,
        launch_template_id: String,
        version: String,
    },
    CreateLaunchTemplateVersion {
        launch_template_id: String,
        source_version: Option<String>,
        image_id: String,
        user_data: String,
    },
    DescribeLaunchTemplate {
        launch_template_id: String,
    },
    Publish {
        topic_arn: String,
        message: String,
    },
    StartExecution {
        state_machine_arn: String,
        input: String,
    },
}

/// A failure injected for one operation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum Failure {
    Rejected { code: String, message: String },
    Transport,
}

#[derive(Debug, Default)]
pub(crate) struct MockAws {
    pub(crate) images: Vec<PipelineImage>,
    pub(crate) parent_image: String,
    /// Stack parameters, one entry per page.
    pub(crate) stack_pages: Vec<Vec<StackParameter>>,
    pub(crate) managed_parameters: HashMap<String, ManagedParameter>,
    /// Cluster names, one entry per page.
    pub(crate) cluster_pages: Vec<Vec<String>>,
    pub(crate) clusters: HashMap<String, ClusterDescription>,
    /// Node group names per cluster, one entry per page.
    pub(crate) nodegroup_pages: HashMap<String, Vec<Vec<String>>>,
    pub(crate) nodegroups: HashMap<(String, String), NodegroupDescription>,
    pub(crate) update_record: UpdateRecord,
    /// The latest version number of each launch template.
    pub(crate) launch_templates: Mutex<HashMap<String, i64>>,
    pub(crate) failures: HashMap<&'static str, Failure>,
    pub(crate) calls: Mutex<Vec<Call>>,
}

impl MockAws {
    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    /// Returns the injected failure for `operation`, if any.
    pub(crate) fn check(&self, operation: &str) -> Result<(), Error> {
        match self.failures.get(operation) {
            None => Ok(()),
            Some(Failure::Rejected { code, message }) => Err(Error::ServiceRejected {
                operation: operation.to_string(),
                code: code.clone(),
                message: message.clone(),
            }),
            Some(Failure::Transport) => Err(Error::Transport {
                operation: operation.to_string(),
                message: "dispatch failure: connection reset".to_string(),
            }),
        }
    }

    pub(crate) fn fail(mut self, operation: &'static str, failure: Failure) -> Self {
        self.failures.insert(operation, failure);
        self
    }

    pub(crate) fn with_stack_parameter(mut self, key: &str, value: &str) -> Self {
        self.stack_pages.push(vec![StackParameter {
            key: key.to_string(),
            value: Some(value.to_string()),
        }]);
        self
    }

    pub(crate) fn with_cluster(mut self, cluster: ClusterDescription) -> Self {
        match self.cluster_pages.last_mut() {
            Some(page) => page.push(cluster.name.clone()),
            None => self.cluster_pages.push(vec![cluster.name.clone()]),
        }
        self.clusters.insert(cluster.name.clone(), cluster);
        self
    }

    pub(crate) fn with_nodegroup(mut self, nodegroup: NodegroupDescription) -> Self {
        let pages = self
            .nodegroup_pages
            .entry(nodegroup.cluster_name.clone())
            .or_default();
        match pages.last_mut() {
            Some(page) => page.push(nodegroup.name.clone()),
            None => pages.push(vec![nodegroup.name.clone()]),
        }
        self.nodegroups.insert(
            (nodegroup.cluster_name.clone(), nodegroup.name.clone()),
            nodegroup,
        );
        self
    }

    pub(crate) fn with_launch_template(self, id: &str, latest_version: i64) -> Self {
        self.launch_templates
            .lock()
            .unwrap()
            .insert(id.to_string(), latest_version);
        self
    }
}

/// Serves `pages` one at a time; the token is the index of the next page.
pub(crate) fn page<T: Clone>(pages: &[Vec<T>], next_token: Option<String>) -> Page<T> {
    let index = next_token
        .and_then(|token| token.parse::<usize>().ok())
        .unwrap_or(0);
    let items = pages.get(index).cloned().unwrap_or_default();
    let next_token = if index + 1 < pages.len() {
        Some((index + 1).to_string())
    } else {
        None
    };
    Page { items, next_token }
}

pub(crate) fn cluster(name: &str, tags: &[(&str, &str)], cidr: Option<&str>) -> ClusterDescription {
    ClusterDescription {
        name: name.to_string(),
        tags: tags
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect(),
        certificate_authority: Some(format!("{}-ca-data", name)),
        endpoint: Some(format!("https://{}.eks.us-west-2.amazonaws.com", name)),
        service_ipv4_cidr: cidr.map(String::from),
    }
}

pub(crate) fn nodegroup(
    cluster_name: &str,
    name: &str,
    launch_template_id: Option<&str>,
    release_version: &str,
    status: &str,
) -> NodegroupDescription {
    NodegroupDescription {
        name: name.to_string(),
        arn: Some(format!(
            "arn:aws:eks:us-west-2:111122223333:nodegroup/{}/{}/uuid",
            cluster_name, name
        )),
        cluster_name: cluster_name.to_string(),
        launch_template: launch_template_id.map(|id| NodegroupLaunchTemplate {
            id: Some(id.to_string()),
            name: Some(format!("{}-template", id)),
            version: Some("1".to_string()),
        }),
        release_version: Some(release_version.to_string()),
        status: Some(status.to_string()),
    }
}

pub(crate) fn image(version: &str, date_created: &str, status: &str) -> PipelineImage {
    PipelineImage {
        arn: Some(format!(
            "arn:aws:imagebuilder:us-west-2:111122223333:image/eks-nodes/{}",
            version
        )),
        version: version.to_string(),
        date_created: date_created.to_string(),
        status: Some(status.to_string()),
    }
}

/// A mock with one image pipeline and the AL2023 parameter behind the stack.
pub(crate) fn pipeline(images: Vec<PipelineImage>, parameter_modified: DateTime<Utc>) -> MockAws {
    let parameter = ManagedParameter {
        name: AL2023_PARAMETER.to_string(),
        value: "ami-0parent2".to_string(),
        last_modified: parameter_modified,
    };
    MockAws {
        images,
        parent_image: "ami-0parent1".to_string(),
        managed_parameters: hashmap! { AL2023_PARAMETER.to_string() => parameter },
        ..MockAws::default()
    }
    .with_stack_parameter("LatestEKSOptimizedAMI", AL2023_PARAMETER)
}
