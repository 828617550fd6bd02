/*!

AWS SDK implementations of the service traits. Each method is one SDK call; SDK errors are
classified into service rejections and transport failures by [`SdkResultExt`].

!*/

use crate::error::{self, Error, Result};
use crate::services::{
    ClusterDescription, ClusterService, ImagePipelineService, LaunchTemplateService,
    ManagedParameter, NodegroupDescription, NodegroupLaunchTemplate, NotificationService, Page,
    ParameterService, PipelineImage, StackParameter, UpdateErrorRecord, UpdateRecord,
    WorkflowService,
};
use aws_sdk_ec2::model::RequestLaunchTemplateData;
use aws_sdk_eks::model::LaunchTemplateSpecification;
use aws_sdk_eks::types::SdkError;
use aws_smithy_types::retry::ProvideErrorKind;
use aws_types::SdkConfig;
use chrono::{DateTime, TimeZone, Utc};
use log::trace;
use snafu::OptionExt;

/// Converts SDK results into agent errors, naming the operation that failed.
pub(crate) trait SdkResultExt<T> {
    fn operation(self, operation: &str) -> Result<T>;
}

impl<T, E> SdkResultExt<T> for std::result::Result<T, SdkError<E>>
where
    E: ProvideErrorKind + std::error::Error + Send + Sync + 'static,
{
    fn operation(self, operation: &str) -> Result<T> {
        self.map_err(|e| classify_sdk_error(operation, e))
    }
}

fn classify_sdk_error<E>(operation: &str, sdk_error: SdkError<E>) -> Error
where
    E: ProvideErrorKind + std::error::Error + Send + Sync + 'static,
{
    match sdk_error {
        SdkError::ServiceError(service_error) => {
            let err = service_error.err();
            let code = err.code().unwrap_or("Unknown").to_string();
            // Modeled errors display as `Code: message`.
            let display = err.to_string();
            let message = match display.strip_prefix(&format!("{}: ", code)) {
                Some(message) => message.to_string(),
                None => display.clone(),
            };
            Error::ServiceRejected {
                operation: operation.to_string(),
                code,
                message,
            }
        }
        other => Error::Transport {
            operation: operation.to_string(),
            message: other.to_string(),
        },
    }
}

fn to_utc(date: &aws_smithy_types::DateTime) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(date.secs(), date.subsec_nanos())
        .single()
        .context(error::TimestampSnafu {
            seconds: date.secs(),
        })
}

/// The service clients for one invocation.
#[derive(Debug, Clone)]
pub struct AwsClients {
    imagebuilder_client: aws_sdk_imagebuilder::Client,
    cfn_client: aws_sdk_cloudformation::Client,
    ssm_client: aws_sdk_ssm::Client,
    eks_client: aws_sdk_eks::Client,
    ec2_client: aws_sdk_ec2::Client,
    sns_client: aws_sdk_sns::Client,
    sfn_client: aws_sdk_sfn::Client,
}

impl AwsClients {
    pub fn new(shared_config: &SdkConfig) -> Self {
        Self {
            imagebuilder_client: aws_sdk_imagebuilder::Client::new(shared_config),
            cfn_client: aws_sdk_cloudformation::Client::new(shared_config),
            ssm_client: aws_sdk_ssm::Client::new(shared_config),
            eks_client: aws_sdk_eks::Client::new(shared_config),
            ec2_client: aws_sdk_ec2::Client::new(shared_config),
            sns_client: aws_sdk_sns::Client::new(shared_config),
            sfn_client: aws_sdk_sfn::Client::new(shared_config),
        }
    }
}

#[async_trait::async_trait]
impl ImagePipelineService for AwsClients {
    async fn list_pipeline_images(
        &self,
        pipeline_arn: &str,
        max_results: i32,
    ) -> Result<Vec<PipelineImage>> {
        let output = self
            .imagebuilder_client
            .list_image_pipeline_images()
            .image_pipeline_arn(pipeline_arn)
            .max_results(max_results)
            .send()
            .await
            .operation("ListImagePipelineImages")?;
        Ok(output
            .image_summary_list()
            .unwrap_or_default()
            .iter()
            .map(|summary| PipelineImage {
                arn: summary.arn().map(String::from),
                version: summary.version().unwrap_or_default().to_string(),
                date_created: summary.date_created().unwrap_or_default().to_string(),
                status: summary
                    .state()
                    .and_then(|state| state.status())
                    .map(|status| status.as_str().to_string()),
            })
            .collect())
    }

    async fn pipeline_recipe_arn(&self, pipeline_arn: &str) -> Result<String> {
        self.imagebuilder_client
            .get_image_pipeline()
            .image_pipeline_arn(pipeline_arn)
            .send()
            .await
            .operation("GetImagePipeline")?
            .image_pipeline()
            .and_then(|pipeline| pipeline.image_recipe_arn())
            .map(String::from)
            .context(error::MissingSnafu {
                what: "imageRecipeArn",
                from: "GetImagePipeline",
            })
    }

    async fn recipe_parent_image(&self, recipe_arn: &str) -> Result<String> {
        self.imagebuilder_client
            .get_image_recipe()
            .image_recipe_arn(recipe_arn)
            .send()
            .await
            .operation("GetImageRecipe")?
            .image_recipe()
            .and_then(|recipe| recipe.parent_image())
            .map(String::from)
            .context(error::MissingSnafu {
                what: "parentImage",
                from: "GetImageRecipe",
            })
    }
}

#[async_trait::async_trait]
impl ParameterService for AwsClients {
    async fn stack_parameters(
        &self,
        stack_name: &str,
        next_token: Option<String>,
    ) -> Result<Page<StackParameter>> {
        let output = self
            .cfn_client
            .describe_stacks()
            .stack_name(stack_name)
            .set_next_token(next_token)
            .send()
            .await
            .operation("DescribeStacks")?;
        let items = output
            .stacks()
            .unwrap_or_default()
            .iter()
            .flat_map(|stack| stack.parameters().unwrap_or_default())
            .filter_map(|parameter| {
                parameter.parameter_key().map(|key| StackParameter {
                    key: key.to_string(),
                    value: parameter.parameter_value().map(String::from),
                })
            })
            .collect();
        Ok(Page {
            items,
            next_token: output.next_token().map(String::from),
        })
    }

    async fn managed_parameter(&self, name: &str) -> Result<Option<ManagedParameter>> {
        let output = self
            .ssm_client
            .get_parameters()
            .names(name)
            .send()
            .await
            .operation("GetParameters")?;
        let parameter = match output.parameters().unwrap_or_default().first() {
            Some(parameter) => parameter,
            None => return Ok(None),
        };
        let last_modified = parameter
            .last_modified_date()
            .context(error::MissingSnafu {
                what: "LastModifiedDate",
                from: "GetParameters",
            })?;
        Ok(Some(ManagedParameter {
            name: parameter.name().unwrap_or(name).to_string(),
            value: parameter.value().unwrap_or_default().to_string(),
            last_modified: to_utc(last_modified)?,
        }))
    }
}

#[async_trait::async_trait]
impl ClusterService for AwsClients {
    async fn list_clusters(&self, next_token: Option<String>) -> Result<Page<String>> {
        let output = self
            .eks_client
            .list_clusters()
            .set_next_token(next_token)
            .send()
            .await
            .operation("ListClusters")?;
        Ok(Page {
            items: output.clusters().unwrap_or_default().to_vec(),
            next_token: output.next_token().map(String::from),
        })
    }

    async fn describe_cluster(&self, name: &str) -> Result<ClusterDescription> {
        let output = self
            .eks_client
            .describe_cluster()
            .name(name)
            .send()
            .await
            .operation("DescribeCluster")?;
        let cluster = output.cluster().context(error::MissingSnafu {
            what: "cluster",
            from: "DescribeCluster",
        })?;
        Ok(ClusterDescription {
            name: cluster.name().unwrap_or(name).to_string(),
            tags: cluster.tags().cloned().unwrap_or_default(),
            certificate_authority: cluster
                .certificate_authority()
                .and_then(|certificate| certificate.data())
                .map(String::from),
            endpoint: cluster.endpoint().map(String::from),
            service_ipv4_cidr: cluster
                .kubernetes_network_config()
                .and_then(|config| config.service_ipv4_cidr())
                .map(String::from),
        })
    }

    async fn list_nodegroups(
        &self,
        cluster_name: &str,
        next_token: Option<String>,
    ) -> Result<Page<String>> {
        let output = self
            .eks_client
            .list_nodegroups()
            .cluster_name(cluster_name)
            .set_next_token(next_token)
            .send()
            .await
            .operation("ListNodegroups")?;
        Ok(Page {
            items: output.nodegroups().unwrap_or_default().to_vec(),
            next_token: output.next_token().map(String::from),
        })
    }

    async fn describe_nodegroup(
        &self,
        cluster_name: &str,
        nodegroup_name: &str,
    ) -> Result<NodegroupDescription> {
        let output = self
            .eks_client
            .describe_nodegroup()
            .cluster_name(cluster_name)
            .nodegroup_name(nodegroup_name)
            .send()
            .await
            .operation("DescribeNodegroup")?;
        let nodegroup = output.nodegroup().context(error::MissingSnafu {
            what: "nodegroup",
            from: "DescribeNodegroup",
        })?;
        Ok(NodegroupDescription {
            name: nodegroup.nodegroup_name().unwrap_or(nodegroup_name).to_string(),
            arn: nodegroup.nodegroup_arn().map(String::from),
            cluster_name: nodegroup.cluster_name().unwrap_or(cluster_name).to_string(),
            launch_template: nodegroup
                .launch_template()
                .map(|template| NodegroupLaunchTemplate {
                    id: template.id().map(String::from),
                    name: template.name().map(String::from),
                    version: template.version().map(String::from),
                }),
            release_version: nodegroup.release_version().map(String::from),
            status: nodegroup.status().map(|status| status.as_str().to_string()),
        })
    }

    async fn update_nodegroup_version(
        &self,
        cluster_name: &str,
        nodegroup_name: &str,
        launch_template_id: &str,
        version: &str,
    ) -> Result<UpdateRecord> {
        trace!(
            "Calling UpdateNodegroupVersion for '{}/{}'",
            cluster_name,
            nodegroup_name
        );
        let output = self
            .eks_client
            .update_nodegroup_version()
            .cluster_name(cluster_name)
            .nodegroup_name(nodegroup_name)
            .launch_template(
                LaunchTemplateSpecification::builder()
                    .id(launch_template_id)
                    .version(version)
                    .build(),
            )
            .send()
            .await
            .operation("UpdateNodegroupVersion")?;
        let update = output.update().context(error::MissingSnafu {
            what: "update",
            from: "UpdateNodegroupVersion",
        })?;
        Ok(UpdateRecord {
            id: update.id().map(String::from),
            status: update.status().map(|status| status.as_str().to_string()),
            update_type: update.r#type().map(|kind| kind.as_str().to_string()),
            params: update
                .params()
                .unwrap_or_default()
                .iter()
                .map(|param| {
                    (
                        param.r#type().map(|kind| kind.as_str().to_string()),
                        param.value().map(String::from),
                    )
                })
                .collect(),
            created_at: update.created_at().map(to_utc).transpose()?,
            errors: update
                .errors()
                .unwrap_or_default()
                .iter()
                .map(|detail| UpdateErrorRecord {
                    error_code: detail.error_code().map(|code| code.as_str().to_string()),
                    error_message: detail.error_message().map(String::from),
                    resource_ids: detail.resource_ids().unwrap_or_default().to_vec(),
                })
                .collect(),
        })
    }
}

#[async_trait::async_trait]
impl LaunchTemplateService for AwsClients {
    async fn create_launch_template_version(
        &self,
        launch_template_id: &str,
        source_version: Option<&str>,
        image_id: &str,
        user_data: &str,
    ) -> Result<i64> {
        self.ec2_client
            .create_launch_template_version()
            .launch_template_id(launch_template_id)
            .set_source_version(source_version.map(String::from))
            .launch_template_data(
                RequestLaunchTemplateData::builder()
                    .image_id(image_id)
                    .user_data(user_data)
                    .build(),
            )
            .send()
            .await
            .operation("CreateLaunchTemplateVersion")?
            .launch_template_version()
            .and_then(|version| version.version_number())
            .context(error::MissingSnafu {
                what: "VersionNumber",
                from: "CreateLaunchTemplateVersion",
            })
    }

    async fn latest_version_number(&self, launch_template_id: &str) -> Result<i64> {
        self.ec2_client
            .describe_launch_templates()
            .launch_template_ids(launch_template_id)
            .send()
            .await
            .operation("DescribeLaunchTemplates")?
            .launch_templates()
            .and_then(|templates| templates.first())
            .and_then(|template| template.latest_version_number())
            .context(error::MissingSnafu {
                what: "LatestVersionNumber",
                from: "DescribeLaunchTemplates",
            })
    }
}

#[async_trait::async_trait]
impl NotificationService for AwsClients {
    async fn publish(&self, topic_arn: &str, message: &str) -> Result<Option<String>> {
        Ok(self
            .sns_client
            .publish()
            .topic_arn(topic_arn)
            .message(message)
            .send()
            .await
            .operation("Publish")?
            .message_id()
            .map(String::from))
    }
}

#[async_trait::async_trait]
impl WorkflowService for AwsClients {
    async fn start_execution(&self, state_machine_arn: &str, input: &str) -> Result<String> {
        self.sfn_client
            .start_execution()
            .state_machine_arn(state_machine_arn)
            .input(input)
            .send()
            .await
            .operation("StartExecution")?
            .execution_arn()
            .map(String::from)
            .context(error::MissingSnafu {
                what: "executionArn",
                from: "StartExecution",
            })
    }
}
