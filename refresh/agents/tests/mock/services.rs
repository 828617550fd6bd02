use super::{page, Call, MockAws, PIPELINE_ARN, RECIPE_ARN};
use ami_refresh_agents::services::{
    ClusterDescription, ClusterService, ImagePipelineService, LaunchTemplateService,
    ManagedParameter, NodegroupDescription, NotificationService, Page, ParameterService,
    PipelineImage, StackParameter, UpdateRecord, WorkflowService,
};
use ami_refresh_agents::{Error, Result};

fn not_found(operation: &str, message: String) -> Error {
    Error::ServiceRejected {
        operation: operation.to_string(),
        code: "ResourceNotFoundException".to_string(),
        message,
    }
}

#[async_trait::async_trait]
impl ImagePipelineService for MockAws {
    async fn list_pipeline_images(
        &self,
        pipeline_arn: &str,
        max_results: i32,
    ) -> Result<Vec<PipelineImage>> {
        self.record(Call::ListImagePipelineImages {
            pipeline_arn: pipeline_arn.to_string(),
            max_results,
        });
        self.check("ListImagePipelineImages")?;
        Ok(self
            .images
            .iter()
            .take(max_results as usize)
            .cloned()
            .collect())
    }

    async fn pipeline_recipe_arn(&self, pipeline_arn: &str) -> Result<String> {
        self.record(Call::GetImagePipeline {
            pipeline_arn: pipeline_arn.to_string(),
        });
        self.check("GetImagePipeline")?;
        if pipeline_arn != PIPELINE_ARN {
            return Err(not_found(
                "GetImagePipeline",
                format!("Pipeline '{}' does not exist", pipeline_arn),
            ));
        }
        Ok(RECIPE_ARN.to_string())
    }

    async fn recipe_parent_image(&self, recipe_arn: &str) -> Result<String> {
        self.record(Call::GetImageRecipe {
            recipe_arn: recipe_arn.to_string(),
        });
        self.check("GetImageRecipe")?;
        Ok(self.parent_image.clone())
    }
}

#[async_trait::async_trait]
impl ParameterService for MockAws {
    async fn stack_parameters(
        &self,
        stack_name: &str,
        next_token: Option<String>,
    ) -> Result<Page<StackParameter>> {
        self.record(Call::DescribeStacks {
            stack_name: stack_name.to_string(),
            next_token: next_token.clone(),
        });
        self.check("DescribeStacks")?;
        Ok(page(&self.stack_pages, next_token))
    }

    async fn managed_parameter(&self, name: &str) -> Result<Option<ManagedParameter>> {
        self.record(Call::GetParameter {
            name: name.to_string(),
        });
        self.check("GetParameter")?;
        Ok(self.managed_parameters.get(name).cloned())
    }
}

#[async_trait::async_trait]
impl ClusterService for MockAws {
    async fn list_clusters(&self, next_token: Option<String>) -> Result<Page<String>> {
        self.record(Call::ListClusters {
            next_token: next_token.clone(),
        });
        self.check("ListClusters")?;
        Ok(page(&self.cluster_pages, next_token))
    }

    async fn describe_cluster(&self, name: &str) -> Result<ClusterDescription> {
        self.record(Call::DescribeCluster {
            name: name.to_string(),
        });
        self.check("DescribeCluster")?;
        self.clusters.get(name).cloned().ok_or_else(|| {
            not_found(
                "DescribeCluster",
                format!("No cluster found for name: {}.", name),
            )
        })
    }

    async fn list_nodegroups(
        &self,
        cluster_name: &str,
        next_token: Option<String>,
    ) -> Result<Page<String>> {
        self.record(Call::ListNodegroups {
            cluster_name: cluster_name.to_string(),
            next_token: next_token.clone(),
        });
        self.check("ListNodegroups")?;
        Ok(self
            .nodegroup_pages
            .get(cluster_name)
            .map(|pages| page(pages, next_token))
            .unwrap_or_default())
    }

    async fn describe_nodegroup(
        &self,
        cluster_name: &str,
        nodegroup_name: &str,
    ) -> Result<NodegroupDescription> {
        self.record(Call::DescribeNodegroup {
            cluster_name: cluster_name.to_string(),
            nodegroup_name: nodegroup_name.to_string(),
        });
        self.check("DescribeNodegroup")?;
        self.nodegroups
            .get(&(cluster_name.to_string(), nodegroup_name.to_string()))
            .cloned()
            .ok_or_else(|| {
                not_found(
                    "DescribeNodegroup",
                    format!("No node group found for name: {}.", nodegroup_name),
                )
            })
    }

    async fn update_nodegroup_version(
        &self,
        cluster_name: &str,
        nodegroup_name: &str,
        launch_template_id: &str,
        version: &str,
    ) -> Result<UpdateRecord> {
        self.record(Call::UpdateNodegroupVersion {
            cluster_name: cluster_name.to_string(),
            nodegroup_name: nodegroup_name.to_string(),
            launch_template_id: launch_template_id.to_string(),
            version: version.to_string(),
        });
        self.check("UpdateNodegroupVersion")?;
        Ok(self.update_record.clone())
    }
}

#[async_trait::async_trait]
impl LaunchTemplateService for MockAws {
    async fn create_launch_template_version(
        &self,
        launch_template_id: &str,
        source_version: Option<&str>,
        image_id: &str,
        user_data: &str,
    ) -> Result<i64> {
        self.record(Call::CreateLaunchTemplateVersion {
            launch_template_id: launch_template_id.to_string(),
            source_version: source_version.map(String::from),
            image_id: image_id.to_string(),
            user_data: user_data.to_string(),
        });
        self.check("CreateLaunchTemplateVersion")?;
        let mut templates = self.launch_templates.lock().unwrap();
        let latest = templates.entry(launch_template_id.to_string()).or_insert(1);
        *latest += 1;
        Ok(*latest)
    }

    async fn latest_version_number(&self, launch_template_id: &str) -> Result<i64> {
        self.record(Call::DescribeLaunchTemplate {
            launch_template_id: launch_template_id.to_string(),
        });
        self.check("DescribeLaunchTemplates")?;
        self.launch_templates
            .lock()
            .unwrap()
            .get(launch_template_id)
            .copied()
            .ok_or_else(|| Error::ServiceRejected {
                operation: "DescribeLaunchTemplates".to_string(),
                code: "InvalidLaunchTemplateId.NotFound".to_string(),
                message: format!("The launch template '{}' does not exist", launch_template_id),
            })
    }
}

#[async_trait::async_trait]
impl NotificationService for MockAws {
    async fn publish(&self, topic_arn: &str, message: &str) -> Result<Option<String>> {
        self.record(Call::Publish {
            topic_arn: topic_arn.to_string(),
            message: message.to_string(),
        });
        self.check("Publish")?;
        Ok(Some("message-1".to_string()))
    }
}

#[async_trait::async_trait]
impl WorkflowService for MockAws {
    async fn start_execution(&self, state_machine_arn: &str, input: &str) -> Result<String> {
        self.record(Call::StartExecution {
            state_machine_arn: state_machine_arn.to_string(),
            input: input.to_string(),
        });
        self.check("StartExecution")?;
        Ok(format!("{}:execution-1", state_machine_arn.replace("stateMachine", "execution")))
    }
}
