use crate::constants::IMAGE_STATUS_AVAILABLE;
use crate::error::{self, Result};
use crate::services::WorkflowService;
use ami_refresh_types::{
    ForwardOutcome, ImageBuildMessage, NotificationEvent, Tag, WorkflowInput,
};
use log::info;
use snafu::{OptionExt, ResultExt};

/// What the forwarder needs to know about its environment.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ForwarderConfig {
    pub state_machine_arn: String,
    pub tags: Vec<Tag>,
}

/// Extracts the image build message embedded in the first notification record.
pub fn image_build_message(event: &NotificationEvent) -> Result<ImageBuildMessage> {
    let record = event.records.first().context(error::MissingSnafu {
        what: "record",
        from: "notification event",
    })?;
    serde_json::from_str(&record.sns.message).context(error::DeserializeSnafu {
        what: "image build message",
    })
}

/// Starts the refresh workflow when the image build succeeded. Any other status is reported back
/// with its reason and nothing is started.
pub async fn forward_build_notification<W>(
    workflows: &W,
    config: &ForwarderConfig,
    event: &NotificationEvent,
) -> Result<ForwardOutcome>
where
    W: WorkflowService + ?Sized,
{
    let message = image_build_message(event)?;
    if message.state.status != IMAGE_STATUS_AVAILABLE {
        info!(
            "Image build finished with status '{}', not starting the workflow",
            message.state.status
        );
        return Ok(ForwardOutcome::Skipped {
            image_status: message.state.status,
            reason: message.state.reason,
        });
    }

    let image_id = message
        .output_resources
        .amis
        .into_iter()
        .next()
        .map(|ami| ami.image)
        .context(error::MissingSnafu {
            what: "output AMI",
            from: "image build message",
        })?;
    let input = WorkflowInput {
        image_id,
        tags: config.tags.clone(),
    };
    let input_json = serde_json::to_string(&input).context(error::SerializeSnafu {
        what: "workflow input",
    })?;
    info!(
        "Starting workflow '{}' for image '{}'",
        config.state_machine_arn, input.image_id
    );
    let execution_arn = workflows
        .start_execution(&config.state_machine_arn, &input_json)
        .await?;
    Ok(ForwardOutcome::Triggered { execution_arn })
}
