/*!

The image freshness check: decides whether the parent image published through SSM is newer than
the last image the build pipeline produced, and publishes the decision.

!*/

use crate::constants::{IMAGE_STATUS_AVAILABLE, PIPELINE_IMAGE_LIMIT};
use crate::error::{self, Result};
use crate::services::{ImagePipelineService, NotificationService, ParameterService, PipelineImage};
use crate::stack::stack_parameter_value;
use agent_utils::json_display;
use ami_refresh_types::{FreshnessDecision, FreshnessNotification, FreshnessReport};
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use log::{debug, info};
use snafu::{OptionExt, ResultExt};
use std::cmp::Ordering;

/// What the freshness check needs to know about its environment.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FreshnessConfig {
    pub stack_name: String,
    pub stack_parameter_key: String,
    pub pipeline_arn: String,
    pub topic_arn: String,
}

/// Compares two pipeline image versions such as `1.0.3/2`. Segments are split on `.` and `/`;
/// numeric segments compare as numbers and anything else compares as text.
pub fn compare_versions(left: &str, right: &str) -> Ordering {
    let mut left_segments = left.split(['.', '/']);
    let mut right_segments = right.split(['.', '/']);
    loop {
        match (left_segments.next(), right_segments.next()) {
            (None, None) => return Ordering::Equal,
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (Some(l), Some(r)) => {
                let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(l), Ok(r)) => l.cmp(&r),
                    _ => l.cmp(r),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

/// Picks the available image with the highest version. Equal versions fall back to the later
/// creation date and then to the image ARN, so listing order never matters.
pub fn latest_available_image(images: &[PipelineImage]) -> Option<&PipelineImage> {
    images
        .iter()
        .filter(|image| image.status.as_deref() == Some(IMAGE_STATUS_AVAILABLE))
        .max_by(|a, b| {
            compare_versions(&a.version, &b.version)
                .then_with(|| {
                    match (parse_image_date(&a.date_created), parse_image_date(&b.date_created)) {
                        (Ok(a), Ok(b)) => a.cmp(&b),
                        _ => a.date_created.cmp(&b.date_created),
                    }
                })
                .then_with(|| a.arn.cmp(&b.arn))
        })
}

/// Parses a pipeline image creation date, e.g. `2024-01-01T00:00:00.000000+00:00`.
pub fn parse_image_date(date: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(date).context(error::ImageDateSnafu { date })
}

pub(crate) fn format_timestamp<Tz>(date: &DateTime<Tz>) -> String
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    date.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// A newer parent image exists when the parameter changed after the pipeline's last build.
pub fn decide(
    parameter_last_modified: &DateTime<Utc>,
    image_created: &DateTime<FixedOffset>,
) -> FreshnessDecision {
    if parameter_last_modified > image_created {
        FreshnessDecision::UpdateAvailable
    } else {
        FreshnessDecision::UpToDate
    }
}

/// Runs the freshness check and publishes exactly one notification, whichever way it decides.
pub async fn check_image_freshness<S>(services: &S, config: &FreshnessConfig) -> Result<FreshnessReport>
where
    S: ImagePipelineService + ParameterService + NotificationService + ?Sized,
{
    info!("Listing images for pipeline '{}'", config.pipeline_arn);
    let images = services
        .list_pipeline_images(&config.pipeline_arn, PIPELINE_IMAGE_LIMIT)
        .await?;
    let recipe_arn = services.pipeline_recipe_arn(&config.pipeline_arn).await?;
    let current_parent_image = services.recipe_parent_image(&recipe_arn).await?;
    let latest_image =
        latest_available_image(&images).context(error::NoAvailableImagesSnafu {
            pipeline_arn: &config.pipeline_arn,
        })?;
    info!(
        "Latest available image is version '{}' created '{}'",
        latest_image.version, latest_image.date_created
    );
    let image_created = parse_image_date(&latest_image.date_created)?;

    let parameter_name = stack_parameter_value(
        services,
        &config.stack_name,
        &config.stack_parameter_key,
    )
    .await?;
    let parameter = services
        .managed_parameter(&parameter_name)
        .await?
        .context(error::ParameterNotFoundSnafu {
            name: &parameter_name,
        })?;

    let decision = decide(&parameter.last_modified, &image_created);
    info!(
        "Parent image parameter '{}' last modified '{}': {}",
        parameter.name, parameter.last_modified, decision
    );

    let notification = FreshnessNotification {
        message: decision.message().to_string(),
        parameter_path: parameter.name,
        parameter_value: parameter.value,
        parameter_last_modified: format_timestamp(&parameter.last_modified),
        current_parent_image,
        last_build_date: format_timestamp(&image_created),
        pipeline_arn: config.pipeline_arn.clone(),
    };
    let message = serde_json::to_string_pretty(&notification).context(error::SerializeSnafu {
        what: "freshness notification",
    })?;
    debug!("Publishing notification:\n{}", json_display(&notification));
    let message_id = services.publish(&config.topic_arn, &message).await?;

    Ok(FreshnessReport {
        decision,
        message_id,
        notification,
    })
}
