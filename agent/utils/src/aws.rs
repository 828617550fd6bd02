use crate::constants::DEFAULT_MAX_ATTEMPTS;
use aws_smithy_types::retry::{RetryConfig, RetryMode};
use aws_types::region::Region;
use aws_types::SdkConfig;
use log::info;

/// Set up the config for aws calls. When `region` is `None` the SDK's default region provider
/// chain is used. Retries use the SDK's standard mode, nothing is retried above the SDK.
pub async fn aws_config(region: &Option<String>) -> SdkConfig {
    let mut config_loader = aws_config::from_env().retry_config(
        RetryConfig::standard()
            .with_retry_mode(RetryMode::Standard)
            .with_max_attempts(DEFAULT_MAX_ATTEMPTS),
    );

    if let Some(region) = region {
        info!(
            "Creating a custom region provider for '{}' to be used in the aws config.",
            region
        );
        config_loader = config_loader.region(Region::new(region.clone()));
    }

    config_loader.load().await
}
