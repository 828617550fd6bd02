// Environment variables
pub const ENV_REGION: &str = "REGION";
pub const ENV_STACK_NAME: &str = "STACK_NAME";
pub const ENV_STACK_PARAMETER_KEY: &str = "STACK_PARAMETER_KEY";
pub const ENV_IMAGE_PIPELINE_ARN: &str = "IMAGE_PIPELINE_ARN";
pub const ENV_SNS_TOPIC_ARN: &str = "SNS_TOPIC_ARN";
pub const ENV_STATE_MACHINE_ARN: &str = "STATE_MACHINE_ARN";
pub const ENV_TAGS: &str = "TAGS";

/// The stack parameter naming the SSM parameter that tracks the latest EKS optimized AMI.
pub const DEFAULT_STACK_PARAMETER_KEY: &str = "LatestEKSOptimizedAMI";

/// How many of the pipeline's most recent images are considered.
pub const PIPELINE_IMAGE_LIMIT: i32 = 15;

pub const IMAGE_STATUS_AVAILABLE: &str = "AVAILABLE";
pub const NODEGROUP_STATUS_ACTIVE: &str = "ACTIVE";
/// Node groups built from custom AMIs report the AMI id as their release version.
pub const CUSTOM_AMI_RELEASE_PREFIX: &str = "ami";

pub const AL2023_PARAMETER_MARKER: &str = "amazon-linux-2023";
pub const AL2_PARAMETER_MARKER: &str = "amazon-linux-2";

/// The last octet of the cluster DNS service IP within the service CIDR.
pub const CLUSTER_DNS_LAST_OCTET: u8 = 10;

/// Returned in place of SDK transport details, which are logged instead.
pub const TRANSPORT_ERROR_MESSAGE: &str = "An AWS SDK error occurred.";
