use log::LevelFilter;

pub const DEFAULT_AGENT_LEVEL_FILTER: LevelFilter = LevelFilter::Info;

/// Maximum attempts for the AWS SDK's standard retry mode.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
