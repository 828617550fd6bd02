/*!

Checks whether the parent image of an image build pipeline has been superseded by a newer release
and publishes the decision to a notification topic. Runs on a schedule; the triggering event is
read but not interpreted.

!*/

use agent_utils::aws::aws_config;
use agent_utils::init_agent_logger;
use ami_refresh_agents::aws::AwsClients;
use ami_refresh_agents::config::region_from_env;
use ami_refresh_agents::freshness::{check_image_freshness, FreshnessConfig};
use ami_refresh_agents::response::{read_event, run_stage, write_response};
use ami_refresh_agents::Result;
use ami_refresh_types::FreshnessReport;
use clap::Parser;
use log::LevelFilter;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(about)]
struct Args {
    /// Set logging verbosity [trace|debug|info|warn|error]. If the environment variable `RUST_LOG`
    /// is present, it overrides the default logging behavior.
    #[clap(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
    /// Read the triggering event from this file instead of stdin.
    #[clap(long = "event")]
    event: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    init_agent_logger(env!("CARGO_CRATE_NAME"), Some(args.log_level));
    let response = run_stage("image freshness check", run(args)).await;
    if let Err(e) = write_response(&response) {
        eprintln!("Unable to write response: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<FreshnessReport> {
    let _: Value = read_event(args.event.as_deref()).await?;
    let config = FreshnessConfig::from_env()?;
    let shared_config = aws_config(&region_from_env()).await;
    let clients = AwsClients::new(&shared_config);
    check_image_freshness(&clients, &config).await
}
