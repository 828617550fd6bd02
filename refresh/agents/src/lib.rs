/*!

The stages of the AMI refresh workflow.

- [`freshness`] checks whether a newer parent image exists than the one the build pipeline last
  used, and publishes the decision.
- [`notification`] starts the refresh workflow when an image build succeeds.
- [`discovery`] finds the managed node groups that run custom AMIs and creates a launch template
  version for the new image with the boot configuration those nodes need.
- [`nodegroups`] moves a single node group to its new launch template version.

The stages are written against the traits in [`services`]. [`aws::AwsClients`] implements them
with the AWS SDK; each binary wraps its stage in [`response::run_stage`] so that every outcome is
reported as a JSON response.

!*/

pub mod aws;
pub mod clusters;
pub mod config;
pub mod constants;
pub mod discovery;
pub mod error;
pub mod freshness;
pub mod nodegroups;
pub mod notification;
pub mod response;
pub mod services;
pub mod stack;
pub mod userdata;

pub use error::{Error, ErrorCategory, Result};
