/*!

The uniform response every agent prints, and [`run_stage`], which turns the result of a stage into
that response. Errors never escape a stage: they are logged and reported as
`{"status": "error", ...}` according to their [`ErrorCategory`].

!*/

use crate::constants::TRANSPORT_ERROR_MESSAGE;
use crate::error::{self, Error, ErrorCategory, Result};
use agent_utils::json_display;
use log::{debug, error, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use snafu::ResultExt;
use std::future::Future;
use std::io::Write;
use std::path::Path;
use tokio::io::AsyncReadExt;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StageResponse<T> {
    Complete {
        response: T,
    },
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        error_code: Option<String>,
        message: String,
    },
}

impl<T> StageResponse<T> {
    pub fn is_complete(&self) -> bool {
        matches!(self, StageResponse::Complete { .. })
    }

    /// Maps an error onto the error response for its category.
    pub fn from_error(stage: &str, e: &Error) -> Self {
        match e.category() {
            ErrorCategory::ClientRejection => {
                error!("Service rejected a request in {}: {}", stage, e);
                let message = match e {
                    Error::ServiceRejected { message, .. } => message.clone(),
                    other => other.to_string(),
                };
                StageResponse::Error {
                    error_code: e.code().map(String::from),
                    message,
                }
            }
            ErrorCategory::Transport => {
                error!("AWS SDK error in {}: {}", stage, e);
                StageResponse::Error {
                    error_code: None,
                    message: TRANSPORT_ERROR_MESSAGE.to_string(),
                }
            }
            ErrorCategory::Logic => {
                error!("{} failed: {}", stage, e);
                StageResponse::Error {
                    error_code: e.code().map(String::from),
                    message: e.to_string(),
                }
            }
        }
    }
}

/// Awaits a stage and converts its outcome into a [`StageResponse`].
pub async fn run_stage<F, T>(stage: &str, future: F) -> StageResponse<T>
where
    F: Future<Output = Result<T>>,
{
    info!("Starting {}", stage);
    match future.await {
        Ok(response) => {
            info!("{} complete", stage);
            StageResponse::Complete { response }
        }
        Err(e) => StageResponse::from_error(stage, &e),
    }
}

/// Reads the stage's input event from `path`, or from stdin when no path is given.
pub async fn read_event<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned,
{
    let raw = match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .context(error::ReadEventSnafu)?,
        None => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context(error::ReadEventSnafu)?;
            raw
        }
    };
    parse_event(&raw)
}

pub fn parse_event<T>(raw: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    serde_json::from_str(raw).context(error::DeserializeSnafu { what: "event" })
}

/// Writes the response as a single JSON document to stdout.
pub fn write_response<T>(response: &StageResponse<T>) -> std::io::Result<()>
where
    T: Serialize,
{
    debug!("Response:\n{}", json_display(response));
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer(&mut handle, response)?;
    writeln!(handle)?;
    handle.flush()
}
