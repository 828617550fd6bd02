use snafu::Snafu;

pub type Result<T> = std::result::Result<T, Error>;

/// How an error is reported in a stage response.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorCategory {
    /// The service refused the request and said why.
    ClientRejection,
    /// The request did not complete: network, timeout or SDK failure.
    Transport,
    /// A precondition checked by the agents themselves.
    Logic,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("{} was rejected with '{}': {}", operation, code, message))]
    ServiceRejected {
        operation: String,
        code: String,
        message: String,
    },

    #[snafu(display("{} failed to complete: {}", operation, message))]
    Transport { operation: String, message: String },

    #[snafu(display("No available images found for pipeline '{}'", pipeline_arn))]
    NoAvailableImages { pipeline_arn: String },

    #[snafu(display("SSM parameter '{}' not found", name))]
    ParameterNotFound { name: String },

    #[snafu(display("Stack '{}' has no parameter '{}'", stack_name, key))]
    StackParameterMissing { stack_name: String, key: String },

    #[snafu(display(
        "Parameter '{}' does not name an Amazon Linux 2 or Amazon Linux 2023 image",
        parameter_name
    ))]
    UnsupportedImageFamily { parameter_name: String },

    #[snafu(display("{} was missing from {}", what, from))]
    Missing { what: String, from: String },

    #[snafu(display("Invalid service IPv4 CIDR '{}'", cidr))]
    InvalidCidr { cidr: String },

    #[snafu(display("Unable to parse image creation date '{}': {}", date, source))]
    ImageDate {
        date: String,
        source: chrono::ParseError,
    },

    #[snafu(display("Timestamp '{}' is out of range", seconds))]
    Timestamp { seconds: i64 },

    #[snafu(display("Unable to parse {}: {}", what, source))]
    Deserialize {
        what: String,
        source: serde_json::Error,
    },

    #[snafu(display("Unable to serialize {}: {}", what, source))]
    Serialize {
        what: String,
        source: serde_json::Error,
    },

    #[snafu(display("Unable to read environment variable '{}': {}", key, source))]
    EnvRead {
        key: String,
        source: std::env::VarError,
    },

    #[snafu(display("Unable to read the event: {}", source))]
    ReadEvent { source: std::io::Error },
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::ServiceRejected { .. } => ErrorCategory::ClientRejection,
            Error::Transport { .. } => ErrorCategory::Transport,
            _ => ErrorCategory::Logic,
        }
    }

    /// The code reported alongside the error: the service's own code for rejections, the
    /// variant name for logic errors, nothing for transport failures.
    pub fn code(&self) -> Option<&str> {
        Some(match self {
            Error::ServiceRejected { code, .. } => code.as_str(),
            Error::Transport { .. } => return None,
            Error::NoAvailableImages { .. } => "NoAvailableImages",
            Error::ParameterNotFound { .. } => "ParameterNotFound",
            Error::StackParameterMissing { .. } => "StackParameterMissing",
            Error::UnsupportedImageFamily { .. } => "UnsupportedImageFamily",
            Error::Missing { .. } => "MissingData",
            Error::InvalidCidr { .. } => "InvalidCidr",
            Error::ImageDate { .. } | Error::Timestamp { .. } => "InvalidTimestamp",
            Error::Deserialize { .. } => "InvalidInput",
            Error::Serialize { .. } => "Serialization",
            Error::EnvRead { .. } => "Configuration",
            Error::ReadEvent { .. } => "InvalidInput",
        })
    }
}
