// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Error type for fetching subscriptions, management groups and assignments.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Reading the snapshot failed
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Snapshot contents could not be parsed
    #[error("parse error: {0}")]
    Parse(String),
    /// Snapshot file extension not recognized
    #[error("unsupported snapshot `{0}`. Must be json or yaml.")]
    UnsupportedFormat(String),
    /// Subscription not present in the source
    #[error("unknown subscription: {0}")]
    UnknownSubscription(String),
    /// Source belongs to a different tenant than the session
    #[error("snapshot belongs to tenant {found}, session expects {expected}")]
    TenantMismatch { expected: String, found: String },
}

impl From<serde_json::Error> for FetchError {
    fn from(error: serde_json::Error) -> Self {
        FetchError::Parse(format!("{}", error))
    }
}

impl From<serde_yaml::Error> for FetchError {
    fn from(error: serde_yaml::Error) -> Self {
        FetchError::Parse(format!("{}", error))
    }
}
