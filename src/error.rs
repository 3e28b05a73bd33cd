use thiserror::Error;

use crate::types::TaskState;

/// Errors returned by synthesis, content mutation, and pipeline operations.
#[derive(Error, Debug)]
pub enum IllustratorError {
    /// No synthesis provider has credentials configured.
    #[error("no image synthesis provider is configured")]
    ProviderUnavailable,

    /// A provider rejected the synthesis submission.
    #[error("{provider} rejected the synthesis request: {message}")]
    SubmitRejected { provider: String, message: String },

    /// A provider reported its task as failed.
    #[error("{provider} task failed: {reason}")]
    TaskFailed { provider: String, reason: String },

    /// The poll loop hit its attempt ceiling before the task finished.
    #[error("{provider} task timed out after {attempts} poll attempts")]
    TaskTimedOut { provider: String, attempts: u32 },

    /// The result binary could not be fetched after a succeeded task.
    #[error("{provider} download failed: {message}")]
    DownloadFailed { provider: String, message: String },

    /// `download` was called on a task that has not succeeded.
    #[error("download called on task in state {0:?}")]
    TaskNotReady(TaskState),

    /// The article body contains no level-2 or level-3 headings.
    #[error("no headings found in article body")]
    NoHeadingsFound,

    /// The publishing collaborator failed to persist an artifact.
    #[error("media upload failed: {0}")]
    UploadFailed(String),

    /// A mandatory text-generation stage failed.
    #[error("stage '{stage}' failed: {message}")]
    StageFailed { stage: String, message: String },

    /// Pipeline construction was invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A provider returned a non-success HTTP status.
    #[error("provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Network-level request failure with context.
    #[error("{context}: {source}")]
    Network {
        context: String,
        source: reqwest::Error,
    },

    /// A response or document was missing expected content.
    #[error("{0}")]
    InvalidResponse(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, IllustratorError>;
