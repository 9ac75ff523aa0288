use std::fmt;

use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;

/// Generation stamp of the attempt a command or event belongs to.
pub type AttemptId = u64;

/// Job-description payload in the exact shape the endpoint accepts: either a
/// text field or a single file part, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobDescriptionUpload {
    Text(String),
    Document {
        filename: String,
        mime: String,
        content: Bytes,
    },
}

/// One resume file as it goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeUpload {
    pub filename: String,
    pub mime: String,
    pub content: Bytes,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Byte progress of the resume transfer, over the total payload bytes.
    Progress {
        attempt: AttemptId,
        bytes_sent: u64,
        bytes_total: u64,
    },
    JobDescriptionCompleted {
        attempt: AttemptId,
        result: Result<(), UploadError>,
    },
    UploadCompleted {
        attempt: AttemptId,
        result: Result<ParsedBatch, UploadError>,
    },
}

/// Successful `/upload` response body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParsedBatch {
    #[serde(default)]
    pub message: Option<String>,
    pub files: Vec<ParsedFile>,
}

/// Per-file element of the `/upload` response. Only `filename` and
/// `parsed_resume` are guaranteed; the rest the server adds when it can.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParsedFile {
    pub filename: String,
    pub parsed_resume: Value,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub extracted_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadError {
    pub kind: FailureKind,
    pub message: String,
}

impl UploadError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    Timeout,
    HttpStatus(u16),
    /// The multipart body could not be built.
    InvalidPayload,
    /// The server accepted the upload but the body was not decodable.
    InvalidResponse,
    /// The server rejected the upload with a message meant for the user.
    Rejected,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::InvalidPayload => write!(f, "invalid payload"),
            FailureKind::InvalidResponse => write!(f, "invalid response"),
            FailureKind::Rejected => write!(f, "rejected by server"),
        }
    }
}
