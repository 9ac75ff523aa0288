//! Uploader engine: HTTP transport and effect execution.
mod client;
mod engine;
mod types;

pub use client::{
    ChannelProgressSink, ClientError, ParsingApi, ProgressSink, ReqwestParsingApi, UploadSettings,
};
pub use engine::EngineHandle;
pub use types::{
    AttemptId, EngineEvent, FailureKind, JobDescriptionUpload, ParsedBatch, ParsedFile,
    ResumeUpload, UploadError,
};
