use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::Stream;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    AttemptId, EngineEvent, FailureKind, JobDescriptionUpload, ParsedBatch, ResumeUpload,
    UploadError,
};

/// Transport settings for the remote parsing service.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            // Address the development server listens on.
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Raised when a client cannot be constructed from its settings.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
    #[error("http client: {0}")]
    Http(String),
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// The two requests the remote parsing service accepts, in the order the
/// orchestrator issues them.
#[async_trait::async_trait]
pub trait ParsingApi: Send + Sync {
    async fn submit_job_description(
        &self,
        attempt: AttemptId,
        payload: &JobDescriptionUpload,
    ) -> Result<(), UploadError>;

    /// The sink observes byte progress of the multipart body. It may fire
    /// zero or more times before settlement and never after.
    async fn submit_resumes(
        &self,
        attempt: AttemptId,
        files: &[ResumeUpload],
        sink: Arc<dyn ProgressSink>,
    ) -> Result<ParsedBatch, UploadError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestParsingApi {
    client: reqwest::Client,
    job_description_url: reqwest::Url,
    upload_url: reqwest::Url,
}

impl ReqwestParsingApi {
    pub fn new(settings: UploadSettings) -> Result<Self, ClientError> {
        let base = ensure_trailing_slash(&settings.base_url);
        let base = reqwest::Url::parse(&base)
            .map_err(|err| ClientError::InvalidBaseUrl(err.to_string()))?;
        let job_description_url = base
            .join("upload_job_description")
            .map_err(|err| ClientError::InvalidBaseUrl(err.to_string()))?;
        let upload_url = base
            .join("upload")
            .map_err(|err| ClientError::InvalidBaseUrl(err.to_string()))?;

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ClientError::Http(err.to_string()))?;

        Ok(Self {
            client,
            job_description_url,
            upload_url,
        })
    }
}

#[async_trait::async_trait]
impl ParsingApi for ReqwestParsingApi {
    async fn submit_job_description(
        &self,
        _attempt: AttemptId,
        payload: &JobDescriptionUpload,
    ) -> Result<(), UploadError> {
        let form = match payload {
            JobDescriptionUpload::Text(text) => Form::new().text("description", text.clone()),
            JobDescriptionUpload::Document {
                filename,
                mime,
                content,
            } => {
                let part = Part::stream(Body::from(content.clone()))
                    .file_name(filename.clone())
                    .mime_str(mime)
                    .map_err(|err| UploadError::new(FailureKind::InvalidPayload, err.to_string()))?;
                Form::new().part("file", part)
            }
        };

        let response = self
            .client
            .post(self.job_description_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        // The response body carries nothing the page uses.
        Ok(())
    }

    async fn submit_resumes(
        &self,
        attempt: AttemptId,
        files: &[ResumeUpload],
        sink: Arc<dyn ProgressSink>,
    ) -> Result<ParsedBatch, UploadError> {
        let bytes_total: u64 = files.iter().map(|file| file.content.len() as u64).sum();
        let bytes_sent = Arc::new(AtomicU64::new(0));

        let mut form = Form::new();
        for file in files {
            let stream = counted_chunks(
                file.content.clone(),
                attempt,
                bytes_total,
                bytes_sent.clone(),
                sink.clone(),
            );
            let part = Part::stream_with_length(
                Body::wrap_stream(stream),
                file.content.len() as u64,
            )
            .file_name(file.filename.clone())
            .mime_str(&file.mime)
            .map_err(|err| UploadError::new(FailureKind::InvalidPayload, err.to_string()))?;
            form = form.part("files", part);
        }

        let response = self
            .client
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<ParsedBatch>()
                .await
                .map_err(|err| UploadError::new(FailureKind::InvalidResponse, err.to_string()));
        }

        // Failure bodies optionally carry a message meant for the user.
        let body = response.text().await.unwrap_or_default();
        if let Ok(ErrorBody {
            error: Some(message),
        }) = serde_json::from_str::<ErrorBody>(&body)
        {
            return Err(UploadError::new(FailureKind::Rejected, message));
        }
        Err(UploadError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

const PROGRESS_CHUNK_BYTES: usize = 64 * 1024;

/// Splits one file into chunks that bump the shared byte counter and report
/// progress as reqwest polls them onto the wire. Parts are streamed in form
/// order, so the counter is cumulative over the whole payload.
fn counted_chunks(
    content: Bytes,
    attempt: AttemptId,
    bytes_total: u64,
    bytes_sent: Arc<AtomicU64>,
    sink: Arc<dyn ProgressSink>,
) -> impl Stream<Item = Result<Bytes, io::Error>> + Send + 'static {
    let mut chunks = Vec::new();
    let mut offset = 0;
    while offset < content.len() {
        let end = usize::min(offset + PROGRESS_CHUNK_BYTES, content.len());
        chunks.push(content.slice(offset..end));
        offset = end;
    }

    futures_util::stream::iter(chunks.into_iter().map(move |chunk| {
        let sent = bytes_sent.fetch_add(chunk.len() as u64, Ordering::Relaxed) + chunk.len() as u64;
        sink.emit(EngineEvent::Progress {
            attempt,
            bytes_sent: sent,
            bytes_total,
        });
        Ok::<Bytes, io::Error>(chunk)
    }))
}

/// A join against a base without a trailing slash would replace the last
/// path segment instead of appending.
fn ensure_trailing_slash(base_url: &str) -> String {
    if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{base_url}/")
    }
}

fn map_reqwest_error(err: reqwest::Error) -> UploadError {
    if err.is_timeout() {
        return UploadError::new(FailureKind::Timeout, err.to_string());
    }
    UploadError::new(FailureKind::Network, err.to_string())
}
