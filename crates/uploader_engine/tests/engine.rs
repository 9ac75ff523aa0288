use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde_json::json;
use uploader_engine::{
    AttemptId, EngineEvent, EngineHandle, JobDescriptionUpload, ParsedBatch, ParsedFile,
    ParsingApi, ProgressSink, ResumeUpload, UploadError,
};

/// Scripted transport: accepts everything and emits one progress event per
/// resume submission.
struct StubApi;

#[async_trait::async_trait]
impl ParsingApi for StubApi {
    async fn submit_job_description(
        &self,
        _attempt: AttemptId,
        _payload: &JobDescriptionUpload,
    ) -> Result<(), UploadError> {
        Ok(())
    }

    async fn submit_resumes(
        &self,
        attempt: AttemptId,
        files: &[ResumeUpload],
        sink: Arc<dyn ProgressSink>,
    ) -> Result<ParsedBatch, UploadError> {
        let bytes_total: u64 = files.iter().map(|f| f.content.len() as u64).sum();
        sink.emit(EngineEvent::Progress {
            attempt,
            bytes_sent: bytes_total,
            bytes_total,
        });
        Ok(ParsedBatch {
            message: None,
            files: files
                .iter()
                .map(|f| ParsedFile {
                    filename: f.filename.clone(),
                    parsed_resume: json!({"stub": true}),
                    size_bytes: Some(f.content.len() as u64),
                    mime_type: Some(f.mime.clone()),
                    extracted_text: None,
                })
                .collect(),
        })
    }
}

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

#[test]
fn engine_forwards_job_description_settlement() {
    let (engine, events) = EngineHandle::with_api(Arc::new(StubApi));

    engine.submit_job_description(3, JobDescriptionUpload::Text("role".to_string()));

    let event = events.recv_timeout(RECV_TIMEOUT).expect("settlement");
    assert_eq!(
        event,
        EngineEvent::JobDescriptionCompleted {
            attempt: 3,
            result: Ok(()),
        }
    );
}

#[test]
fn engine_forwards_progress_then_completion() {
    let (engine, events) = EngineHandle::with_api(Arc::new(StubApi));

    engine.submit_resumes(
        7,
        vec![ResumeUpload {
            filename: "a.pdf".to_string(),
            mime: "application/pdf".to_string(),
            content: Bytes::from_static(b"%PDF-1.7"),
        }],
    );

    let first = events.recv_timeout(RECV_TIMEOUT).expect("progress");
    assert_eq!(
        first,
        EngineEvent::Progress {
            attempt: 7,
            bytes_sent: 8,
            bytes_total: 8,
        }
    );

    let second = events.recv_timeout(RECV_TIMEOUT).expect("completion");
    match second {
        EngineEvent::UploadCompleted { attempt, result } => {
            assert_eq!(attempt, 7);
            let batch = result.expect("stub always succeeds");
            assert_eq!(batch.files.len(), 1);
            assert_eq!(batch.files[0].filename, "a.pdf");
        }
        other => panic!("expected completion, got {other:?}"),
    }
}
