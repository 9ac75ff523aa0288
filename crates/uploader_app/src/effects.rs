use std::sync::mpsc;
use std::thread;

use bytes::Bytes;
use uploader_core::{
    CandidateFile, Effect, JobDescriptionOutcome, JobDescriptionPayload, Msg, ParsedEntry,
    ResumeUploadOutcome, UPLOAD_FAILED_FALLBACK_NOTICE,
};
use uploader_engine::{
    ClientError, EngineEvent, EngineHandle, FailureKind, JobDescriptionUpload, ParsedBatch,
    ResumeUpload, UploadError, UploadSettings,
};
use uploader_logging::{uploader_debug, uploader_info, uploader_warn};

/// Executes core effects against the engine and feeds engine events back to
/// the update loop as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: UploadSettings, msg_tx: mpsc::Sender<Msg>) -> Result<Self, ClientError> {
        let (engine, event_rx) = EngineHandle::new(settings)?;
        spawn_event_loop(event_rx, msg_tx);
        Ok(Self { engine })
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitJobDescription { attempt, payload } => {
                    uploader_info!("SubmitJobDescription attempt={}", attempt);
                    self.engine
                        .submit_job_description(attempt, map_payload(payload));
                }
                Effect::SubmitResumes { attempt, files } => {
                    uploader_info!("SubmitResumes attempt={} files={}", attempt, files.len());
                    let files = files.into_iter().map(map_candidate).collect();
                    self.engine.submit_resumes(attempt, files);
                }
            }
        }
    }
}

fn spawn_event_loop(event_rx: mpsc::Receiver<EngineEvent>, msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        while let Ok(event) = event_rx.recv() {
            if msg_tx.send(map_event(event)).is_err() {
                break;
            }
        }
    });
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Progress {
            attempt,
            bytes_sent,
            bytes_total,
        } => Msg::UploadProgress {
            attempt,
            bytes_sent,
            bytes_total,
        },
        EngineEvent::JobDescriptionCompleted { attempt, result } => Msg::JobDescriptionDone {
            attempt,
            outcome: match result {
                Ok(()) => JobDescriptionOutcome::Accepted,
                Err(err) => {
                    uploader_warn!(
                        "job description attempt {} failed: {} ({})",
                        attempt,
                        err.kind,
                        err.message
                    );
                    JobDescriptionOutcome::Failed
                }
            },
        },
        EngineEvent::UploadCompleted { attempt, result } => Msg::ResumeUploadDone {
            attempt,
            outcome: match result {
                Ok(batch) => {
                    if let Some(message) = batch.message.as_deref() {
                        uploader_debug!("server message for attempt {}: {}", attempt, message);
                    }
                    ResumeUploadOutcome::Parsed(map_batch(batch))
                }
                Err(err) => {
                    uploader_warn!(
                        "resume upload attempt {} failed: {} ({})",
                        attempt,
                        err.kind,
                        err.message
                    );
                    ResumeUploadOutcome::Failed {
                        message: user_facing_message(err),
                    }
                }
            },
        },
    }
}

/// Server-authored rejection messages go to the user verbatim; everything
/// else collapses to the generic notice.
fn user_facing_message(err: UploadError) -> String {
    match err.kind {
        FailureKind::Rejected => err.message,
        _ => UPLOAD_FAILED_FALLBACK_NOTICE.to_string(),
    }
}

fn map_candidate(file: CandidateFile) -> ResumeUpload {
    ResumeUpload {
        filename: file.name,
        mime: file.kind.mime().to_string(),
        content: Bytes::from(file.content),
    }
}

fn map_payload(payload: JobDescriptionPayload) -> JobDescriptionUpload {
    match payload {
        JobDescriptionPayload::Text(text) => JobDescriptionUpload::Text(text),
        JobDescriptionPayload::File(file) => JobDescriptionUpload::Document {
            filename: file.name,
            mime: file.kind.mime().to_string(),
            content: Bytes::from(file.content),
        },
    }
}

fn map_batch(batch: ParsedBatch) -> Vec<ParsedEntry> {
    batch
        .files
        .into_iter()
        .map(|file| ParsedEntry {
            filename: file.filename,
            parsed_resume: file.parsed_resume,
            size_bytes: file.size_bytes,
            mime_type: file.mime_type,
            extracted_text: file.extracted_text,
        })
        .collect()
}
