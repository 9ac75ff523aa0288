use std::sync::{mpsc, Arc};
use std::thread;

use uploader_logging::{uploader_info, uploader_warn};

use crate::client::{ChannelProgressSink, ClientError, ParsingApi, ProgressSink, ReqwestParsingApi};
use crate::{AttemptId, EngineEvent, JobDescriptionUpload, ResumeUpload, UploadSettings};

enum EngineCommand {
    SubmitJobDescription {
        attempt: AttemptId,
        payload: JobDescriptionUpload,
    },
    SubmitResumes {
        attempt: AttemptId,
        files: Vec<ResumeUpload>,
    },
}

/// Command side of the engine. Requests run on a dedicated runtime thread;
/// settlements and progress come back on the event receiver returned by
/// the constructor.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(settings: UploadSettings) -> Result<(Self, mpsc::Receiver<EngineEvent>), ClientError> {
        let api = Arc::new(ReqwestParsingApi::new(settings)?);
        Ok(Self::with_api(api))
    }

    /// Engine over an arbitrary transport; lets tests fake the service.
    pub fn with_api(api: Arc<dyn ParsingApi>) -> (Self, mpsc::Receiver<EngineEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                let api = api.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(api, command, event_tx).await;
                });
            }
        });

        (Self { cmd_tx }, event_rx)
    }

    pub fn submit_job_description(&self, attempt: AttemptId, payload: JobDescriptionUpload) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::SubmitJobDescription { attempt, payload });
    }

    pub fn submit_resumes(&self, attempt: AttemptId, files: Vec<ResumeUpload>) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::SubmitResumes { attempt, files });
    }
}

async fn handle_command(
    api: Arc<dyn ParsingApi>,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::SubmitJobDescription { attempt, payload } => {
            let result = api.submit_job_description(attempt, &payload).await;
            if let Err(err) = &result {
                uploader_warn!(
                    "job description upload failed attempt={} kind={} message={}",
                    attempt,
                    err.kind,
                    err.message
                );
            }
            let _ = event_tx.send(EngineEvent::JobDescriptionCompleted { attempt, result });
        }
        EngineCommand::SubmitResumes { attempt, files } => {
            uploader_info!(
                "submitting {} resume file(s) attempt={}",
                files.len(),
                attempt
            );
            let sink: Arc<dyn ProgressSink> = Arc::new(ChannelProgressSink::new(event_tx.clone()));
            let result = api.submit_resumes(attempt, &files, sink).await;
            let _ = event_tx.send(EngineEvent::UploadCompleted { attempt, result });
        }
    }
}
