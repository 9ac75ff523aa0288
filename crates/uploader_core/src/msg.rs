use crate::{AttemptId, CandidateFile, ParsedResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User dropped or picked a new set of resume files.
    FilesDropped(Vec<CandidateFile>),
    /// User edited the job-description text box.
    JobDescriptionEdited(String),
    /// User picked a job-description file.
    JobDescriptionFilePicked(CandidateFile),
    /// User clicked the upload button.
    UploadClicked,
    /// Engine settled the job-description request.
    JobDescriptionDone {
        attempt: AttemptId,
        outcome: JobDescriptionOutcome,
    },
    /// Engine observed transfer progress on the resume upload.
    UploadProgress {
        attempt: AttemptId,
        bytes_sent: u64,
        bytes_total: u64,
    },
    /// Engine settled the resume upload.
    ResumeUploadDone {
        attempt: AttemptId,
        outcome: ResumeUploadOutcome,
    },
    /// User dismissed the toast notice.
    ToastDismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobDescriptionOutcome {
    Accepted,
    Failed,
}

/// Settlement of the resume upload. The failure message is already the
/// user-facing one; picking it is the job of the layer that saw the server
/// response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResumeUploadOutcome {
    Parsed(ParsedResult),
    Failed { message: String },
}
