//! Uploader core: pure state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, JobDescriptionPayload};
pub use msg::{JobDescriptionOutcome, Msg, ResumeUploadOutcome};
pub use state::{
    AttemptId, CandidateFile, FileKind, JobDescriptionInput, ParsedEntry, ParsedResult,
    SessionStatus, ToastKind, ToastNotice, UploaderState, JOB_DESCRIPTION_FAILED_NOTICE,
    UPLOAD_FAILED_FALLBACK_NOTICE, UPLOAD_SUCCESS_NOTICE,
};
pub use update::update;
pub use view_model::{FileRowView, ParsedEntryView, UploaderViewModel};
