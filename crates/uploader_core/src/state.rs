use crate::view_model::{FileRowView, ParsedEntryView, UploaderViewModel};

/// Generation stamp for one upload attempt. Minted here, carried by effects
/// and engine messages, so a settlement arriving after the user changed the
/// selection can be told apart from the attempt currently on screen.
pub type AttemptId = u64;

/// Fixed notice for a failed job-description request.
pub const JOB_DESCRIPTION_FAILED_NOTICE: &str = "Failed to upload job description";

/// Notice shown when the resume upload settles successfully.
pub const UPLOAD_SUCCESS_NOTICE: &str = "Files uploaded successfully!";

/// Fallback notice when the server did not say why the resume upload failed.
pub const UPLOAD_FAILED_FALLBACK_NOTICE: &str = "Error uploading files";

/// File kinds the selection capabilities can produce, derived from MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Docx,
    /// Only reachable through the job-description picker.
    PlainText,
}

impl FileKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/pdf" => Some(Self::Pdf),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(Self::Docx)
            }
            "text/plain" => Some(Self::PlainText),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::PlainText => "text/plain",
        }
    }
}

/// A file the user picked for upload: resume or job-description document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub kind: FileKind,
    pub content: Vec<u8>,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, kind: FileKind, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            kind,
            content,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.content.len() as u64
    }
}

/// The job-description input. Typed text and a picked file are mutually
/// exclusive by construction; setting one variant is what clears the other.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobDescriptionInput {
    #[default]
    Empty,
    Text(String),
    FileRef(CandidateFile),
}

/// One parsed resume as returned by the remote service. `parsed_resume` is
/// an opaque document; the optional fields are extras the server includes
/// when it can.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEntry {
    pub filename: String,
    pub parsed_resume: serde_json::Value,
    pub size_bytes: Option<u64>,
    pub mime_type: Option<String>,
    pub extracted_text: Option<String>,
}

impl ParsedEntry {
    pub fn new(filename: impl Into<String>, parsed_resume: serde_json::Value) -> Self {
        Self {
            filename: filename.into(),
            parsed_resume,
            size_bytes: None,
            mime_type: None,
            extracted_text: None,
        }
    }
}

/// One entry per submitted file, in submission order. Replaced wholesale on
/// each successful upload, never merged.
pub type ParsedResult = Vec<ParsedEntry>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// Transient notice; at most one live, superseded by the next or dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastNotice {
    pub kind: ToastKind,
    pub message: String,
}

impl ToastNotice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }
}

/// Where the current upload attempt stands. The progress percentage only
/// exists while the resume transfer runs and the parsed result only exists
/// once it succeeded; both invariants live in the variant payloads instead
/// of in side fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    UploadingJobDescription,
    UploadingFiles {
        percent: Option<u8>,
    },
    Succeeded {
        result: ParsedResult,
    },
    Failed {
        message: String,
    },
}

/// The whole in-memory state for the page session: current selection,
/// job-description input, and the upload session itself.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UploaderState {
    files: Vec<CandidateFile>,
    job_description: JobDescriptionInput,
    status: SessionStatus,
    toast: Option<ToastNotice>,
    epoch: AttemptId,
    in_flight: Option<AttemptId>,
    dirty: bool,
}

impl UploaderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[CandidateFile] {
        &self.files
    }

    pub fn job_description(&self) -> &JobDescriptionInput {
        &self.job_description
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn toast(&self) -> Option<&ToastNotice> {
        self.toast.as_ref()
    }

    /// True while a request sequence is in flight. Distinct from `status`:
    /// this is the flag the UI uses to disable the inputs and the trigger,
    /// and it clears on every settlement, stale ones included.
    pub fn is_uploading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn parsed(&self) -> Option<&ParsedResult> {
        match &self.status {
            SessionStatus::Succeeded { result } => Some(result),
            _ => None,
        }
    }

    pub fn progress_percent(&self) -> Option<u8> {
        match self.status {
            SessionStatus::UploadingFiles { percent } => percent,
            _ => None,
        }
    }

    pub fn view(&self) -> UploaderViewModel {
        let (job_description_text, job_description_file) = match &self.job_description {
            JobDescriptionInput::Empty => (String::new(), None),
            JobDescriptionInput::Text(text) => (text.clone(), None),
            JobDescriptionInput::FileRef(file) => (String::new(), Some(file.name.clone())),
        };
        UploaderViewModel {
            files: self.files.iter().map(FileRowView::from_file).collect(),
            job_description_text,
            job_description_file,
            uploading: self.is_uploading(),
            progress_percent: self.progress_percent(),
            parsed: self
                .parsed()
                .map(|entries| entries.iter().map(ParsedEntryView::from_entry).collect())
                .unwrap_or_default(),
            toast: self.toast.clone(),
        }
    }

    /// Returns whether observable state changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        let was_dirty = self.dirty;
        self.dirty = false;
        was_dirty
    }

    pub(crate) fn replace_selection(&mut self, files: Vec<CandidateFile>) {
        self.files = dedupe_by_name(files);
        self.toast = None;
        // Dropping back to Idle discards any stale progress or result.
        self.status = SessionStatus::Idle;
        // An in-flight attempt now belongs to a selection the user no longer
        // has; advancing the epoch makes its settlement stale.
        self.epoch += 1;
        self.dirty = true;
    }

    pub(crate) fn set_job_description_text(&mut self, text: String) {
        self.job_description = if text.is_empty() {
            JobDescriptionInput::Empty
        } else {
            JobDescriptionInput::Text(text)
        };
        self.dirty = true;
    }

    pub(crate) fn set_job_description_file(&mut self, file: CandidateFile) {
        self.job_description = JobDescriptionInput::FileRef(file);
        self.dirty = true;
    }

    /// Mints the stamp for a new upload attempt and marks it in flight.
    pub(crate) fn begin_attempt(&mut self) -> AttemptId {
        self.epoch += 1;
        self.in_flight = Some(self.epoch);
        self.dirty = true;
        self.epoch
    }

    pub(crate) fn is_current(&self, attempt: AttemptId) -> bool {
        attempt == self.epoch
    }

    pub(crate) fn enter_uploading_job_description(&mut self) {
        self.status = SessionStatus::UploadingJobDescription;
        self.dirty = true;
    }

    pub(crate) fn enter_uploading_files(&mut self) {
        self.status = SessionStatus::UploadingFiles { percent: None };
        self.dirty = true;
    }

    /// Clears the uploading flag for a settled attempt. Stale attempts clear
    /// it too: their transport did settle, so the trigger must come back.
    pub(crate) fn settle_in_flight(&mut self, attempt: AttemptId) {
        if self.in_flight == Some(attempt) {
            self.in_flight = None;
            self.dirty = true;
        }
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.toast = Some(ToastNotice::error(message.clone()));
        self.status = SessionStatus::Failed { message };
        self.dirty = true;
    }

    pub(crate) fn succeed(&mut self, result: ParsedResult) {
        self.toast = Some(ToastNotice::success(UPLOAD_SUCCESS_NOTICE));
        self.status = SessionStatus::Succeeded { result };
        self.dirty = true;
    }

    pub(crate) fn apply_progress(&mut self, bytes_sent: u64, bytes_total: u64) {
        if bytes_total == 0 {
            return;
        }
        let SessionStatus::UploadingFiles { percent } = &mut self.status else {
            return;
        };
        let next = percent_of(bytes_sent, bytes_total);
        // Monotone within one transfer; a transport may replay an offset.
        if percent.map_or(true, |current| next > current) {
            *percent = Some(next);
            self.dirty = true;
        }
    }

    pub(crate) fn dismiss_toast(&mut self) {
        if self.toast.take().is_some() {
            self.dirty = true;
        }
    }
}

/// Uniqueness is by name: within one drop the last file with a given name
/// wins, keeping the position of the first occurrence.
fn dedupe_by_name(files: Vec<CandidateFile>) -> Vec<CandidateFile> {
    let mut out: Vec<CandidateFile> = Vec::with_capacity(files.len());
    for file in files {
        if let Some(slot) = out.iter_mut().find(|existing| existing.name == file.name) {
            *slot = file;
        } else {
            out.push(file);
        }
    }
    out
}

fn percent_of(bytes_sent: u64, bytes_total: u64) -> u8 {
    ((bytes_sent as f64) * 100.0 / (bytes_total as f64))
        .round()
        .min(100.0) as u8
}
