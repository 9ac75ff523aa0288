use crate::state::{CandidateFile, FileKind, ParsedEntry, ToastNotice};

/// Immutable snapshot the UI renders from. Everything the page shows is
/// derivable from here; the visual layer keeps no state of its own.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploaderViewModel {
    pub files: Vec<FileRowView>,
    /// Contents of the job-description text box ("" unless typed text is active).
    pub job_description_text: String,
    /// Name of the picked job-description file, if that variant is active.
    pub job_description_file: Option<String>,
    /// Disables the inputs and the upload trigger while a sequence runs.
    pub uploading: bool,
    /// Aggregate transfer percentage; present only during the resume upload.
    pub progress_percent: Option<u8>,
    /// One rendered entry per submitted file; empty unless the last attempt
    /// succeeded.
    pub parsed: Vec<ParsedEntryView>,
    pub toast: Option<ToastNotice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRowView {
    pub name: String,
    pub kind: FileKind,
    pub size_bytes: u64,
}

impl FileRowView {
    pub(crate) fn from_file(file: &CandidateFile) -> Self {
        Self {
            name: file.name.clone(),
            kind: file.kind,
            size_bytes: file.size_bytes(),
        }
    }

    /// Size in megabytes with two decimals, as shown next to each row.
    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.size_bytes as f64 / 1024.0 / 1024.0)
    }
}

/// One parsed resume, rendered losslessly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntryView {
    pub filename: String,
    /// Pretty-printed JSON of the opaque document the parser returned.
    pub parsed_resume: String,
}

impl ParsedEntryView {
    pub(crate) fn from_entry(entry: &ParsedEntry) -> Self {
        Self {
            filename: entry.filename.clone(),
            parsed_resume: format!("{:#}", entry.parsed_resume),
        }
    }
}
