use std::sync::mpsc;

use uploader_core::{update, CandidateFile, Msg, UploaderState, UploaderViewModel};
use uploader_engine::{ClientError, UploadSettings};

use crate::effects::EffectRunner;

/// Entry points the visual layer calls, one per user gesture, plus the
/// message pump that drives the state machine.
///
/// All state lives here; the UI re-renders from the view models `pump`
/// hands back and keeps nothing of its own.
pub struct UploaderShell {
    state: UploaderState,
    msg_tx: mpsc::Sender<Msg>,
    msg_rx: mpsc::Receiver<Msg>,
    runner: EffectRunner,
}

impl UploaderShell {
    pub fn new(settings: UploadSettings) -> Result<Self, ClientError> {
        let (msg_tx, msg_rx) = mpsc::channel();
        let runner = EffectRunner::new(settings, msg_tx.clone())?;
        Ok(Self {
            state: UploaderState::new(),
            msg_tx,
            msg_rx,
            runner,
        })
    }

    pub fn files_dropped(&self, files: Vec<CandidateFile>) {
        let _ = self.msg_tx.send(Msg::FilesDropped(files));
    }

    pub fn job_description_edited(&self, text: impl Into<String>) {
        let _ = self.msg_tx.send(Msg::JobDescriptionEdited(text.into()));
    }

    pub fn job_description_file_picked(&self, file: CandidateFile) {
        let _ = self.msg_tx.send(Msg::JobDescriptionFilePicked(file));
    }

    pub fn upload_clicked(&self) {
        let _ = self.msg_tx.send(Msg::UploadClicked);
    }

    pub fn toast_dismissed(&self) {
        let _ = self.msg_tx.send(Msg::ToastDismissed);
    }

    /// Drains pending messages through the update function, executes the
    /// effects they produce, and returns a fresh view model if anything
    /// observable changed.
    pub fn pump(&mut self) -> Option<UploaderViewModel> {
        let mut inbox = Vec::new();
        while let Ok(msg) = self.msg_rx.try_recv() {
            inbox.push(msg);
        }
        for msg in inbox {
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;
            self.runner.run(effects);
        }

        if self.state.consume_dirty() {
            Some(self.state.view())
        } else {
            None
        }
    }

    /// Current view model regardless of dirtiness.
    pub fn view(&self) -> UploaderViewModel {
        self.state.view()
    }
}
