use crate::{
    Effect, JobDescriptionInput, JobDescriptionOutcome, JobDescriptionPayload, Msg,
    ResumeUploadOutcome, UploaderState, JOB_DESCRIPTION_FAILED_NOTICE,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: UploaderState, msg: Msg) -> (UploaderState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesDropped(files) => {
            state.replace_selection(files);
            Vec::new()
        }
        Msg::JobDescriptionEdited(text) => {
            state.set_job_description_text(text);
            Vec::new()
        }
        Msg::JobDescriptionFilePicked(file) => {
            state.set_job_description_file(file);
            Vec::new()
        }
        Msg::UploadClicked => {
            // The button is disabled while an attempt runs; this guard makes
            // the single-sequence policy hold even if a click slips through.
            if state.files().is_empty() || state.is_uploading() {
                return (state, Vec::new());
            }
            let attempt = state.begin_attempt();
            match state.job_description().clone() {
                JobDescriptionInput::Empty => {
                    state.enter_uploading_files();
                    vec![Effect::SubmitResumes {
                        attempt,
                        files: state.files().to_vec(),
                    }]
                }
                JobDescriptionInput::Text(text) => {
                    state.enter_uploading_job_description();
                    vec![Effect::SubmitJobDescription {
                        attempt,
                        payload: JobDescriptionPayload::Text(text),
                    }]
                }
                JobDescriptionInput::FileRef(file) => {
                    state.enter_uploading_job_description();
                    vec![Effect::SubmitJobDescription {
                        attempt,
                        payload: JobDescriptionPayload::File(file),
                    }]
                }
            }
        }
        Msg::JobDescriptionDone { attempt, outcome } => {
            if !state.is_current(attempt) {
                // Selection changed while the request ran. The sequence is
                // abandoned; the late settlement only releases the trigger.
                state.settle_in_flight(attempt);
                Vec::new()
            } else {
                match outcome {
                    JobDescriptionOutcome::Accepted => {
                        state.enter_uploading_files();
                        vec![Effect::SubmitResumes {
                            attempt,
                            files: state.files().to_vec(),
                        }]
                    }
                    JobDescriptionOutcome::Failed => {
                        state.settle_in_flight(attempt);
                        state.fail(JOB_DESCRIPTION_FAILED_NOTICE.to_string());
                        Vec::new()
                    }
                }
            }
        }
        Msg::UploadProgress {
            attempt,
            bytes_sent,
            bytes_total,
        } => {
            if state.is_current(attempt) {
                state.apply_progress(bytes_sent, bytes_total);
            }
            Vec::new()
        }
        Msg::ResumeUploadDone { attempt, outcome } => {
            state.settle_in_flight(attempt);
            if state.is_current(attempt) {
                match outcome {
                    ResumeUploadOutcome::Parsed(result) => state.succeed(result),
                    ResumeUploadOutcome::Failed { message } => state.fail(message),
                }
            }
            Vec::new()
        }
        Msg::ToastDismissed => {
            state.dismiss_toast();
            Vec::new()
        }
    };

    (state, effects)
}
