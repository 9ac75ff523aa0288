use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use pretty_assertions::assert_eq;
use serde_json::json;
use uploader_engine::{
    EngineEvent, FailureKind, JobDescriptionUpload, ParsingApi, ProgressSink, ReqwestParsingApi,
    ResumeUpload, UploadSettings,
};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl TestSink {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn api_for(server: &MockServer) -> ReqwestParsingApi {
    let settings = UploadSettings {
        base_url: server.uri(),
        ..UploadSettings::default()
    };
    ReqwestParsingApi::new(settings).expect("client from settings")
}

fn resume(name: &str, content: &[u8]) -> ResumeUpload {
    ResumeUpload {
        filename: name.to_string(),
        mime: "application/pdf".to_string(),
        content: Bytes::copy_from_slice(content),
    }
}

#[tokio::test]
async fn submit_resumes_decodes_the_batch_and_reports_progress() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Files uploaded successfully",
            "files": [{
                "filename": "a.pdf",
                "parsed_resume": {"full_name": "Ada Lovelace", "skills": ["Rust"]},
                "size_bytes": 8,
                "extracted_text": "Ada Lovelace..."
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    let sink = TestSink::new();
    let files = vec![resume("a.pdf", b"%PDF-1.7"), resume("b.pdf", b"%PDF-1.4!")];
    let bytes_total: u64 = files.iter().map(|f| f.content.len() as u64).sum();

    let batch = api
        .submit_resumes(9, &files, sink.clone())
        .await
        .expect("upload accepted");

    assert_eq!(batch.message.as_deref(), Some("Files uploaded successfully"));
    assert_eq!(batch.files.len(), 1);
    assert_eq!(batch.files[0].filename, "a.pdf");
    assert_eq!(
        batch.files[0].parsed_resume,
        json!({"full_name": "Ada Lovelace", "skills": ["Rust"]})
    );
    assert_eq!(batch.files[0].size_bytes, Some(8));
    assert_eq!(batch.files[0].mime_type, None);
    assert_eq!(
        batch.files[0].extracted_text.as_deref(),
        Some("Ada Lovelace...")
    );

    let events = sink.take();
    assert!(!events.is_empty());
    // The last report covers the whole payload.
    assert_eq!(
        events.last().unwrap(),
        &EngineEvent::Progress {
            attempt: 9,
            bytes_sent: bytes_total,
            bytes_total,
        }
    );
}

#[tokio::test]
async fn submit_resumes_preserves_filenames_order_and_field_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"files": []})))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let files = vec![resume("first.pdf", b"one"), resume("second.pdf", b"two")];
    api.submit_resumes(1, &files, TestSink::new())
        .await
        .expect("upload accepted");

    let requests = server.received_requests().await.expect("recorded requests");
    let body = String::from_utf8_lossy(&requests[0].body).into_owned();
    assert!(body.contains("name=\"files\""));
    let first = body.find("filename=\"first.pdf\"").expect("first part");
    let second = body.find("filename=\"second.pdf\"").expect("second part");
    assert!(first < second);
}

#[tokio::test]
async fn submit_resumes_surfaces_the_server_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"error": "File a.exe has an invalid extension"})),
        )
        .mount(&server)
        .await;

    let api = api_for(&server);
    let err = api
        .submit_resumes(1, &[resume("a.pdf", b"%PDF")], TestSink::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::Rejected);
    assert_eq!(err.message, "File a.exe has an invalid extension");
}

#[tokio::test]
async fn submit_resumes_falls_back_when_the_error_body_is_opaque() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let err = api
        .submit_resumes(1, &[resume("a.pdf", b"%PDF")], TestSink::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(502));
}

#[tokio::test]
async fn submit_resumes_rejects_an_undecodable_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let err = api
        .submit_resumes(1, &[resume("a.pdf", b"%PDF")], TestSink::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::InvalidResponse);
}

#[tokio::test]
async fn job_description_text_goes_in_the_description_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload_job_description"))
        .and(body_string_contains("name=\"description\""))
        .and(body_string_contains("Senior Rust engineer, Stockholm"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = api_for(&server);
    api.submit_job_description(
        1,
        &JobDescriptionUpload::Text("Senior Rust engineer, Stockholm".to_string()),
    )
    .await
    .expect("accepted");
}

#[tokio::test]
async fn job_description_file_goes_in_the_file_field_only() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload_job_description"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let api = api_for(&server);
    api.submit_job_description(
        1,
        &JobDescriptionUpload::Document {
            filename: "role.txt".to_string(),
            mime: "text/plain".to_string(),
            content: Bytes::from_static(b"We hire Rustaceans"),
        },
    )
    .await
    .expect("accepted");

    let requests = server.received_requests().await.expect("recorded requests");
    let body = String::from_utf8_lossy(&requests[0].body).into_owned();
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"role.txt\""));
    assert!(!body.contains("name=\"description\""));
}

#[tokio::test]
async fn job_description_failure_maps_the_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload_job_description"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let err = api
        .submit_job_description(1, &JobDescriptionUpload::Text("role".to_string()))
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(500));
}

#[tokio::test]
async fn slow_responses_time_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload_job_description"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let settings = UploadSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..UploadSettings::default()
    };
    let api = ReqwestParsingApi::new(settings).expect("client from settings");
    let err = api
        .submit_job_description(1, &JobDescriptionUpload::Text("role".to_string()))
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::Timeout);
}
