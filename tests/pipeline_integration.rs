use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use docdigest::{
    api::{RouterOptions, create_router},
    extraction::FileTextExtractor,
    processing::{PipelineSettings, SummaryService},
    storage::FsDocumentStore,
    summarization::{ExtractiveSummarizationClient, OllamaSummarizationClient, SummarizationClient},
};
use httpmock::{Method::POST, MockServer};
use regex::Regex;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "docdigest-test-boundary";

struct TestHarness {
    app: Router,
    dir: TempDir,
}

impl TestHarness {
    fn new(summarizer: Arc<dyn SummarizationClient>, settings: PipelineSettings) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let service = SummaryService::new(
            settings,
            summarizer,
            Arc::new(FileTextExtractor),
            Arc::new(FsDocumentStore::new(
                dir.path().join("uploads"),
                dir.path().join("outputs"),
            )),
        );
        let app = create_router(
            Arc::new(service),
            &RouterOptions {
                cors_allowed_origin: "http://localhost:3000".into(),
                max_upload_bytes: 1024 * 1024,
            },
        );
        Self { app, dir }
    }

    async fn upload(&self, file_name: &str, contents: &str, style: &str) -> (StatusCode, Value) {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\r\n{contents}\r\n--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"style\"\r\n\r\n{style}\r\n--{BOUNDARY}--\r\n"
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri("/summarize")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request");
        let response = self.app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&bytes).expect("json"))
    }

    async fn download(&self, pdf_url: &str) -> (StatusCode, Vec<u8>) {
        let path = pdf_url.trim_start_matches("/api");
        let response = self
            .app
            .clone()
            .oneshot(Request::builder().uri(path).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, bytes.to_vec())
    }
}

#[tokio::test]
async fn text_upload_is_summarized_rendered_and_downloadable() {
    let harness = TestHarness::new(
        Arc::new(ExtractiveSummarizationClient),
        PipelineSettings::default(),
    );

    let (status, json) = harness
        .upload(
            "notes.txt",
            "Ownership rules are checked at compile time. Borrowing avoids copies.",
            "academic",
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{json}");
    assert_eq!(json["summary"][0]["id"], 1);
    assert_eq!(json["summary"][0]["title"], "Section 1");
    assert_eq!(
        json["summary"][0]["points"],
        json!([
            "Ownership rules are checked at compile time",
            "Borrowing avoids copies."
        ])
    );

    let pdf_url = json["pdf_url"].as_str().expect("pdf url");
    let name_pattern = Regex::new(r"^/api/download/summary_[0-9a-f]{8}_academic\.pdf$").unwrap();
    assert!(name_pattern.is_match(pdf_url), "unexpected url {pdf_url}");

    let (status, bytes) = harness.download(pdf_url).await;
    assert_eq!(status, StatusCode::OK);
    assert!(bytes.starts_with(b"%PDF"));

    let uploads: Vec<_> = std::fs::read_dir(harness.dir.path().join("uploads"))
        .expect("uploads dir")
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    let upload_pattern = Regex::new(r"^[0-9a-f]{6}_notes\.txt$").unwrap();
    assert_eq!(uploads.len(), 1);
    assert!(upload_pattern.is_match(&uploads[0]), "{uploads:?}");
}

#[tokio::test]
async fn unknown_style_falls_back_to_default_document() {
    let harness = TestHarness::new(
        Arc::new(ExtractiveSummarizationClient),
        PipelineSettings::default(),
    );

    let (status, json) = harness
        .upload("notes.md", "Markdown body text.", "../../etc")
        .await;

    assert_eq!(status, StatusCode::OK, "{json}");
    assert!(
        json["pdf_url"]
            .as_str()
            .is_some_and(|url| url.ends_with("_default.pdf"))
    );
}

#[tokio::test]
async fn ollama_parts_become_titled_sections() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/generate");
            then.status(200).json_body(json!({
                "response": "Findings: Cats are calm. Dogs bark.",
                "done": true
            }));
        })
        .await;

    let settings = PipelineSettings {
        chunk_max_tokens: 4,
        summarization_model: "llama3.2".into(),
        ..PipelineSettings::default()
    };
    let harness = TestHarness::new(
        Arc::new(OllamaSummarizationClient::new(server.base_url())),
        settings,
    );

    let (status, json) = harness
        .upload("report.txt", "one two three. four five six.", "elegant")
        .await;

    assert_eq!(status, StatusCode::OK, "{json}");
    mock.assert_hits_async(2).await;
    let sections = json["summary"].as_array().expect("sections");
    assert_eq!(sections.len(), 2);
    for (position, section) in sections.iter().enumerate() {
        assert_eq!(section["id"], position + 1);
        assert_eq!(section["title"], "Findings");
        assert_eq!(section["points"], json!(["Cats are calm", "Dogs bark."]));
    }
}

#[tokio::test]
async fn unreachable_provider_reports_adapter_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/generate");
            then.status(500).body("model crashed");
        })
        .await;

    let harness = TestHarness::new(
        Arc::new(OllamaSummarizationClient::new(server.base_url())),
        PipelineSettings::default(),
    );

    let (status, json) = harness.upload("report.txt", "Some text.", "minimal").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"], "adapter_failure");
    assert!(!harness.dir.path().join("outputs").exists());
}

#[tokio::test]
async fn unsupported_and_empty_uploads_are_client_errors() {
    let harness = TestHarness::new(
        Arc::new(ExtractiveSummarizationClient),
        PipelineSettings::default(),
    );

    let (status, json) = harness.upload("tool.exe", "MZ", "minimal").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "unsupported_format");

    let (status, json) = harness.upload("blank.txt", "   ", "minimal").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "empty_content");
}

#[tokio::test]
#[ignore = "Requires live Ollama"]
async fn live_ollama_summary() {
    let base_url =
        std::env::var("OLLAMA_URL").unwrap_or_else(|_| "http://127.0.0.1:11434".to_string());
    let settings = PipelineSettings {
        summarization_model: std::env::var("SUMMARIZATION_MODEL")
            .unwrap_or_else(|_| "llama3.2".to_string()),
        ..PipelineSettings::default()
    };
    let harness = TestHarness::new(Arc::new(OllamaSummarizationClient::new(base_url)), settings);

    let (status, json) = harness
        .upload(
            "live.txt",
            "Rust is a systems programming language. It guarantees memory safety without a garbage collector.",
            "minimal",
        )
        .await;

    assert_eq!(status, StatusCode::OK, "{json}");
    assert!(!json["summary"].as_array().expect("sections").is_empty());
}
