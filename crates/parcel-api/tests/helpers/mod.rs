//! Test helpers: build an app wired to local fakes.
//!
//! The document host and the OpenAI API are mockito servers, archives go to a local
//! storage tempdir and records to the in-memory property store. No Docker required.

#![allow(dead_code)]

use axum_test::TestServer;
use mockito::{Matcher, Mock, ServerGuard};
use parcel_api::constants;
use parcel_api::setup::{routes, services};
use parcel_api::AppState;
use parcel_core::{
    Config, DatabaseConfig, FetchConfig, ModelConfig, ParcelConfig, PipelineConfig,
    ServerConfig, StorageBackend, StorageConfig,
};
use parcel_db::InMemoryPropertyStore;
use parcel_storage::LocalStorage;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const FILES_BASE_URL: &str = "http://localhost:3000/files";

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server, fakes and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub store: InMemoryPropertyStore,
    pub document_host: ServerGuard,
    pub model_api: ServerGuard,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// URL of `path` on the mock document host.
    pub fn document_url(&self, path: &str) -> String {
        format!("{}{}", self.document_host.url(), path)
    }

    pub async fn serve_pdf(&mut self, path: &str, pdf: Vec<u8>) -> Mock {
        self.document_host
            .mock("GET", path)
            .with_status(200)
            .with_header("content-type", "application/pdf")
            .with_body(pdf)
            .create_async()
            .await
    }

    /// Answer chat completions whose body matches `body_pattern` with `reply` as content.
    pub async fn model_replies(&mut self, body_pattern: &str, reply: serde_json::Value) -> Mock {
        self.model_api
            .mock("POST", "/chat/completions")
            .match_body(Matcher::Regex(body_pattern.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "choices": [{
                        "message": { "role": "assistant", "content": reply.to_string() },
                        "finish_reason": "stop"
                    }],
                    "usage": { "prompt_tokens": 400, "completion_tokens": 60, "total_tokens": 460 }
                })
                .to_string(),
            )
            .create_async()
            .await
    }
}

pub fn test_config(temp_dir: &TempDir, model_base_url: String) -> Config {
    Config(Box::new(ParcelConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            cors_origins: vec!["*".to_string()],
            max_request_body_bytes: 64 * 1024,
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
            timeout_seconds: 1,
        },
        storage: StorageConfig {
            backend: StorageBackend::Local,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: Some(temp_dir.path().display().to_string()),
            local_storage_base_url: Some(FILES_BASE_URL.to_string()),
            public_base_url: None,
            archive_prefix: "documents".to_string(),
        },
        fetch: FetchConfig {
            timeout: Duration::from_secs(5),
            max_document_size_bytes: 1024 * 1024,
            allow_private_hosts: true,
            allowlist: None,
        },
        model: ModelConfig {
            api_key: "sk-test".to_string(),
            base_url: model_base_url,
            model: "gpt-4o".to_string(),
            temperature: 0.0,
            timeout: Duration::from_secs(5),
            max_input_chars: 200_000,
            retry_on_malformed: true,
        },
        pipeline: PipelineConfig::default(),
    }))
}

/// Setup a test app with local storage, in-memory records and mock upstreams.
pub async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let document_host = mockito::Server::new_async().await;
    let model_api = mockito::Server::new_async().await;

    let config = test_config(&temp_dir, model_api.url());

    let storage = LocalStorage::new(temp_dir.path(), FILES_BASE_URL.to_string())
        .await
        .unwrap();
    let store = InMemoryPropertyStore::new();

    let state =
        services::initialize_services(&config, Arc::new(storage), Arc::new(store.clone()))
            .unwrap();
    let router = routes::setup_routes(&config, state.clone()).unwrap();
    let server = TestServer::new(router).unwrap();

    TestApp {
        server,
        state,
        store,
        document_host,
        model_api,
        temp_dir,
    }
}

/// A PDF with one text line per page.
pub fn make_test_pdf(pages: &[&str]) -> Vec<u8> {
    use lopdf::dictionary;
    use lopdf::{Document, Object, Stream};

    let mut doc = Document::with_version("1.4");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = format!("BT /F1 12 Tf 72 700 Td ({text}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! {
                    "F1" => font_id,
                },
            },
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Model reply for the sample listing brochure.
pub fn listing_reply() -> serde_json::Value {
    json!({
        "address": "123 Example St",
        "price": "$950,000",
        "bedrooms": 4,
        "bathrooms": 2,
        "car_spaces": null,
        "land_area_sqm": null,
        "house_area_sqm": null,
        "description": "Family home   close to schools.",
        "features": ["Pool", "Garage"]
    })
}
