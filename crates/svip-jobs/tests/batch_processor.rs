//! End-to-end tests for `BatchProcessor` over a wiremock image server.
//!
//! Each test wires a real `ImageInspector` (zero delay) and an in-memory
//! `StoreDirectory` to a fresh `JobRegistry`, then drives `process` directly
//! so assertions run after the batch reaches its terminal state.

use std::io::Cursor;
use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use svip_core::{Store, StoreDirectory};
use svip_inspector::{ImageInspector, ProcessingDelay};
use svip_jobs::{BatchProcessor, JobRegistry, JobStatus};

fn store(id: &str, name: &str, area: &str) -> Store {
    Store {
        store_id: id.to_string(),
        store_name: name.to_string(),
        area_code: area.to_string(),
    }
}

fn test_directory() -> Arc<StoreDirectory> {
    Arc::new(
        StoreDirectory::from_stores(vec![
            store("S1", "Frozen Yogurt Land", "7100015"),
            store("S2", "Canyon Crest Cafe", "7100016"),
        ])
        .expect("valid test stores"),
    )
}

fn test_processor(registry: &JobRegistry) -> BatchProcessor {
    let inspector = ImageInspector::new(5, "svip-test/0.1", ProcessingDelay::None)
        .expect("failed to build test ImageInspector");
    BatchProcessor::new(registry.clone(), test_directory(), Arc::new(inspector))
}

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::new(width, height);
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png)
        .expect("encode test PNG");
    buf.into_inner()
}

async fn mount_png(server: &MockServer, image_path: &str, width: u32, height: u32) {
    Mock::given(method("GET"))
        .and(path(image_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(png_bytes(width, height))
                .insert_header("content-type", "image/png"),
        )
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn valid_batch_completes_with_one_result_per_image_in_order() {
    let server = MockServer::start().await;
    mount_png(&server, "/a.png", 100, 50).await;
    mount_png(&server, "/b.png", 10, 20).await;
    mount_png(&server, "/c.png", 30, 40).await;

    let registry = JobRegistry::new();
    let processor = test_processor(&registry);
    registry.create("job_ok").await;

    let visits = vec![
        json!({
            "store_id": "S1",
            "image_url": [format!("{}/a.png", server.uri()), format!("{}/b.png", server.uri())],
            "visit_time": "2024-01-01T00:00:00Z"
        }),
        json!({
            "store_id": "S2",
            "image_url": [format!("{}/c.png", server.uri())],
            "visit_time": "2024-01-02T00:00:00Z"
        }),
    ];

    processor.process("job_ok", visits).await;

    let job = registry.snapshot("job_ok").await.expect("job exists");
    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.errors.is_empty());
    assert_eq!(job.results.len(), 3, "one result per image locator");

    assert_eq!(job.results[0].image_url, format!("{}/a.png", server.uri()));
    assert_eq!(job.results[0].store_id, "S1");
    assert_eq!(job.results[0].store_name, "Frozen Yogurt Land");
    assert_eq!(job.results[0].area_code, "7100015");
    assert_eq!(job.results[0].visit_time, json!("2024-01-01T00:00:00Z"));
    assert_eq!(job.results[0].perimeter, 300, "2 * (100 + 50)");

    assert_eq!(job.results[1].image_url, format!("{}/b.png", server.uri()));
    assert_eq!(job.results[1].perimeter, 60);

    assert_eq!(job.results[2].store_id, "S2");
    assert_eq!(job.results[2].perimeter, 140);
}

#[tokio::test]
async fn visit_with_empty_image_list_contributes_no_results() {
    let registry = JobRegistry::new();
    let processor = test_processor(&registry);
    registry.create("job_empty").await;

    let visits = vec![json!({
        "store_id": "S1",
        "image_url": [],
        "visit_time": "2024-01-01T00:00:00Z"
    })];

    processor.process("job_empty", visits).await;

    let job = registry.snapshot("job_empty").await.expect("job exists");
    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.results.is_empty());
}

// ---------------------------------------------------------------------------
// Stop-on-first-error semantics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_store_fails_job_and_halts_batch() {
    let server = MockServer::start().await;
    mount_png(&server, "/a.png", 100, 50).await;

    // The second visit's image must never be fetched.
    Mock::given(method("GET"))
        .and(path("/never.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes(1, 1)))
        .expect(0)
        .mount(&server)
        .await;

    let registry = JobRegistry::new();
    let processor = test_processor(&registry);
    registry.create("job_unknown").await;

    let visits = vec![
        json!({
            "store_id": "S1",
            "image_url": [format!("{}/a.png", server.uri())],
            "visit_time": "t1"
        }),
        json!({
            "store_id": "NOPE",
            "image_url": [format!("{}/never.png", server.uri())],
            "visit_time": "t2"
        }),
        json!({
            "store_id": "S2",
            "image_url": [format!("{}/never.png", server.uri())],
            "visit_time": "t3"
        }),
    ];

    processor.process("job_unknown", visits).await;

    let job = registry.snapshot("job_unknown").await.expect("job exists");
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.errors.len(), 1, "exactly one error entry");
    assert_eq!(job.errors[0].store_id, "NOPE");
    assert!(
        job.errors[0].error.contains("NOPE"),
        "error message references the offending store id, got: {}",
        job.errors[0].error
    );
    assert_eq!(
        job.results.len(),
        1,
        "results keep exactly the entries accumulated before the failure"
    );
    assert_eq!(job.results[0].store_id, "S1");
}

#[tokio::test]
async fn malformed_store_id_fails_job() {
    let registry = JobRegistry::new();
    let processor = test_processor(&registry);
    registry.create("job_bad_store").await;

    let visits = vec![json!({
        "store_id": 12345,
        "image_url": ["http://x/a.png"],
        "visit_time": "t1"
    })];

    processor.process("job_bad_store", visits).await;

    let job = registry.snapshot("job_bad_store").await.expect("job exists");
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.errors.len(), 1);
    assert!(
        job.errors[0].error.contains("store_id"),
        "error names the malformed field, got: {}",
        job.errors[0].error
    );
}

#[tokio::test]
async fn malformed_image_url_fails_job_before_any_fetch() {
    let registry = JobRegistry::new();
    let processor = test_processor(&registry);
    registry.create("job_bad_urls").await;

    let visits = vec![json!({
        "store_id": "S1",
        "image_url": "http://x/a.png",
        "visit_time": "t1"
    })];

    processor.process("job_bad_urls", visits).await;

    let job = registry.snapshot("job_bad_urls").await.expect("job exists");
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.errors[0].store_id, "S1");
    assert!(
        job.errors[0].error.contains("image_url"),
        "error names the malformed field, got: {}",
        job.errors[0].error
    );
    assert!(job.results.is_empty());
}

#[tokio::test]
async fn nth_image_fetch_failure_keeps_prior_results() {
    let server = MockServer::start().await;
    mount_png(&server, "/a.png", 100, 50).await;
    mount_png(&server, "/b.png", 10, 20).await;

    Mock::given(method("GET"))
        .and(path("/gone.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let registry = JobRegistry::new();
    let processor = test_processor(&registry);
    registry.create("job_fetch_fail").await;

    let visits = vec![json!({
        "store_id": "S1",
        "image_url": [
            format!("{}/a.png", server.uri()),
            format!("{}/b.png", server.uri()),
            format!("{}/gone.png", server.uri())
        ],
        "visit_time": "t1"
    })];

    processor.process("job_fetch_fail", visits).await;

    let job = registry.snapshot("job_fetch_fail").await.expect("job exists");
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.errors.len(), 1);
    assert_eq!(job.errors[0].store_id, "S1");
    assert!(
        job.errors[0].error.contains("404"),
        "fetch error carries the status detail, got: {}",
        job.errors[0].error
    );
    assert_eq!(
        job.results.len(),
        2,
        "exactly the successes strictly before the failing image"
    );
}

#[tokio::test]
async fn undecodable_image_fails_job_with_decode_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/garbage.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("not pixels")
                .insert_header("content-type", "image/png"),
        )
        .mount(&server)
        .await;

    let registry = JobRegistry::new();
    let processor = test_processor(&registry);
    registry.create("job_decode_fail").await;

    let visits = vec![json!({
        "store_id": "S1",
        "image_url": [format!("{}/garbage.png", server.uri())],
        "visit_time": "t1"
    })];

    processor.process("job_decode_fail", visits).await;

    let job = registry.snapshot("job_decode_fail").await.expect("job exists");
    assert_eq!(job.status, JobStatus::Failed);
    assert!(
        job.errors[0]
            .error
            .contains("unable to calculate image dimensions"),
        "decode failures keep the canonical message, got: {}",
        job.errors[0].error
    );
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concurrent_jobs_never_interleave_results() {
    let server = MockServer::start().await;
    mount_png(&server, "/a.png", 100, 50).await;
    mount_png(&server, "/b.png", 10, 20).await;

    let registry = JobRegistry::new();
    let processor = test_processor(&registry);
    registry.create("job_a").await;
    registry.create("job_b").await;

    let visits_a = vec![json!({
        "store_id": "S1",
        "image_url": [format!("{}/a.png", server.uri())],
        "visit_time": "t1"
    })];
    let visits_b = vec![json!({
        "store_id": "S2",
        "image_url": [format!("{}/b.png", server.uri())],
        "visit_time": "t2"
    })];

    let handle_a = processor.spawn("job_a".to_string(), visits_a);
    let handle_b = processor.spawn("job_b".to_string(), visits_b);
    handle_a.await.expect("job_a task");
    handle_b.await.expect("job_b task");

    let job_a = registry.snapshot("job_a").await.expect("job_a exists");
    let job_b = registry.snapshot("job_b").await.expect("job_b exists");

    assert_eq!(job_a.status, JobStatus::Completed);
    assert_eq!(job_b.status, JobStatus::Completed);
    assert_eq!(job_a.results.len(), 1);
    assert_eq!(job_b.results.len(), 1);
    assert_eq!(job_a.results[0].store_id, "S1");
    assert_eq!(job_b.results[0].store_id, "S2");
}
