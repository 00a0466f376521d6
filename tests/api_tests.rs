//! HTTP 路由集成测试
//!
//! 使用内存存储和固定短码，通过 actix test 工具驱动。

use std::sync::{Arc, Mutex};

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use serde_json::Value;

use urlx::api::configure;
use urlx::api::middleware::RequestLogger;
use urlx::api::services::{ShortenResponse, UiPage};
use urlx::errors::{Result, UrlxError};
use urlx::logging::Logger;
use urlx::shipping::{
    Batch, DropNotifier, FlushPolicy, LogEntry, LogShipper, LogTransport, ShipperOptions,
    TransportError,
};
use urlx::shortener::Shortener;
use urlx::store::{MemoryStore, Store};

// =============================================================================
// 测试辅助
// =============================================================================

struct FixedShortener(&'static str);

impl Shortener for FixedShortener {
    fn shorten(&self, _long_url: &str) -> String {
        self.0.to_string()
    }
}

/// 所有操作都失败的存储
struct BrokenStore;

#[async_trait::async_trait]
impl Store for BrokenStore {
    async fn set(&self, _short: &str, _long: &str) -> Result<()> {
        Err(UrlxError::database_operation("disk on fire"))
    }

    async fn get(&self, _short: &str) -> Result<Option<String>> {
        Err(UrlxError::database_operation("disk on fire"))
    }

    async fn delete(&self, _short: &str) -> Result<()> {
        Err(UrlxError::database_operation("disk on fire"))
    }

    fn backend_name(&self) -> &'static str {
        "broken"
    }
}

#[derive(Default)]
struct CapturingTransport {
    lines: Mutex<Vec<Value>>,
}

impl LogTransport for CapturingTransport {
    fn send(&self, batch: Batch) -> std::result::Result<(), TransportError> {
        let mut lines = self.lines.lock().unwrap();
        for entry in batch {
            lines.push(serde_json::from_str(entry.line()).unwrap());
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "capture"
    }
}

struct IgnoreDrops;

impl DropNotifier for IgnoreDrops {
    fn on_drop(&self, _entry: &LogEntry) {}
}

fn shipping_logger() -> (Logger, Arc<CapturingTransport>) {
    let transport = Arc::new(CapturingTransport::default());
    let shipper = LogShipper::start(
        transport.clone(),
        ShipperOptions {
            queue_capacity: 100,
            policy: FlushPolicy::default(),
        },
        Arc::new(IgnoreDrops),
    )
    .unwrap();
    (Logger::new("urlx", shipper), transport)
}

macro_rules! app {
    ($store:expr, $logger:expr) => {
        app!($store, $logger, UiPage::new("does/not/exist.html"))
    };
    ($store:expr, $logger:expr, $ui:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestLogger::new($logger.clone()))
                .app_data(web::Data::new($store))
                .app_data(web::Data::new(
                    Arc::new(FixedShortener("abc123")) as Arc<dyn Shortener>
                ))
                .app_data(web::Data::new($logger.clone()))
                .app_data(web::Data::new($ui))
                .configure(configure),
        )
        .await
    };
}

fn memory_store() -> Arc<dyn Store> {
    Arc::new(MemoryStore::new())
}

// =============================================================================
// 路由
// =============================================================================

#[actix_web::test]
async fn test_healthz() {
    let logger = Logger::local_only("urlx");
    let app = app!(memory_store(), logger);

    let resp = test::call_service(&app, TestRequest::get().uri("/healthz").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_shorten_then_redirect() {
    let logger = Logger::local_only("urlx");
    let store = memory_store();
    let app = app!(store.clone(), logger);

    let req = TestRequest::post()
        .uri("/shorten")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(r#"{"url":"https://example.com/a/long/path"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: ShortenResponse = test::read_body_json(resp).await;
    assert_eq!(body.short, "abc123");

    let resp = test::call_service(&app, TestRequest::get().uri("/abc123").to_request()).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get("Location").unwrap(),
        "https://example.com/a/long/path"
    );
}

#[actix_web::test]
async fn test_shorten_rejects_bad_input() {
    let logger = Logger::local_only("urlx");
    let app = app!(memory_store(), logger);

    for payload in ["not json", r#"{"url":""}"#, r#"{}"#] {
        let req = TestRequest::post()
            .uri("/shorten")
            .insert_header(("Content-Type", "application/json"))
            .set_payload(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "payload {}", payload);
    }
}

#[actix_web::test]
async fn test_shorten_only_rejects_empty_url() {
    let logger = Logger::local_only("urlx");
    let store = memory_store();
    let app = app!(store.clone(), logger);

    let req = TestRequest::post()
        .uri("/shorten")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(r#"{"url":"   "}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(store.get("abc123").await.unwrap().as_deref(), Some("   "));
}

#[actix_web::test]
async fn test_unknown_short_is_404() {
    let logger = Logger::local_only("urlx");
    let app = app!(memory_store(), logger);

    let resp = test::call_service(&app, TestRequest::get().uri("/zzzzzz").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_delete_then_lookup() {
    let logger = Logger::local_only("urlx");
    let store = memory_store();
    store.set("gone01", "https://example.com").await.unwrap();
    let app = app!(store.clone(), logger);

    let resp =
        test::call_service(&app, TestRequest::delete().uri("/delete/gone01").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = test::call_service(&app, TestRequest::get().uri("/gone01").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // 删除不存在的短码同样返回 204
    let resp =
        test::call_service(&app, TestRequest::delete().uri("/delete/gone01").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn test_store_failures_are_500() {
    let logger = Logger::local_only("urlx");
    let app = app!(Arc::new(BrokenStore) as Arc<dyn Store>, logger);

    let resp = test::call_service(&app, TestRequest::get().uri("/abc123").to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let req = TestRequest::post()
        .uri("/shorten")
        .set_payload(r#"{"url":"https://example.com"}"#)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let resp =
        test::call_service(&app, TestRequest::delete().uri("/delete/abc123").to_request()).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[actix_web::test]
async fn test_ui_page_served_when_present() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.html");
    std::fs::write(&path, "<html><body>Test UI</body></html>").unwrap();

    let logger = Logger::local_only("urlx");
    let app = app!(memory_store(), logger, UiPage::new(&path));

    let resp = test::call_service(&app, TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"<html><body>Test UI</body></html>");
}

#[actix_web::test]
async fn test_ui_page_missing() {
    let logger = Logger::local_only("urlx");
    let app = app!(memory_store(), logger);

    let resp = test::call_service(&app, TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = test::read_body(resp).await;
    assert_eq!(&body[..], b"UI not found");
}

// =============================================================================
// 日志上报
// =============================================================================

#[actix_web::test]
async fn test_requests_are_shipped_in_order() {
    let (logger, transport) = shipping_logger();
    let app = app!(memory_store(), logger);

    let req = TestRequest::post()
        .uri("/shorten")
        .set_payload(r#"{"url":"https://example.com"}"#)
        .to_request();
    test::call_service(&app, req).await;
    test::call_service(&app, TestRequest::get().uri("/abc123").to_request()).await;

    let drain = logger.clone();
    tokio::task::spawn_blocking(move || drain.shutdown())
        .await
        .unwrap();

    let lines = transport.lines.lock().unwrap();
    let messages: Vec<&str> = lines.iter().map(|v| v["msg"].as_str().unwrap()).collect();
    assert_eq!(
        messages,
        [
            "Incoming request",
            "Shortened URL",
            "Incoming request",
            "Redirecting short URL"
        ]
    );

    assert_eq!(lines[0]["method"], "POST");
    assert_eq!(lines[0]["path"], "/shorten");
    assert_eq!(lines[1]["short"], "abc123");
    assert_eq!(lines[1]["long"], "https://example.com");
    assert_eq!(lines[3]["level"], "info");
    assert!(lines.iter().all(|v| v["caller"].as_str().is_some()));
}

#[actix_web::test]
async fn test_bad_shorten_request_ships_error_line() {
    let (logger, transport) = shipping_logger();
    let app = app!(memory_store(), logger);

    let req = TestRequest::post()
        .uri("/shorten")
        .set_payload("{broken")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let drain = logger.clone();
    tokio::task::spawn_blocking(move || drain.shutdown())
        .await
        .unwrap();

    let lines = transport.lines.lock().unwrap();
    let error_line = lines
        .iter()
        .find(|v| v["msg"] == "Invalid shorten request")
        .expect("error line shipped");
    assert_eq!(error_line["level"], "error");
    assert!(error_line["error"].as_str().is_some());
}
