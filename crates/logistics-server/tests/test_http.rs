//! HTTP contract of the report endpoint

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use logistics_core::{Database, LogisticsConfig, LogisticsError, PdfConverter, Result};
use logistics_server::{http::build_router, AppContext};
use logistics_types::{ClientFields, NewRequest, RequestFields, RequestId, TransportType};
use std::sync::Arc;
use tower::ServiceExt;

struct StaticPdf;

#[async_trait]
impl PdfConverter for StaticPdf {
    async fn convert_html(&self, _html: &str) -> Result<Vec<u8>> {
        Ok(b"%PDF-1.7\n%%EOF".to_vec())
    }
}

struct FailingPdf;

#[async_trait]
impl PdfConverter for FailingPdf {
    async fn convert_html(&self, _html: &str) -> Result<Vec<u8>> {
        Err(LogisticsError::Render("converter offline".to_string()))
    }
}

struct OfflinePdf;

#[async_trait]
impl PdfConverter for OfflinePdf {
    async fn convert_html(&self, _html: &str) -> Result<Vec<u8>> {
        Err(LogisticsError::Render("converter offline".to_string()))
    }

    async fn health_check(&self) -> bool {
        false
    }
}

fn context(converter: Arc<dyn PdfConverter>) -> AppContext {
    AppContext::with_converter(
        LogisticsConfig::default(),
        Database::in_memory().unwrap(),
        converter,
    )
    .unwrap()
}

fn seed_request(ctx: &AppContext) -> RequestId {
    let client = ctx
        .registry
        .create_client(ClientFields::named("ООО Ромашка"))
        .unwrap();
    ctx.ledger
        .create_request(NewRequest::new(
            client.id,
            RequestFields::new(TransportType::Rail, "Acme"),
        ))
        .unwrap()
        .id
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_pdf_download() {
    let ctx = context(Arc::new(StaticPdf));
    let id = seed_request(&ctx);
    let request = ctx.ledger.get_request(id).unwrap();

    let response = build_router(ctx)
        .oneshot(get(&format!("/request/{}/pdf/", id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
        "application/pdf"
    );

    let expected = format!(
        "attachment; filename=\"Заявка_1_{}.pdf\"",
        request.request_date.format("%Y%m%d")
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION].as_bytes(),
        expected.as_bytes()
    );

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn test_missing_request_is_404() {
    let ctx = context(Arc::new(StaticPdf));

    let response = build_router(ctx)
        .oneshot(get("/request/9999/pdf/"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(body_text(response).await, "Заявка не найдена");
}

#[tokio::test]
async fn test_non_numeric_id_is_404() {
    let ctx = context(Arc::new(StaticPdf));

    let response = build_router(ctx)
        .oneshot(get("/request/abc/pdf/"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Заявка не найдена");
}

#[tokio::test]
async fn test_conversion_failure_is_500() {
    let ctx = context(Arc::new(FailingPdf));
    let id = seed_request(&ctx);

    let response = build_router(ctx)
        .oneshot(get(&format!("/request/{}/pdf/", id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "Ошибка при создании PDF");
}

#[tokio::test]
async fn test_health() {
    let response = build_router(context(Arc::new(StaticPdf)))
        .oneshot(get("/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_health_reports_unavailable_converter() {
    let response = build_router(context(Arc::new(OfflinePdf)))
        .oneshot(get("/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_text(response).await, "pdf service unavailable");
}
