//! HTTP surface: the request report download and a health probe

use crate::AppContext;
use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use logistics_core::{LogisticsError, RenderedReport};
use logistics_types::RequestId;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::net::TcpListener;

const REQUEST_NOT_FOUND: &str = "Заявка не найдена";
const PDF_FAILED: &str = "Ошибка при создании PDF";
const PDF_SERVICE_DOWN: &str = "pdf service unavailable";

/// Build the router with all routes and middleware
pub fn build_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/request/:id/pdf/", get(request_pdf))
        .route("/health", get(health))
        .layer(middleware::from_fn(log_requests))
        .with_state(ctx)
}

/// Serve until Ctrl-C
pub async fn serve(ctx: AppContext, addr: SocketAddr) -> anyhow::Result<()> {
    if !ctx.converter.health_check().await {
        log::warn!("PDF service is not reachable; report downloads will fail until it is");
    }

    let listener = TcpListener::bind(addr).await?;
    log::info!("Logistics server listening on {}", addr);

    axum::serve(listener, build_router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Logistics server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}

/// 200 while the PDF converter answers, 503 otherwise
async fn health(State(ctx): State<AppContext>) -> (StatusCode, &'static str) {
    if ctx.converter.health_check().await {
        (StatusCode::OK, "ok")
    } else {
        log::warn!("Health check: PDF service unavailable");
        (StatusCode::SERVICE_UNAVAILABLE, PDF_SERVICE_DOWN)
    }
}

/// GET /request/:id/pdf/
async fn request_pdf(
    State(ctx): State<AppContext>,
    Path(raw_id): Path<String>,
) -> Result<Response, ReportError> {
    let id = raw_id
        .parse::<i64>()
        .map(RequestId::new)
        .map_err(|_| ReportError(LogisticsError::NotFound(format!("Request {}", raw_id))))?;

    let report = ctx.renderer.render_request_pdf(id).await?;
    pdf_response(report)
}

fn pdf_response(report: RenderedReport) -> Result<Response, ReportError> {
    // The file name is Cyrillic: build the header from raw UTF-8 bytes
    let disposition = HeaderValue::from_bytes(report.content_disposition().as_bytes())
        .map_err(|e| ReportError(LogisticsError::Render(e.to_string())))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.bytes,
    )
        .into_response())
}

/// Error of the report endpoint, answered as plain text
#[derive(Debug)]
pub struct ReportError(pub LogisticsError);

impl From<LogisticsError> for ReportError {
    fn from(err: LogisticsError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        match &self.0 {
            LogisticsError::NotFound(_) => {
                log::info!("Report not served: {}", self.0);
                (StatusCode::NOT_FOUND, REQUEST_NOT_FOUND).into_response()
            }
            LogisticsError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone()).into_response()
            }
            _ => {
                log::error!("Report failed: {}", self.0);
                (StatusCode::INTERNAL_SERVER_ERROR, PDF_FAILED).into_response()
            }
        }
    }
}

async fn log_requests(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    log::info!(
        "{} {} -> {} ({} ms)",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}
