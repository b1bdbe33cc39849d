//! HTML to PDF conversion service client
//!
//! Talks to a Gotenberg-compatible service: the HTML document is posted as
//! the `index.html` file of a multipart form and the response body is the PDF.

use crate::config::PdfServiceConfig;
use crate::error::{LogisticsError, Result};
use async_trait::async_trait;
use reqwest::{multipart, Client as HttpClient};
use std::time::Duration;

/// Turns a rendered HTML document into PDF bytes
#[async_trait]
pub trait PdfConverter: Send + Sync {
    async fn convert_html(&self, html: &str) -> Result<Vec<u8>>;

    /// Whether the converter is currently able to take work
    async fn health_check(&self) -> bool {
        true
    }
}

/// PDF magic bytes check
pub fn looks_like_pdf(data: &[u8]) -> bool {
    data.starts_with(b"%PDF-")
}

pub struct PdfService {
    config: PdfServiceConfig,
    http_client: HttpClient,
}

impl PdfService {
    pub fn new(config: PdfServiceConfig) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn convert_url(&self) -> String {
        format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.convert_path
        )
    }
}

#[async_trait]
impl PdfConverter for PdfService {
    async fn convert_html(&self, html: &str) -> Result<Vec<u8>> {
        let url = self.convert_url();
        log::debug!("Converting {} bytes of HTML via {}", html.len(), url);

        let page = multipart::Part::text(html.to_string())
            .file_name("index.html")
            .mime_str("text/html; charset=utf-8")
            .map_err(|e| LogisticsError::Render(format!("Invalid multipart part: {}", e)))?;
        let form = multipart::Form::new().part("files", page);

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| LogisticsError::Render(format!("PDF service unreachable: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LogisticsError::Render(format!(
                "PDF service returned {} - {}",
                status, error_text
            )));
        }

        let pdf_data = response
            .bytes()
            .await
            .map_err(|e| LogisticsError::Render(format!("Failed to read PDF body: {}", e)))?;

        if !looks_like_pdf(&pdf_data) {
            return Err(LogisticsError::Render(
                "PDF service response is not a PDF document".to_string(),
            ));
        }

        Ok(pdf_data.to_vec())
    }

    /// Check PDF service health
    async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.config.base_url.trim_end_matches('/'));

        match self.http_client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                log::warn!("PDF service health check failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service_for(server: &MockServer) -> PdfService {
        PdfService::new(PdfServiceConfig {
            base_url: server.uri(),
            ..PdfServiceConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_looks_like_pdf() {
        assert!(looks_like_pdf(b"%PDF-1.4\n...rest of pdf..."));
        assert!(!looks_like_pdf(b"Not a PDF file"));
        assert!(!looks_like_pdf(b"%PD"));
        assert!(!looks_like_pdf(b""));
    }

    #[test]
    fn test_convert_url_joins_base_and_path() {
        let service = PdfService::new(PdfServiceConfig {
            base_url: "http://gotenberg:3000/".to_string(),
            ..PdfServiceConfig::default()
        })
        .unwrap();
        assert_eq!(
            service.convert_url(),
            "http://gotenberg:3000/forms/chromium/convert/html"
        );
    }

    #[tokio::test]
    async fn test_convert_posts_index_html() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/forms/chromium/convert/html"))
            .and(body_string_contains("filename=\"index.html\""))
            .and(body_string_contains("<h1>Заявка</h1>"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7 test".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let pdf = service_for(&server)
            .convert_html("<h1>Заявка</h1>")
            .await
            .unwrap();
        assert_eq!(pdf, b"%PDF-1.7 test");
    }

    #[tokio::test]
    async fn test_service_error_is_render_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("chromium down"))
            .mount(&server)
            .await;

        let err = service_for(&server).convert_html("<p/>").await.unwrap_err();
        match err {
            LogisticsError::Render(msg) => assert!(msg.contains("503")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_pdf_body_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = service_for(&server).convert_html("<p/>").await.unwrap_err();
        assert!(matches!(err, LogisticsError::Render(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_render_error() {
        let service = PdfService::new(PdfServiceConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 2,
            ..PdfServiceConfig::default()
        })
        .unwrap();

        let err = service.convert_html("<p/>").await.unwrap_err();
        assert!(matches!(err, LogisticsError::Render(_)));
        assert!(!service.health_check().await);
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        assert!(service_for(&server).health_check().await);
    }
}
