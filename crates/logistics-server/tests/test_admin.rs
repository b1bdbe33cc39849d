//! Operator commands against an in-memory database

use async_trait::async_trait;
use chrono::Duration;
use logistics_core::{Database, LogisticsConfig, PdfConverter, Result};
use logistics_server::{admin, cli::cli, AppContext};
use logistics_types::{ClientId, RequestId, ShipmentStatus};
use std::sync::Arc;

struct StaticPdf;

#[async_trait]
impl PdfConverter for StaticPdf {
    async fn convert_html(&self, _html: &str) -> Result<Vec<u8>> {
        Ok(b"%PDF-1.7\n%%EOF".to_vec())
    }
}

fn context() -> AppContext {
    AppContext::with_converter(
        LogisticsConfig::default(),
        Database::in_memory().unwrap(),
        Arc::new(StaticPdf),
    )
    .unwrap()
}

async fn run(ctx: &AppContext, args: &[&str]) -> anyhow::Result<String> {
    let matches = cli().try_get_matches_from(std::iter::once("logistics-server").chain(args.iter().copied()))?;
    let mut out = Vec::new();
    admin::execute(ctx, &matches, &mut out).await?;
    Ok(String::from_utf8(out)?)
}

#[tokio::test]
async fn test_client_commands() {
    let ctx = context();

    let created = run(
        &ctx,
        &["client", "add", "--name", "ООО Ромашка", "--inn", "7701234567", "--email", "info@romashka.ru"],
    )
    .await
    .unwrap();
    assert!(created.contains("ООО Ромашка (ИНН: 7701234567)"));

    let listed = run(&ctx, &["client", "list"]).await.unwrap();
    assert!(listed.contains("ООО Ромашка"));
    assert!(listed.contains("-- page 1, 1 row(s)"));

    run(&ctx, &["client", "update", "1", "--director", "Петров П.П."])
        .await
        .unwrap();
    let shown = run(&ctx, &["client", "show", "1"]).await.unwrap();
    assert!(shown.contains("Директор: Петров П.П."));

    run(&ctx, &["client", "deactivate", "1"]).await.unwrap();
    assert!(!ctx.registry.get_client(ClientId::new(1)).unwrap().is_active());

    let active = run(&ctx, &["client", "list", "--active", "true"]).await.unwrap();
    assert!(active.contains("0 row(s)"));
}

#[tokio::test]
async fn test_invalid_email_is_reported() {
    let ctx = context();
    let err = run(&ctx, &["client", "add", "--name", "Acme", "--email", "broken"])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Validation failed"));
}

#[tokio::test]
async fn test_request_numbering_and_listing() {
    let ctx = context();
    run(&ctx, &["client", "add", "--name", "ООО Ромашка"]).await.unwrap();

    let first = run(
        &ctx,
        &["request", "add", "--client", "1", "--transport", "sea", "--consignor", "Acme", "--weight", "1250.50"],
    )
    .await
    .unwrap();
    assert!(first.contains("Заявка #1 - ООО Ромашка (Море)"));

    let second = run(
        &ctx,
        &["request", "add", "--client", "1", "--transport", "air", "--consignor", "Globex"],
    )
    .await
    .unwrap();
    assert!(second.contains("Заявка #2 - ООО Ромашка (Авиа)"));

    let listed = run(&ctx, &["request", "list"]).await.unwrap();
    assert!(listed.contains("/request/1/pdf/"));
    assert!(listed.contains("/request/2/pdf/"));

    let searched = run(&ctx, &["request", "list", "--search", "globex"]).await.unwrap();
    assert!(searched.contains("Globex"));
    assert!(!searched.contains("/request/1/pdf/"));

    let shown = run(&ctx, &["request", "show", "1"]).await.unwrap();
    assert!(shown.contains("Вес: 1250.50"));
    assert!(shown.contains("Грузополучатель: ООО Ромашка"));
    assert!(shown.contains("Поставка не оформлена"));
}

#[tokio::test]
async fn test_request_date_range_covers_whole_days() {
    let ctx = context();
    run(&ctx, &["client", "add", "--name", "Acme"]).await.unwrap();
    run(
        &ctx,
        &["request", "add", "--client", "1", "--transport", "sea", "--consignor", "Initech"],
    )
    .await
    .unwrap();

    let created = ctx.ledger.get_request(RequestId::new(1)).unwrap().request_date;
    let today = created.date_naive().format("%Y-%m-%d").to_string();
    let yesterday = (created.date_naive() - Duration::days(1))
        .format("%Y-%m-%d")
        .to_string();

    let same_day = run(&ctx, &["request", "list", "--from", &today, "--to", &today])
        .await
        .unwrap();
    assert!(same_day.contains("/request/1/pdf/"));

    let before = run(&ctx, &["request", "list", "--to", &yesterday]).await.unwrap();
    assert!(!before.contains("/request/1/pdf/"));
    assert!(before.contains("0 row(s)"));

    let clients = run(&ctx, &["client", "list", "--from", &today, "--to", &today])
        .await
        .unwrap();
    assert!(clients.contains("Acme"));
}

#[tokio::test]
async fn test_request_update_keeps_number() {
    let ctx = context();
    run(&ctx, &["client", "add", "--name", "Acme"]).await.unwrap();
    run(
        &ctx,
        &["request", "add", "--client", "1", "--transport", "auto", "--consignor", "Initech", "--number", "7"],
    )
    .await
    .unwrap();

    run(&ctx, &["request", "update", "1", "--manager", "Сидоров", "--currency", "usd"])
        .await
        .unwrap();

    let request = ctx.ledger.get_request(RequestId::new(1)).unwrap();
    assert_eq!(request.request_number, 7);
    assert_eq!(request.fields.manager, "Сидоров");
    assert_eq!(request.fields.currency.code(), "USD");
}

#[tokio::test]
async fn test_shipment_commands() {
    let ctx = context();
    run(&ctx, &["client", "add", "--name", "Acme"]).await.unwrap();
    run(
        &ctx,
        &["request", "add", "--client", "1", "--transport", "rail", "--consignor", "Initech"],
    )
    .await
    .unwrap();

    let created = run(&ctx, &["shipment", "add", "--request", "1", "--eta", "2024-05-15"])
        .await
        .unwrap();
    assert!(created.contains("Поставка к заявке #1 [Черновик]"));

    let duplicate = run(&ctx, &["shipment", "add", "--request", "1"]).await;
    assert!(duplicate.is_err());

    let moved = run(&ctx, &["shipment", "status", "1", "in_transit"]).await.unwrap();
    assert!(moved.contains("В пути"));

    let shipment = ctx
        .tracker
        .get_shipment_for_request(RequestId::new(1))
        .unwrap()
        .unwrap();
    assert_eq!(shipment.status(), ShipmentStatus::InTransit);

    let listed = run(&ctx, &["shipment", "list", "--status", "in_transit"])
        .await
        .unwrap();
    assert!(listed.contains("15.05.2024"));

    run(&ctx, &["shipment", "status", "1", "closed"]).await.unwrap();
    let closed = run(&ctx, &["shipment", "show", "1"]).await.unwrap();
    assert!(closed.contains("Статус: Закрыто (завершено)"));
    assert!(!closed.contains("Следующий этап"));
}

#[tokio::test]
async fn test_pdf_command_writes_file() {
    let ctx = context();
    run(&ctx, &["client", "add", "--name", "Acme"]).await.unwrap();
    run(
        &ctx,
        &["request", "add", "--client", "1", "--transport", "sea", "--consignor", "Initech"],
    )
    .await
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("report.pdf");
    let target_arg = target.to_string_lossy().to_string();

    let output = run(&ctx, &["request", "pdf", "1", "--output", &target_arg])
        .await
        .unwrap();
    assert!(output.contains("Saved"));
    assert!(std::fs::read(&target).unwrap().starts_with(b"%PDF-"));

    let html = run(&ctx, &["request", "pdf", "1", "--html"]).await.unwrap();
    assert!(html.contains("<html"));

    assert!(run(&ctx, &["request", "pdf", "42", "--html"]).await.is_err());
}
