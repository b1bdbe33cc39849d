//! Operator commands: manage clients, requests and shipments from the terminal

use crate::AppContext;
use anyhow::{anyhow, Context};
use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use clap::ArgMatches;
use logistics_core::{ClientFilter, Pagination, RequestFilter, ShipmentFilter};
use logistics_types::{
    Client, ClientFields, ClientId, Currency, DocumentType, NewRequest, Request, RequestFields,
    RequestId, Shipment, ShipmentFields, ShipmentId, ShipmentStatus, TransportType,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

/// Run the `client`, `request` or `shipment` command selected in `matches`
pub async fn execute(ctx: &AppContext, matches: &ArgMatches, out: &mut dyn Write) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("client", sub)) => client(ctx, sub, out),
        Some(("request", sub)) => request(ctx, sub, out).await,
        Some(("shipment", sub)) => shipment(ctx, sub, out),
        Some((other, _)) => Err(anyhow!("Unknown command: {}", other)),
        None => Err(anyhow!("No command given. Use --help for options.")),
    }
}

fn client(ctx: &AppContext, matches: &ArgMatches, out: &mut dyn Write) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("add", m)) => {
            let mut fields = ClientFields::default();
            apply_client_args(&mut fields, m);
            let client = ctx.registry.create_client(fields)?;
            writeln!(out, "Created client {}: {}", client.id, client)?;
        }
        Some(("list", m)) => {
            let filter = ClientFilter {
                search: m.get_one::<String>("search").cloned(),
                is_active: m.get_one::<bool>("active").copied(),
                created_from: m.get_one::<NaiveDate>("from").map(|d| start_of_day(*d)),
                created_to: m.get_one::<NaiveDate>("to").map(|d| end_of_day(*d)),
                page: Some(page(m)),
            };
            let clients = ctx.registry.list_clients(&filter)?;
            for client in &clients {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}",
                    client.id,
                    client,
                    or_dash(&client.fields.company_phone),
                    if client.is_active() { "активен" } else { "неактивен" }
                )?;
            }
            write_page_footer(out, page(m), clients.len())?;
        }
        Some(("show", m)) => {
            let client = ctx.registry.get_client(ClientId::new(id(m)))?;
            write_client(out, &client)?;
        }
        Some(("update", m)) => {
            let id = ClientId::new(id(m));
            let mut fields = ctx.registry.get_client(id)?.fields;
            apply_client_args(&mut fields, m);
            if let Some(active) = m.get_one::<bool>("active") {
                fields.is_active = *active;
            }
            let client = ctx.registry.update_client(id, fields)?;
            writeln!(out, "Updated client {}: {}", client.id, client)?;
        }
        Some(("deactivate", m)) => {
            let client = ctx.registry.deactivate_client(ClientId::new(id(m)))?;
            writeln!(out, "Deactivated client {}: {}", client.id, client)?;
        }
        Some(("delete", m)) => {
            let id = ClientId::new(id(m));
            ctx.registry.delete_client(id)?;
            writeln!(out, "Deleted client {}", id)?;
        }
        _ => return Err(anyhow!("Unknown client command")),
    }
    Ok(())
}

async fn request(ctx: &AppContext, matches: &ArgMatches, out: &mut dyn Write) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("add", m)) => {
            let client_id = ClientId::new(required::<i64>(m, "client")?);
            let transport = required::<TransportType>(m, "transport")?;
            let consignor = required::<String>(m, "consignor")?;

            let mut fields = RequestFields::new(transport, consignor);
            apply_request_args(&mut fields, m);

            let mut new_request = NewRequest::new(client_id, fields);
            if let Some(number) = m.get_one::<i64>("number") {
                new_request = new_request.with_number(*number);
            }

            let created = ctx.ledger.create_request(new_request)?;
            let client = ctx.registry.get_client(created.client_id)?;
            writeln!(out, "Created request {}: {}", created.id, created.title(client.name()))?;
        }
        Some(("list", m)) => {
            let filter = RequestFilter {
                client_id: m.get_one::<i64>("client").map(|id| ClientId::new(*id)),
                transport_type: m.get_one::<TransportType>("transport").copied(),
                date_from: m.get_one::<NaiveDate>("from").map(|d| start_of_day(*d)),
                date_to: m.get_one::<NaiveDate>("to").map(|d| end_of_day(*d)),
                search: m.get_one::<String>("search").cloned(),
                page: Some(page(m)),
            };
            let requests = ctx.ledger.list_requests(&filter)?;

            let mut client_names: HashMap<ClientId, String> = HashMap::new();
            for request in &requests {
                if !client_names.contains_key(&request.client_id) {
                    let client = ctx.registry.get_client(request.client_id)?;
                    client_names.insert(request.client_id, client.fields.name);
                }
                let client_name = client_names
                    .get(&request.client_id)
                    .map(String::as_str)
                    .unwrap_or_default();

                writeln!(
                    out,
                    "{}\t#{}\t{}\t{}\t{}\t{}\t{}",
                    request.id,
                    request.request_number,
                    request.request_date.format("%d.%m.%Y"),
                    client_name,
                    request.fields.transport_type.label(),
                    request.fields.consignor,
                    pdf_link(request.id)
                )?;
            }
            write_page_footer(out, page(m), requests.len())?;
        }
        Some(("show", m)) => {
            let request = ctx.ledger.get_request(RequestId::new(id(m)))?;
            let client = ctx.registry.get_client(request.client_id)?;
            let shipment = ctx.tracker.get_shipment_for_request(request.id)?;
            write_request(out, &request, &client, shipment.as_ref())?;
        }
        Some(("update", m)) => {
            let id = RequestId::new(id(m));
            let mut fields = ctx.ledger.get_request(id)?.fields;
            if let Some(transport) = m.get_one::<TransportType>("transport") {
                fields.transport_type = *transport;
            }
            if let Some(consignor) = m.get_one::<String>("consignor") {
                fields.consignor = consignor.clone();
            }
            apply_request_args(&mut fields, m);

            let updated = ctx.ledger.update_request(id, fields)?;
            let client = ctx.registry.get_client(updated.client_id)?;
            writeln!(out, "Updated request {}: {}", updated.id, updated.title(client.name()))?;
        }
        Some(("delete", m)) => {
            let id = RequestId::new(id(m));
            ctx.ledger.delete_request(id)?;
            writeln!(out, "Deleted request {}", id)?;
        }
        Some(("pdf", m)) => {
            let id = RequestId::new(id(m));
            if m.get_flag("html") {
                let html = ctx.renderer.render_request_html(id)?;
                out.write_all(html.as_bytes())?;
                return Ok(());
            }

            let report = ctx.renderer.render_request_pdf(id).await?;
            let target = m
                .get_one::<String>("output")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(&report.filename));
            std::fs::write(&target, &report.bytes)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            writeln!(
                out,
                "Saved {} ({} bytes)",
                target.display(),
                report.bytes.len()
            )?;
        }
        _ => return Err(anyhow!("Unknown request command")),
    }
    Ok(())
}

fn shipment(ctx: &AppContext, matches: &ArgMatches, out: &mut dyn Write) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("add", m)) => {
            let request_id = RequestId::new(required::<i64>(m, "request")?);
            let mut fields = ShipmentFields::default();
            apply_shipment_args(&mut fields, m);

            let shipment = ctx.tracker.create_shipment(request_id, fields)?;
            let request = ctx.ledger.get_request(request_id)?;
            writeln!(
                out,
                "Created shipment {}: {} [{}]",
                shipment.id,
                shipment.title(request.request_number),
                shipment.status().label()
            )?;
        }
        Some(("list", m)) => {
            let filter = ShipmentFilter {
                status: m.get_one::<ShipmentStatus>("status").copied(),
                document_type: m.get_one::<DocumentType>("document-type").copied(),
                page: Some(page(m)),
            };
            let items = ctx.tracker.list_shipments(&filter)?;
            for item in &items {
                let shipment = &item.shipment;
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}\t{}",
                    shipment.id,
                    shipment.title(item.request_number),
                    shipment.status().label(),
                    date(shipment.fields.eta),
                    or_dash(&shipment.fields.tracking_number)
                )?;
            }
            write_page_footer(out, page(m), items.len())?;
        }
        Some(("show", m)) => {
            let shipment = ctx.tracker.get_shipment(ShipmentId::new(id(m)))?;
            let request = ctx.ledger.get_request(shipment.request_id)?;
            write_shipment(out, &shipment, request.request_number)?;
        }
        Some(("update", m)) => {
            let id = ShipmentId::new(id(m));
            let mut fields = ctx.tracker.get_shipment(id)?.fields;
            apply_shipment_args(&mut fields, m);
            let shipment = ctx.tracker.update_shipment(id, fields)?;
            writeln!(
                out,
                "Updated shipment {} [{}]",
                shipment.id,
                shipment.status().label()
            )?;
        }
        Some(("status", m)) => {
            let status = required::<ShipmentStatus>(m, "status")?;
            let shipment = ctx.tracker.set_status(ShipmentId::new(id(m)), status)?;
            writeln!(
                out,
                "Shipment {} is now {}",
                shipment.id,
                shipment.status().label()
            )?;
        }
        Some(("delete", m)) => {
            let id = ShipmentId::new(id(m));
            ctx.tracker.delete_shipment(id)?;
            writeln!(out, "Deleted shipment {}", id)?;
        }
        _ => return Err(anyhow!("Unknown shipment command")),
    }
    Ok(())
}

fn apply_client_args(fields: &mut ClientFields, m: &ArgMatches) {
    let targets: [(&str, &mut String); 18] = [
        ("name", &mut fields.name),
        ("inn", &mut fields.inn),
        ("kpp", &mut fields.kpp),
        ("ogrn", &mut fields.ogrn),
        ("address", &mut fields.legal_address),
        ("phone", &mut fields.company_phone),
        ("email", &mut fields.company_email),
        ("director", &mut fields.director),
        ("bank-name", &mut fields.bank.bank_name),
        ("bik", &mut fields.bank.bik),
        ("corr-account", &mut fields.bank.correspondent_account),
        ("account", &mut fields.bank.payment_account),
        ("contact", &mut fields.primary_contact.name),
        ("contact-phone", &mut fields.primary_contact.phone),
        ("contact-email", &mut fields.primary_contact.email),
        ("contact2", &mut fields.secondary_contact.name),
        ("contact2-phone", &mut fields.secondary_contact.phone),
        ("contact2-email", &mut fields.secondary_contact.email),
    ];
    for (arg, target) in targets {
        set_text(m, arg, target);
    }
}

/// Optional request fields; transport type and consignor are handled by the caller
fn apply_request_args(fields: &mut RequestFields, m: &ArgMatches) {
    if let Some(border) = m.get_one::<TransportType>("border") {
        fields.transport_at_border = Some(*border);
    }
    set_text(m, "consignee", &mut fields.consignee);
    set_text(m, "country", &mut fields.country_of_origin);
    if let Some(weight) = m.get_one::<Decimal>("weight") {
        fields.gross_weight = Some(*weight);
    }
    if let Some(volume) = m.get_one::<Decimal>("volume") {
        fields.volume = Some(*volume);
    }
    if let Some(value) = m.get_one::<Decimal>("value") {
        fields.declared_value = Some(*value);
    }
    if let Some(currency) = m.get_one::<Currency>("currency") {
        fields.currency = *currency;
    }
    if let Some(insurance) = m.get_one::<bool>("insurance") {
        fields.insurance_required = *insurance;
    }
    set_text(m, "notes", &mut fields.special_notes);
    set_text(m, "manager", &mut fields.manager);
    if let Some(number) = m.get_one::<i64>("shipment-number") {
        fields.shipment_number = Some(*number);
    }
}

fn apply_shipment_args(fields: &mut ShipmentFields, m: &ArgMatches) {
    if let Some(status) = m.get_one::<ShipmentStatus>("status") {
        fields.status = *status;
    }
    let dates: [(&str, &mut Option<NaiveDate>); 5] = [
        ("etd", &mut fields.etd),
        ("eta", &mut fields.eta),
        ("departed", &mut fields.actual_departure),
        ("arrived", &mut fields.actual_arrival),
        ("delivered", &mut fields.delivery_date),
    ];
    for (arg, target) in dates {
        if let Some(value) = m.get_one::<NaiveDate>(arg) {
            *target = Some(*value);
        }
    }
    if let Some(document_type) = m.get_one::<DocumentType>("document-type") {
        fields.document_type = Some(*document_type);
    }
    set_text(m, "document-number", &mut fields.document_number);
    set_text(m, "carrier", &mut fields.carrier);
    set_text(m, "tracking", &mut fields.tracking_number);
    set_text(m, "customs", &mut fields.customs_declaration);
    set_text(m, "comments", &mut fields.comments);
}

fn set_text(m: &ArgMatches, arg: &str, target: &mut String) {
    if let Some(value) = m.get_one::<String>(arg) {
        *target = value.clone();
    }
}

fn required<T: Clone + Send + Sync + 'static>(m: &ArgMatches, arg: &str) -> anyhow::Result<T> {
    m.get_one::<T>(arg)
        .cloned()
        .ok_or_else(|| anyhow!("--{} is required", arg))
}

fn id(m: &ArgMatches) -> i64 {
    m.get_one::<i64>("id").copied().unwrap_or_default()
}

fn page(m: &ArgMatches) -> Pagination {
    Pagination::page(m.get_one::<u32>("page").copied().unwrap_or(1))
}

fn pdf_link(id: RequestId) -> String {
    format!("/request/{}/pdf/", id)
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::default()).and_utc()
}

/// Exclusive upper bound covering the whole day
fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date.checked_add_days(Days::new(1)).unwrap_or(date))
}

fn write_page_footer(out: &mut dyn Write, page: Pagination, rows: usize) -> std::io::Result<()> {
    writeln!(out, "-- page {}, {} row(s)", page.page, rows)
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "—"
    } else {
        value
    }
}

fn date(value: Option<NaiveDate>) -> String {
    value
        .map(|d| d.format("%d.%m.%Y").to_string())
        .unwrap_or_else(|| "—".to_string())
}

fn decimal(value: Option<Decimal>) -> String {
    value.map(|d| d.to_string()).unwrap_or_else(|| "—".to_string())
}

fn write_client(out: &mut dyn Write, client: &Client) -> std::io::Result<()> {
    let f = &client.fields;
    writeln!(out, "Клиент {}: {}", client.id, client)?;
    writeln!(out, "  КПП: {}  ОГРН: {}", or_dash(&f.kpp), or_dash(&f.ogrn))?;
    writeln!(out, "  Юридический адрес: {}", or_dash(&f.legal_address))?;
    writeln!(out, "  Телефон: {}  Email: {}", or_dash(&f.company_phone), or_dash(&f.company_email))?;
    writeln!(out, "  Директор: {}", or_dash(&f.director))?;
    writeln!(
        out,
        "  Банк: {}  БИК: {}  К/с: {}  Р/с: {}",
        or_dash(&f.bank.bank_name),
        or_dash(&f.bank.bik),
        or_dash(&f.bank.correspondent_account),
        or_dash(&f.bank.payment_account)
    )?;
    for contact in [&f.primary_contact, &f.secondary_contact] {
        if !contact.is_empty() {
            writeln!(
                out,
                "  Контакт: {}  {}  {}",
                or_dash(&contact.name),
                or_dash(&contact.phone),
                or_dash(&contact.email)
            )?;
        }
    }
    writeln!(out, "  Активен: {}", if f.is_active { "да" } else { "нет" })?;
    writeln!(out, "  Создан: {}", client.created_at.format("%d.%m.%Y %H:%M"))
}

fn write_request(
    out: &mut dyn Write,
    request: &Request,
    client: &Client,
    shipment: Option<&Shipment>,
) -> std::io::Result<()> {
    let f = &request.fields;
    writeln!(out, "{}", request.title(client.name()))?;
    writeln!(out, "  Дата: {}", request.request_date.format("%d.%m.%Y %H:%M"))?;
    writeln!(out, "  Клиент: {}", client)?;
    writeln!(
        out,
        "  Транспорт: {}  На границе: {}",
        f.transport_type.label(),
        f.transport_at_border.map(|t| t.label()).unwrap_or("—")
    )?;
    writeln!(out, "  Грузоотправитель: {}", f.consignor)?;
    writeln!(
        out,
        "  Грузополучатель: {}",
        if f.consignee.trim().is_empty() {
            client.name()
        } else {
            f.consignee.as_str()
        }
    )?;
    writeln!(out, "  Страна происхождения: {}", f.country_of_origin)?;
    writeln!(
        out,
        "  Вес: {}  Объем: {}  Стоимость: {} {}",
        decimal(f.gross_weight),
        decimal(f.volume),
        decimal(f.declared_value),
        f.currency.code()
    )?;
    writeln!(
        out,
        "  Страхование: {}",
        if f.insurance_required { "да" } else { "нет" }
    )?;
    writeln!(out, "  Менеджер: {}", or_dash(&f.manager))?;
    if let Some(number) = f.shipment_number {
        writeln!(out, "  Номер отгрузки: {}", number)?;
    }
    match shipment {
        Some(s) => writeln!(
            out,
            "  Поставка {}: {}",
            s.id,
            s.status().label()
        )?,
        None => writeln!(out, "  Поставка не оформлена")?,
    }
    writeln!(out, "  PDF: {}", pdf_link(request.id))
}

fn write_shipment(out: &mut dyn Write, shipment: &Shipment, request_number: i64) -> std::io::Result<()> {
    let f = &shipment.fields;
    writeln!(out, "{}", shipment.title(request_number))?;
    if f.status.is_terminal() {
        writeln!(out, "  Статус: {} (завершено)", f.status.label())?;
    } else {
        writeln!(out, "  Статус: {}", f.status.label())?;
    }
    if let Some(next) = f.status.next() {
        writeln!(out, "  Следующий этап: {}", next.label())?;
    }
    writeln!(out, "  ETD: {}  ETA: {}", date(f.etd), date(f.eta))?;
    writeln!(
        out,
        "  Отправка: {}  Прибытие: {}  Доставка: {}",
        date(f.actual_departure),
        date(f.actual_arrival),
        date(f.delivery_date)
    )?;
    writeln!(
        out,
        "  Документ: {} {}",
        f.document_type.map(|d| d.label()).unwrap_or("—"),
        or_dash(&f.document_number)
    )?;
    writeln!(out, "  Перевозчик: {}", or_dash(&f.carrier))?;
    writeln!(out, "  Трек-номер: {}", or_dash(&f.tracking_number))?;
    writeln!(out, "  Таможенная декларация: {}", or_dash(&f.customs_declaration))?;
    writeln!(out, "  Комментарии: {}", or_dash(&f.comments))
}
