//! Command line definition of the `logistics-server` binary

use chrono::NaiveDate;
use clap::{value_parser, Arg, ArgAction, Command};
use logistics_types::{Currency, DocumentType, ShipmentStatus, TransportType};
use rust_decimal::Decimal;
use std::str::FromStr;

pub fn cli() -> Command {
    Command::new("logistics-server")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Freight forwarding tracker: clients, transportation requests and shipments")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("Configuration file path")
                .global(true)
                .default_value("/app/config/logistics.json"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("Data directory holding the SQLite database")
                .global(true)
                .default_value("/data/logistics"),
        )
        .arg(
            Arg::new("templates-dir")
                .long("templates-dir")
                .value_name("DIR")
                .help("Directory with an optional request_pdf.hbs template override")
                .global(true)
                .default_value("/app/templates"),
        )
        .subcommand(
            Command::new("serve").about("Serve the HTTP endpoints").arg(
                Arg::new("bind")
                    .long("bind")
                    .value_name("ADDR")
                    .help("Listen address, overrides server.bind_address"),
            ),
        )
        .subcommand(client_command())
        .subcommand(request_command())
        .subcommand(shipment_command())
}

fn client_command() -> Command {
    Command::new("client")
        .about("Manage clients")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Register a client")
                .args(client_field_args(true)),
        )
        .subcommand(
            Command::new("list")
                .about("List clients, 20 per page")
                .arg(search_arg("Match name or INN"))
                .arg(
                    Arg::new("active")
                        .long("active")
                        .value_name("BOOL")
                        .value_parser(value_parser!(bool)),
                )
                .arg(date_arg("from", "Created on or after"))
                .arg(date_arg("to", "Created on or before"))
                .arg(page_arg()),
        )
        .subcommand(Command::new("show").about("Show a client").arg(id_arg()))
        .subcommand(
            Command::new("update")
                .about("Change client fields")
                .arg(id_arg())
                .args(client_field_args(false))
                .arg(
                    Arg::new("active")
                        .long("active")
                        .value_name("BOOL")
                        .value_parser(value_parser!(bool)),
                ),
        )
        .subcommand(
            Command::new("deactivate")
                .about("Mark a client inactive")
                .arg(id_arg()),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a client with all of its requests")
                .arg(id_arg()),
        )
}

fn request_command() -> Command {
    Command::new("request")
        .about("Manage transportation requests")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Create a request; the number is assigned per client")
                .arg(
                    Arg::new("client")
                        .long("client")
                        .value_name("ID")
                        .required(true)
                        .value_parser(value_parser!(i64)),
                )
                .arg(
                    Arg::new("number")
                        .long("number")
                        .value_name("N")
                        .help("Use this request number instead of the next free one")
                        .value_parser(value_parser!(i64)),
                )
                .args(request_field_args(true)),
        )
        .subcommand(
            Command::new("list")
                .about("List requests, newest first, 20 per page")
                .arg(
                    Arg::new("client")
                        .long("client")
                        .value_name("ID")
                        .value_parser(value_parser!(i64)),
                )
                .arg(
                    Arg::new("transport")
                        .long("transport")
                        .value_name("TYPE")
                        .value_parser(|s: &str| TransportType::from_str(s)),
                )
                .arg(search_arg("Match client name, consignor or tracking number"))
                .arg(date_arg("from", "Request date on or after"))
                .arg(date_arg("to", "Request date on or before"))
                .arg(page_arg()),
        )
        .subcommand(Command::new("show").about("Show a request").arg(id_arg()))
        .subcommand(
            Command::new("update")
                .about("Change request fields")
                .arg(id_arg())
                .args(request_field_args(false)),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a request and its shipment")
                .arg(id_arg()),
        )
        .subcommand(
            Command::new("pdf")
                .about("Render the printable report of one request")
                .arg(id_arg())
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_name("FILE")
                        .help("Target file, defaults to the report file name"),
                )
                .arg(
                    Arg::new("html")
                        .long("html")
                        .help("Print the report HTML instead of converting it")
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn shipment_command() -> Command {
    Command::new("shipment")
        .about("Track shipments")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Open the shipment of a request")
                .arg(
                    Arg::new("request")
                        .long("request")
                        .value_name("ID")
                        .required(true)
                        .value_parser(value_parser!(i64)),
                )
                .args(shipment_field_args()),
        )
        .subcommand(
            Command::new("list")
                .about("List shipments, newest first, 20 per page")
                .arg(status_arg().long("status"))
                .arg(
                    Arg::new("document-type")
                        .long("document-type")
                        .value_name("TYPE")
                        .value_parser(|s: &str| DocumentType::from_str(s)),
                )
                .arg(page_arg()),
        )
        .subcommand(Command::new("show").about("Show a shipment").arg(id_arg()))
        .subcommand(
            Command::new("update")
                .about("Change shipment fields")
                .arg(id_arg())
                .args(shipment_field_args()),
        )
        .subcommand(
            Command::new("status")
                .about("Set the shipment status")
                .arg(id_arg())
                .arg(status_arg().required(true)),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a shipment")
                .arg(id_arg()),
        )
}

fn id_arg() -> Arg {
    Arg::new("id")
        .value_name("ID")
        .required(true)
        .value_parser(value_parser!(i64))
}

fn page_arg() -> Arg {
    Arg::new("page")
        .long("page")
        .value_name("N")
        .default_value("1")
        .value_parser(value_parser!(u32).range(1..))
}

fn search_arg(help: &'static str) -> Arg {
    Arg::new("search")
        .long("search")
        .short('s')
        .value_name("TEXT")
        .help(help)
}

fn date_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("YYYY-MM-DD")
        .help(help)
        .value_parser(parse_date)
}

fn status_arg() -> Arg {
    Arg::new("status")
        .value_name("STATUS")
        .value_parser(|s: &str| ShipmentStatus::from_str(s))
}

fn text_arg(name: &'static str) -> Arg {
    Arg::new(name).long(name).value_name("TEXT")
}

fn client_field_args(creating: bool) -> Vec<Arg> {
    vec![
        text_arg("name").required(creating),
        text_arg("inn"),
        text_arg("kpp"),
        text_arg("ogrn"),
        text_arg("address"),
        text_arg("phone"),
        text_arg("email"),
        text_arg("director"),
        text_arg("bank-name"),
        text_arg("bik"),
        text_arg("corr-account"),
        text_arg("account"),
        text_arg("contact"),
        text_arg("contact-phone"),
        text_arg("contact-email"),
        text_arg("contact2"),
        text_arg("contact2-phone"),
        text_arg("contact2-email"),
    ]
}

fn request_field_args(creating: bool) -> Vec<Arg> {
    vec![
        Arg::new("transport")
            .long("transport")
            .value_name("TYPE")
            .required(creating)
            .value_parser(|s: &str| TransportType::from_str(s)),
        Arg::new("border")
            .long("border")
            .value_name("TYPE")
            .help("Transport at the border")
            .value_parser(|s: &str| TransportType::from_str(s)),
        text_arg("consignor").required(creating),
        text_arg("consignee"),
        text_arg("country"),
        decimal_arg("weight"),
        decimal_arg("volume"),
        decimal_arg("value"),
        Arg::new("currency")
            .long("currency")
            .value_name("CODE")
            .value_parser(|s: &str| Currency::from_str(s)),
        Arg::new("insurance")
            .long("insurance")
            .value_name("BOOL")
            .value_parser(value_parser!(bool)),
        text_arg("notes"),
        text_arg("manager"),
        Arg::new("shipment-number")
            .long("shipment-number")
            .value_name("N")
            .value_parser(value_parser!(i64)),
    ]
}

fn shipment_field_args() -> Vec<Arg> {
    vec![
        status_arg().long("status"),
        date_arg("etd", "Planned departure"),
        date_arg("eta", "Planned arrival"),
        date_arg("departed", "Actual departure"),
        date_arg("arrived", "Actual arrival"),
        date_arg("delivered", "Delivery to the client"),
        Arg::new("document-type")
            .long("document-type")
            .value_name("TYPE")
            .value_parser(|s: &str| DocumentType::from_str(s)),
        text_arg("document-number"),
        text_arg("carrier"),
        text_arg("tracking"),
        text_arg("customs"),
        text_arg("comments"),
    ]
}

fn decimal_arg(name: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_name("DECIMAL")
        .value_parser(|s: &str| Decimal::from_str(s.trim()))
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}
