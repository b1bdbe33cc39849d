//! Client, request and shipment records

use crate::choices::{Currency, DocumentType, ShipmentStatus, TransportType};
use crate::{ClientId, RequestId, ShipmentId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Country of origin assumed when the operator does not enter one
pub const DEFAULT_COUNTRY_OF_ORIGIN: &str = "Китай";

/// Named contact person at a client company
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPerson {
    pub name: String,
    pub phone: String,
    pub email: String,
}

impl ContactPerson {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.phone.is_empty() && self.email.is_empty()
    }
}

/// Banking details of a client company
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    pub bank_name: String,
    pub bik: String,
    pub correspondent_account: String,
    pub payment_account: String,
}

/// Editable part of a client record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientFields {
    pub name: String,
    pub inn: String,
    pub kpp: String,
    pub ogrn: String,
    pub legal_address: String,
    pub company_phone: String,
    pub company_email: String,
    pub director: String,
    pub bank: BankDetails,
    pub primary_contact: ContactPerson,
    pub secondary_contact: ContactPerson,
    pub is_active: bool,
}

impl Default for ClientFields {
    fn default() -> Self {
        Self {
            name: String::new(),
            inn: String::new(),
            kpp: String::new(),
            ogrn: String::new(),
            legal_address: String::new(),
            company_phone: String::new(),
            company_email: String::new(),
            director: String::new(),
            bank: BankDetails::default(),
            primary_contact: ContactPerson::default(),
            secondary_contact: ContactPerson::default(),
            is_active: true,
        }
    }
}

impl ClientFields {
    /// Active client with only a name set
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Customer company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    #[serde(flatten)]
    pub fields: ClientFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn is_active(&self) -> bool {
        self.fields.is_active
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.inn.is_empty() {
            write!(f, "{}", self.fields.name)
        } else {
            write!(f, "{} (ИНН: {})", self.fields.name, self.fields.inn)
        }
    }
}

/// Editable part of a transportation request
///
/// The owning client and the per-client number are not here: both are fixed
/// when the request is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFields {
    pub transport_type: TransportType,
    /// Mode of transport when crossing the EAEU border
    pub transport_at_border: Option<TransportType>,
    pub consignor: String,
    /// Empty means the client itself receives the cargo
    pub consignee: String,
    pub country_of_origin: String,
    /// Kilograms
    pub gross_weight: Option<Decimal>,
    /// Cubic metres
    pub volume: Option<Decimal>,
    pub declared_value: Option<Decimal>,
    pub currency: Currency,
    pub insurance_required: bool,
    pub special_notes: String,
    pub manager: String,
    /// Company-wide shipment number, entered by hand and never generated
    pub shipment_number: Option<i64>,
}

impl RequestFields {
    pub fn new(transport_type: TransportType, consignor: impl Into<String>) -> Self {
        Self {
            transport_type,
            transport_at_border: None,
            consignor: consignor.into(),
            consignee: String::new(),
            country_of_origin: DEFAULT_COUNTRY_OF_ORIGIN.to_string(),
            gross_weight: None,
            volume: None,
            declared_value: None,
            currency: Currency::default(),
            insurance_required: false,
            special_notes: String::new(),
            manager: String::new(),
            shipment_number: None,
        }
    }
}

/// Request about to be created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRequest {
    pub client_id: ClientId,
    /// Pre-assigned number; `None` lets the ledger pick the next one
    pub request_number: Option<i64>,
    pub fields: RequestFields,
}

impl NewRequest {
    pub fn new(client_id: ClientId, fields: RequestFields) -> Self {
        Self {
            client_id,
            request_number: None,
            fields,
        }
    }

    pub fn with_number(mut self, request_number: i64) -> Self {
        self.request_number = Some(request_number);
        self
    }
}

/// Transportation request submitted for a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub client_id: ClientId,
    pub request_number: i64,
    pub request_date: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: RequestFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Request {
    /// Operator-facing title, e.g. `Заявка #3 - ООО Ромашка (Море)`
    pub fn title(&self, client_name: &str) -> String {
        format!(
            "Заявка #{} - {} ({})",
            self.request_number,
            client_name,
            self.fields.transport_type.label()
        )
    }
}

/// Editable part of a shipment record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentFields {
    pub status: ShipmentStatus,
    /// Planned departure
    pub etd: Option<NaiveDate>,
    /// Planned arrival
    pub eta: Option<NaiveDate>,
    pub actual_departure: Option<NaiveDate>,
    pub actual_arrival: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub document_type: Option<DocumentType>,
    pub document_number: String,
    pub carrier: String,
    pub tracking_number: String,
    pub customs_declaration: String,
    pub comments: String,
}

/// Transit and delivery record of a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: ShipmentId,
    pub request_id: RequestId,
    #[serde(flatten)]
    pub fields: ShipmentFields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shipment {
    pub fn status(&self) -> ShipmentStatus {
        self.fields.status
    }

    pub fn title(&self, request_number: i64) -> String {
        format!("Поставка к заявке #{}", request_number)
    }
}
