//! Enumerated field choices
//!
//! Each choice has a stable lowercase storage code and a Russian display
//! label. Codes are what the database and the CLI accept; labels are what
//! operators and the printed report see.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unknown or empty choice value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: '{value}'")]
pub struct ParseChoiceError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseChoiceError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Mode of transport for the main leg or the border crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportType {
    Air,
    Sea,
    Rail,
    Auto,
    Multimodal,
}

impl TransportType {
    pub const ALL: [TransportType; 5] = [
        Self::Air,
        Self::Sea,
        Self::Rail,
        Self::Auto,
        Self::Multimodal,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Air => "air",
            Self::Sea => "sea",
            Self::Rail => "rail",
            Self::Auto => "auto",
            Self::Multimodal => "multimodal",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Air => "Авиа",
            Self::Sea => "Море",
            Self::Rail => "Ж/Д",
            Self::Auto => "Авто",
            Self::Multimodal => "Мультимодальная",
        }
    }
}

impl FromStr for TransportType {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.code() == s.trim())
            .ok_or_else(|| ParseChoiceError::new("transport type", s))
    }
}

impl fmt::Display for TransportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Currency of the declared cargo value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Rub,
    Usd,
    Eur,
    Cny,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Self::Rub, Self::Usd, Self::Eur, Self::Cny];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Rub => "RUB",
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Cny => "CNY",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Rub => "Рубли (RUB)",
            Self::Usd => "Доллары (USD)",
            Self::Eur => "Евро (EUR)",
            Self::Cny => "Юани (CNY)",
        }
    }
}

impl FromStr for Currency {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|c| c.code() == wanted)
            .ok_or_else(|| ParseChoiceError::new("currency", s))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Shipment status
///
/// The variants follow the usual progression of a shipment, with `Cancelled`
/// reachable from anywhere. The order is informational: operators may set
/// any status at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    #[default]
    Draft,
    Processing,
    InTransit,
    AtWarehouse,
    Customs,
    Delivered,
    Closed,
    Cancelled,
}

impl ShipmentStatus {
    pub const ALL: [ShipmentStatus; 8] = [
        Self::Draft,
        Self::Processing,
        Self::InTransit,
        Self::AtWarehouse,
        Self::Customs,
        Self::Delivered,
        Self::Closed,
        Self::Cancelled,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Processing => "processing",
            Self::InTransit => "in_transit",
            Self::AtWarehouse => "at_warehouse",
            Self::Customs => "customs",
            Self::Delivered => "delivered",
            Self::Closed => "closed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Черновик",
            Self::Processing => "В обработке",
            Self::InTransit => "В пути",
            Self::AtWarehouse => "На складе",
            Self::Customs => "Таможня",
            Self::Delivered => "Доставлено",
            Self::Closed => "Закрыто",
            Self::Cancelled => "Отменено",
        }
    }

    /// Next step of the usual progression, `None` for closed and cancelled
    pub fn next(&self) -> Option<ShipmentStatus> {
        match self {
            Self::Draft => Some(Self::Processing),
            Self::Processing => Some(Self::InTransit),
            Self::InTransit => Some(Self::AtWarehouse),
            Self::AtWarehouse => Some(Self::Customs),
            Self::Customs => Some(Self::Delivered),
            Self::Delivered => Some(Self::Closed),
            Self::Closed | Self::Cancelled => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Cancelled)
    }
}

impl FromStr for ShipmentStatus {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.code() == s.trim())
            .ok_or_else(|| ParseChoiceError::new("shipment status", s))
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Transport document accompanying the cargo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Air waybill
    Awb,
    /// Bill of lading
    Bl,
    /// Railway consignment note
    CargoNote,
    Cmr,
    Tir,
}

impl DocumentType {
    pub const ALL: [DocumentType; 5] = [
        Self::Awb,
        Self::Bl,
        Self::CargoNote,
        Self::Cmr,
        Self::Tir,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Awb => "awb",
            Self::Bl => "bl",
            Self::CargoNote => "cargo_note",
            Self::Cmr => "cmr",
            Self::Tir => "tir",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Awb => "Авианакладная (AWB)",
            Self::Bl => "Коносамент (BL)",
            Self::CargoNote => "ЖД накладная",
            Self::Cmr => "Дорожная накладная (CMR)",
            Self::Tir => "Книжка МДП (TIR)",
        }
    }
}

impl FromStr for DocumentType {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.code() == s.trim())
            .ok_or_else(|| ParseChoiceError::new("document type", s))
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_type_parsing() {
        assert_eq!("sea".parse::<TransportType>().unwrap(), TransportType::Sea);
        assert_eq!(" multimodal ".parse::<TransportType>().unwrap(), TransportType::Multimodal);

        let err = "".parse::<TransportType>().unwrap_err();
        assert_eq!(err.kind, "transport type");
        assert!("ship".parse::<TransportType>().is_err());
    }

    #[test]
    fn test_currency_is_case_insensitive_and_defaults_to_rub() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert_eq!("CNY".parse::<Currency>().unwrap(), Currency::Cny);
        assert_eq!(Currency::default(), Currency::Rub);
    }

    #[test]
    fn test_status_progression() {
        let mut status = ShipmentStatus::default();
        let mut seen = vec![status];
        while let Some(next) = status.next() {
            status = next;
            seen.push(status);
        }

        assert_eq!(seen.len(), 7);
        assert_eq!(status, ShipmentStatus::Closed);
        assert!(ShipmentStatus::Cancelled.is_terminal());
        assert!(ShipmentStatus::Cancelled.next().is_none());
        assert!(!ShipmentStatus::InTransit.is_terminal());
    }

    #[test]
    fn test_codes_round_trip_through_serde() {
        let json = serde_json::to_string(&ShipmentStatus::AtWarehouse).unwrap();
        assert_eq!(json, "\"at_warehouse\"");

        let json = serde_json::to_string(&Currency::Eur).unwrap();
        assert_eq!(json, "\"EUR\"");

        let doc: DocumentType = serde_json::from_str("\"cargo_note\"").unwrap();
        assert_eq!(doc, DocumentType::CargoNote);
    }

    #[test]
    fn test_every_code_parses_back() {
        for status in ShipmentStatus::ALL {
            assert_eq!(status.code().parse::<ShipmentStatus>().unwrap(), status);
        }
        for doc in DocumentType::ALL {
            assert_eq!(doc.to_string().parse::<DocumentType>().unwrap(), doc);
        }
    }
}
