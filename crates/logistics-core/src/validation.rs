//! Field validation applied before anything is written to storage

use crate::error::{LogisticsError, Result};
use logistics_types::{ClientFields, ContactPerson, RequestFields, ShipmentFields};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[\p{L}\p{N}\-]+(\.[\p{L}\p{N}\-]+)*\.\p{L}{2,}$")
        .expect("email regex is valid")
});

// Column limits
const NAME_MAX: usize = 255;
const TAX_ID_MAX: usize = 20;
const PHONE_MAX: usize = 50;
const ACCOUNT_MAX: usize = 50;
const COUNTRY_MAX: usize = 100;
const MANAGER_MAX: usize = 100;
const SHORT_TEXT_MAX: usize = 100;

/// Collects every problem with a record so the operator sees them at once
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(format!("{} is required", field));
        }
        self
    }

    pub fn max_chars(&mut self, field: &str, value: &str, limit: usize) -> &mut Self {
        let len = value.chars().count();
        if len > limit {
            self.errors.push(format!(
                "{} is too long ({} characters, at most {})",
                field, len, limit
            ));
        }
        self
    }

    /// Empty is allowed; anything else must look like an address
    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.is_empty() && !is_valid_email(value) {
            self.errors
                .push(format!("{} is not a valid email address: '{}'", field, value));
        }
        self
    }

    /// Non-negative, at most `decimal_places` fractional digits and
    /// `max_digits` digits in total
    pub fn decimal(
        &mut self,
        field: &str,
        value: Option<Decimal>,
        max_digits: u32,
        decimal_places: u32,
    ) -> &mut Self {
        let Some(value) = value else {
            return self;
        };

        if value.is_sign_negative() && !value.is_zero() {
            self.errors.push(format!("{} must not be negative", field));
            return self;
        }

        let normalized = value.normalize();
        if normalized.scale() > decimal_places {
            self.errors.push(format!(
                "{} allows at most {} decimal places",
                field, decimal_places
            ));
        }

        let integer_digits = integer_digit_count(normalized);
        if integer_digits > max_digits - decimal_places {
            self.errors.push(format!(
                "{} allows at most {} digits before the decimal point",
                field,
                max_digits - decimal_places
            ));
        }
        self
    }

    pub fn positive(&mut self, field: &str, value: Option<i64>) -> &mut Self {
        if matches!(value, Some(v) if v <= 0) {
            self.errors.push(format!("{} must be positive", field));
        }
        self
    }

    pub fn finish(&mut self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(LogisticsError::Validation(self.errors.join("; ")))
        }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

fn integer_digit_count(value: Decimal) -> u32 {
    let integer = value.trunc().abs().to_string();
    integer.trim_start_matches('0').len() as u32
}

fn contact(v: &mut Validator, prefix: &str, person: &ContactPerson) {
    v.max_chars(&format!("{} name", prefix), &person.name, NAME_MAX)
        .max_chars(&format!("{} phone", prefix), &person.phone, PHONE_MAX)
        .email(&format!("{} email", prefix), &person.email);
}

pub fn validate_client(fields: &ClientFields) -> Result<()> {
    let mut v = Validator::new();
    v.required("name", &fields.name)
        .max_chars("name", &fields.name, NAME_MAX)
        .max_chars("inn", &fields.inn, TAX_ID_MAX)
        .max_chars("kpp", &fields.kpp, TAX_ID_MAX)
        .max_chars("ogrn", &fields.ogrn, TAX_ID_MAX)
        .max_chars("company phone", &fields.company_phone, PHONE_MAX)
        .email("company email", &fields.company_email)
        .max_chars("director", &fields.director, NAME_MAX)
        .max_chars("bank name", &fields.bank.bank_name, NAME_MAX)
        .max_chars("bik", &fields.bank.bik, TAX_ID_MAX)
        .max_chars(
            "correspondent account",
            &fields.bank.correspondent_account,
            ACCOUNT_MAX,
        )
        .max_chars("payment account", &fields.bank.payment_account, ACCOUNT_MAX);
    contact(&mut v, "contact person 1", &fields.primary_contact);
    contact(&mut v, "contact person 2", &fields.secondary_contact);
    v.finish()
}

pub fn validate_request(fields: &RequestFields) -> Result<()> {
    Validator::new()
        .required("consignor", &fields.consignor)
        .required("country of origin", &fields.country_of_origin)
        .max_chars("country of origin", &fields.country_of_origin, COUNTRY_MAX)
        .decimal("gross weight", fields.gross_weight, 10, 2)
        .decimal("volume", fields.volume, 10, 2)
        .decimal("declared value", fields.declared_value, 15, 2)
        .max_chars("manager", &fields.manager, MANAGER_MAX)
        .positive("shipment number", fields.shipment_number)
        .finish()
}

pub fn validate_shipment(fields: &ShipmentFields) -> Result<()> {
    Validator::new()
        .max_chars("document number", &fields.document_number, SHORT_TEXT_MAX)
        .max_chars("carrier", &fields.carrier, NAME_MAX)
        .max_chars("tracking number", &fields.tracking_number, SHORT_TEXT_MAX)
        .max_chars(
            "customs declaration",
            &fields.customs_declaration,
            SHORT_TEXT_MAX,
        )
        .finish()
}
