//! Person record domain model.
//!
//! # Responsibility
//! - Define the canonical directory entry stored by core.
//! - Provide field-level shape checks used by transports on registration.
//!
//! # Invariants
//! - `email` is the lookup key; uniqueness is a store-level concern, not a
//!   property of a single record.
//! - `birth_date` is a calendar date without time zone.
//!
//! # See also
//! - `service::directory_service` for eligibility and merge rules.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.+@.+\..+$").expect("valid email shape regex"));

/// Field-level validation error for a person record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonValidationError {
    /// `email` does not match `local@domain.tld`.
    InvalidEmail(String),
    /// `birth_date` is later than the reference date.
    BirthDateInFuture {
        birth_date: NaiveDate,
        today: NaiveDate,
    },
}

impl Display for PersonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail(_) => write!(f, "Please provide a valid email address"),
            Self::BirthDateInFuture { birth_date, today } => {
                write!(f, "birthDate {birth_date} must not be later than {today}")
            }
        }
    }
}

impl Error for PersonValidationError {}

/// One person's directory entry.
///
/// Wire names follow the external camelCase schema (`firstName`,
/// `birthDate`, `phoneNumber`); dates serialize as ISO `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
    /// Unique lookup key within the directory.
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl PersonRecord {
    /// Creates a record with required fields only.
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birth_date: NaiveDate,
    ) -> Self {
        Self {
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            birth_date,
            address: None,
            phone_number: None,
        }
    }

    /// Sets the optional postal address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the optional phone number.
    pub fn with_phone_number(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    /// Validates field-level shape rules against `today`.
    ///
    /// # Errors
    /// - `InvalidEmail` when `email` is not `local@domain.tld` shaped.
    /// - `BirthDateInFuture` when `birth_date > today`.
    ///
    /// Names are only required to be present, which decoding already
    /// enforces; empty strings are accepted. Age eligibility is not checked
    /// here; it depends on directory configuration and belongs to the
    /// service layer.
    pub fn validate(&self, today: NaiveDate) -> Result<(), PersonValidationError> {
        if !is_valid_email(self.email.as_str()) {
            return Err(PersonValidationError::InvalidEmail(self.email.clone()));
        }
        if self.birth_date > today {
            return Err(PersonValidationError::BirthDateInFuture {
                birth_date: self.birth_date,
                today,
            });
        }
        Ok(())
    }
}

/// Returns whether `value` has the loose `local@domain.tld` shape.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_SHAPE_RE.is_match(value)
}
