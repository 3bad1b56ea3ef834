//! Partial person update model.
//!
//! # Invariants
//! - An absent field never touches the target record.
//! - Nullable fields distinguish "omitted" (`None`) from "cleared"
//!   (`Some(None)`).

use crate::model::person::PersonRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Field-level patch merged into an existing record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    /// `Some(None)` clears the stored address.
    #[serde(
        default,
        deserialize_with = "deserialize_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub address: Option<Option<String>>,
    /// `Some(None)` clears the stored phone number.
    #[serde(
        default,
        deserialize_with = "deserialize_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone_number: Option<Option<String>>,
}

impl PersonPatch {
    /// Returns `true` when no field is present.
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.birth_date.is_none()
            && self.address.is_none()
            && self.phone_number.is_none()
    }

    /// Copies every present field onto `target`.
    ///
    /// Applying the same patch twice leaves `target` as after the first call.
    pub fn apply_to(&self, target: &mut PersonRecord) {
        if let Some(email) = &self.email {
            target.email = email.clone();
        }
        if let Some(first_name) = &self.first_name {
            target.first_name = first_name.clone();
        }
        if let Some(last_name) = &self.last_name {
            target.last_name = last_name.clone();
        }
        if let Some(birth_date) = self.birth_date {
            target.birth_date = birth_date;
        }
        if let Some(address) = &self.address {
            target.address = address.clone();
        }
        if let Some(phone_number) = &self.phone_number {
            target.phone_number = phone_number.clone();
        }
    }
}

/// A full record used as a patch overwrites every required field and any
/// optional field it carries; its absent optional fields stay untouched.
impl From<PersonRecord> for PersonPatch {
    fn from(record: PersonRecord) -> Self {
        Self {
            email: Some(record.email),
            first_name: Some(record.first_name),
            last_name: Some(record.last_name),
            birth_date: Some(record.birth_date),
            address: record.address.map(Some),
            phone_number: record.phone_number.map(Some),
        }
    }
}

// Only invoked when the key is present, so `null` maps to `Some(None)`.
fn deserialize_nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}
