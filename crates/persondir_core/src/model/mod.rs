//! Directory domain model.
//!
//! # Responsibility
//! - Define the person record and its partial-update shape.
//! - Keep wire naming (camelCase, ISO dates) in one place.
//!
//! # Invariants
//! - Records are identified by `email`; there is no surrogate ID.
//! - A patch is always a field-level merge, never a replacement.

pub mod patch;
pub mod person;
