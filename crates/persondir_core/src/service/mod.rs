//! Core use-case services.
//!
//! # Responsibility
//! - Enforce directory business rules on top of the record store.
//! - Keep transports decoupled from storage details.

pub mod directory_service;
