//! Core domain logic for the person directory.
//! This crate is the single source of truth for business invariants.

pub mod age;
pub mod clock;
pub mod config;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use age::{age_in_years, is_age_allowed};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, DirectoryConfig};
pub use logging::{default_log_level, init_logging, logging_status, redact_email};
pub use model::patch::PersonPatch;
pub use model::person::{is_valid_email, PersonRecord, PersonValidationError};
pub use repo::person_store::{InMemoryPersonStore, PersonStore};
pub use service::directory_service::{DirectoryError, DirectoryResult, DirectoryService, ErrorKind};

/// Minimal health-check API for transport wiring.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
