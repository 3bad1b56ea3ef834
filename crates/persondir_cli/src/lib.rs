//! Transport layer for the person directory.
//!
//! # Responsibility
//! - Translate JSON request lines into directory service calls.
//! - Keep process bootstrap in `main.rs`, out of the reusable API.

pub mod api;
