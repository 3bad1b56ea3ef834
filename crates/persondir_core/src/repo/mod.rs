//! Record custody layer.
//!
//! # Responsibility
//! - Define the store contract the directory service is written against.
//! - Provide the volatile, process-lifetime in-memory implementation.
//!
//! # Invariants
//! - Stores hold no business rules: no uniqueness or age checks.
//! - Insertion order is the enumeration order.

pub mod person_store;
