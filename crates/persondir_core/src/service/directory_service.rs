//! Person directory use-case service.
//!
//! # Responsibility
//! - Apply the age-eligibility rule on register and birth-date updates.
//! - Merge partial updates into live store entries.
//! - Validate and answer birth-date range queries.
//!
//! # Invariants
//! - Every check-then-write sequence runs under one write lock, so checks
//!   and the mutation they guard are atomic with respect to other writers.
//! - A failing operation leaves the store untouched.
//! - `email` is a mutable key: an update may rename it, and the record
//!   keeps its original position in the store.
//! - Register does not reject duplicate emails unless
//!   `DirectoryConfig::reject_duplicate_email` is enabled.

use crate::age::{age_in_years, is_age_allowed};
use crate::clock::{Clock, SystemClock};
use crate::config::DirectoryConfig;
use crate::logging::redact_email;
use crate::model::patch::PersonPatch;
use crate::model::person::PersonRecord;
use crate::repo::person_store::{InMemoryPersonStore, PersonStore};
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Stable category of a directory error, for transport mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AgeNotAllowed,
    NotFound,
    InvalidRange,
    DuplicateEmail,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AgeNotAllowed => "age_not_allowed",
            Self::NotFound => "not_found",
            Self::InvalidRange => "invalid_range",
            Self::DuplicateEmail => "duplicate_email",
        }
    }
}

/// Caller-visible domain error. None of these are retryable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// Computed age is below the configured minimum.
    AgeNotAllowed { age: i32, min_allowed_age: u32 },
    /// No record matches the lookup key.
    NotFound { email: String },
    /// Range lower bound is after its upper bound.
    InvalidRange { from: NaiveDate, to: NaiveDate },
    /// Register hit an existing email while duplicate rejection is on.
    DuplicateEmail { email: String },
}

impl DirectoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AgeNotAllowed { .. } => ErrorKind::AgeNotAllowed,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidRange { .. } => ErrorKind::InvalidRange,
            Self::DuplicateEmail { .. } => ErrorKind::DuplicateEmail,
        }
    }
}

impl Display for DirectoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AgeNotAllowed {
                age,
                min_allowed_age,
            } => write!(
                f,
                "Age: {age} is not allowed. You must be at least {min_allowed_age}."
            ),
            Self::NotFound { email } => write!(f, "There is no user with email: {email}"),
            Self::InvalidRange { .. } => write!(f, "[from] date must be before [to] date"),
            Self::DuplicateEmail { email } => {
                write!(f, "A user with email: {email} already exists")
            }
        }
    }
}

impl Error for DirectoryError {}

/// Directory service over an injectable store and clock.
///
/// The store is owned by the service and guarded by a single `RwLock`:
/// reads share the lock, writes hold it exclusively for their whole
/// lookup/check/mutate sequence. Returned records are snapshots taken while
/// the lock is held.
pub struct DirectoryService<S: PersonStore = InMemoryPersonStore, C: Clock = SystemClock> {
    store: RwLock<S>,
    clock: C,
    config: DirectoryConfig,
}

impl DirectoryService<InMemoryPersonStore, SystemClock> {
    /// Creates a service over a fresh volatile store and the system clock.
    pub fn in_memory(config: DirectoryConfig) -> Self {
        Self::new(InMemoryPersonStore::new(), SystemClock, config)
    }
}

impl<S: PersonStore, C: Clock> DirectoryService<S, C> {
    pub fn new(store: S, clock: C, config: DirectoryConfig) -> Self {
        Self {
            store: RwLock::new(store),
            clock,
            config,
        }
    }

    /// Returns the configuration captured at construction.
    pub fn config(&self) -> DirectoryConfig {
        self.config
    }

    /// Returns the date the eligibility rule is evaluated against.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Registers a new person.
    ///
    /// # Contract
    /// - Fails with `AgeNotAllowed` when the person is younger than the
    ///   configured minimum or born after today; nothing is inserted.
    /// - Appends the record and returns it unchanged.
    pub fn register(&self, person: PersonRecord) -> DirectoryResult<PersonRecord> {
        let mut store = self.write_store();
        self.ensure_age_allowed(person.birth_date, "person_register")?;

        if self.config.reject_duplicate_email && store.find_by_email(&person.email).is_some() {
            warn!(
                "event=person_register module=service status=rejected reason=duplicate_email email={}",
                redact_email(&person.email)
            );
            return Err(DirectoryError::DuplicateEmail {
                email: person.email,
            });
        }

        store.insert(person.clone());
        info!(
            "event=person_register module=service status=ok email={} total={}",
            redact_email(&person.email),
            store.len()
        );
        Ok(person)
    }

    /// Returns every stored record in insertion order.
    pub fn find_all(&self) -> Vec<PersonRecord> {
        self.read_store().all().to_vec()
    }

    /// Merges `patch` into the first record stored under `email`.
    ///
    /// # Contract
    /// - Fails with `NotFound` when no record uses `email`.
    /// - When `patch.birth_date` is present it must pass the eligibility
    ///   rule before any field is applied.
    /// - Present fields overwrite, absent fields are kept.
    /// - `patch.email` may rename the key; the record keeps its position.
    pub fn update(&self, email: &str, patch: &PersonPatch) -> DirectoryResult<PersonRecord> {
        let mut store = self.write_store();
        let Some(existing) = store.find_by_email_mut(email) else {
            warn!(
                "event=person_update module=service status=rejected reason=not_found email={}",
                redact_email(email)
            );
            return Err(DirectoryError::NotFound {
                email: email.to_string(),
            });
        };

        if let Some(birth_date) = patch.birth_date {
            self.ensure_age_allowed(birth_date, "person_update")?;
        }

        patch.apply_to(existing);
        info!(
            "event=person_update module=service status=ok email={} key_changed={}",
            redact_email(email),
            existing.email != email
        );
        Ok(existing.clone())
    }

    /// Removes the first record stored under `email`.
    pub fn delete_user(&self, email: &str) -> DirectoryResult<()> {
        let mut store = self.write_store();
        if !store.remove_by_email(email) {
            warn!(
                "event=person_delete module=service status=rejected reason=not_found email={}",
                redact_email(email)
            );
            return Err(DirectoryError::NotFound {
                email: email.to_string(),
            });
        }

        info!(
            "event=person_delete module=service status=ok email={} total={}",
            redact_email(email),
            store.len()
        );
        Ok(())
    }

    /// Returns records born within `[from, to]`, in insertion order.
    ///
    /// Fails with `InvalidRange` when `from > to`, whatever the store holds.
    pub fn get_users_by_birth_date_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DirectoryResult<Vec<PersonRecord>> {
        if from > to {
            return Err(DirectoryError::InvalidRange { from, to });
        }

        let store = self.read_store();
        let hits: Vec<PersonRecord> = store
            .all()
            .iter()
            .filter(|person| (from..=to).contains(&person.birth_date))
            .cloned()
            .collect();
        log::debug!(
            "event=person_range_query module=service status=ok from={from} to={to} hits={}",
            hits.len()
        );
        Ok(hits)
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.read_store().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_store().is_empty()
    }

    /// Consumes the service and hands back its store.
    pub fn into_store(self) -> S {
        self.store.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_age_allowed(&self, birth_date: NaiveDate, event: &str) -> DirectoryResult<()> {
        let today = self.clock.today();
        if is_age_allowed(birth_date, today, self.config.min_allowed_age) {
            return Ok(());
        }

        let age = age_in_years(birth_date, today);
        warn!(
            "event={event} module=service status=rejected reason=age_not_allowed age={age} min_allowed_age={}",
            self.config.min_allowed_age
        );
        Err(DirectoryError::AgeNotAllowed {
            age,
            min_allowed_age: self.config.min_allowed_age,
        })
    }

    // Every mutation is a single step, so a poisoned lock still guards a
    // consistent store.
    fn read_store(&self) -> RwLockReadGuard<'_, S> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_store(&self) -> RwLockWriteGuard<'_, S> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }
}
