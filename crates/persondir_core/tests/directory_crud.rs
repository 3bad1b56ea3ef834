use chrono::NaiveDate;
use persondir_core::{
    DirectoryConfig, DirectoryError, DirectoryService, ErrorKind, FixedClock, InMemoryPersonStore,
    PersonPatch, PersonRecord,
};
use std::sync::Arc;
use std::thread;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn service_on(today: NaiveDate) -> DirectoryService<InMemoryPersonStore, FixedClock> {
    DirectoryService::new(
        InMemoryPersonStore::new(),
        FixedClock(today),
        DirectoryConfig::with_min_allowed_age(18),
    )
}

fn seeded(records: Vec<PersonRecord>) -> DirectoryService<InMemoryPersonStore, FixedClock> {
    DirectoryService::new(
        InMemoryPersonStore::with_records(records),
        FixedClock(date(2024, 1, 1)),
        DirectoryConfig::with_min_allowed_age(18),
    )
}

fn user() -> PersonRecord {
    PersonRecord::new("user@email.com", "Name", "Surname", date(2000, 1, 1))
        .with_address("Address")
        .with_phone_number("123456789")
}

#[test]
fn register_adult_returns_record_and_stores_it() {
    let service = service_on(date(2024, 1, 1));
    let person = PersonRecord::new("a@b.com", "Ann", "Bell", date(2000, 1, 1));

    let saved = service.register(person.clone()).unwrap();

    assert_eq!(saved, person);
    assert_eq!(service.find_all(), vec![person.clone()]);
    let hits = service
        .get_users_by_birth_date_range(date(2000, 1, 1), date(2000, 1, 1))
        .unwrap();
    assert_eq!(hits, vec![person]);
}

#[test]
fn register_minor_fails_with_age_message_and_stores_nothing() {
    let service = service_on(date(2024, 1, 1));
    let person = PersonRecord::new("c@d.com", "Cy", "Dale", date(2016, 1, 1));

    let err = service.register(person).unwrap_err();

    assert_eq!(
        err,
        DirectoryError::AgeNotAllowed {
            age: 8,
            min_allowed_age: 18
        }
    );
    assert_eq!(err.to_string(), "Age: 8 is not allowed. You must be at least 18.");
    assert!(service.is_empty());
}

#[test]
fn register_on_eighteenth_birthday_is_allowed() {
    let service = service_on(date(2024, 1, 1));
    service
        .register(PersonRecord::new("a@b.com", "A", "B", date(2006, 1, 1)))
        .unwrap();

    let err = service
        .register(PersonRecord::new("c@d.com", "C", "D", date(2006, 1, 2)))
        .unwrap_err();
    assert!(matches!(err, DirectoryError::AgeNotAllowed { age: 17, .. }));
    assert_eq!(service.len(), 1);
}

#[test]
fn register_accepts_duplicate_email_by_default() {
    let service = service_on(date(2024, 1, 1));
    service.register(user()).unwrap();
    service.register(user()).unwrap();

    assert_eq!(service.len(), 2);
}

#[test]
fn register_rejects_duplicate_email_when_enabled() {
    let config = DirectoryConfig {
        reject_duplicate_email: true,
        ..DirectoryConfig::with_min_allowed_age(18)
    };
    let service = DirectoryService::new(
        InMemoryPersonStore::new(),
        FixedClock(date(2024, 1, 1)),
        config,
    );
    service.register(user()).unwrap();

    let err = service.register(user()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateEmail);
    assert_eq!(service.len(), 1);
}

#[test]
fn find_all_preserves_insertion_order() {
    let service = service_on(date(2024, 1, 1));
    let first = PersonRecord::new("z@b.com", "Zed", "Last", date(1995, 6, 15));
    let second = PersonRecord::new("a@b.com", "Ann", "First", date(2000, 1, 1));
    service.register(first.clone()).unwrap();
    service.register(second.clone()).unwrap();

    assert_eq!(service.find_all(), vec![first, second]);
}

#[test]
fn update_with_full_record_returns_same_values() {
    let service = seeded(vec![user()]);

    let updated = service
        .update("user@email.com", &PersonPatch::from(user()))
        .unwrap();

    assert_eq!(updated, user());
    assert_eq!(service.find_all(), vec![user()]);
}

#[test]
fn update_missing_email_fails_and_leaves_store_unchanged() {
    let service = seeded(vec![user()]);
    let patch = PersonPatch {
        first_name: Some("Ghost".to_string()),
        ..PersonPatch::default()
    };

    let err = service.update("missing@email.com", &patch).unwrap_err();

    assert_eq!(err.to_string(), "There is no user with email: missing@email.com");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(service.find_all(), vec![user()]);
}

#[test]
fn update_not_found_is_reported_before_age_check() {
    let service = seeded(Vec::new());
    let patch = PersonPatch {
        birth_date: Some(date(2016, 1, 1)),
        ..PersonPatch::default()
    };

    let err = service.update("user@email.com", &patch).unwrap_err();
    assert!(matches!(err, DirectoryError::NotFound { .. }));
}

#[test]
fn update_subset_changes_only_present_fields() {
    let service = seeded(vec![user()]);
    let patch = PersonPatch {
        last_name: Some("Married".to_string()),
        address: Some(Some("New Street 1".to_string())),
        ..PersonPatch::default()
    };

    let updated = service.update("user@email.com", &patch).unwrap();

    assert_eq!(updated.last_name, "Married");
    assert_eq!(updated.address.as_deref(), Some("New Street 1"));
    assert_eq!(updated.first_name, "Name");
    assert_eq!(updated.birth_date, date(2000, 1, 1));
    assert_eq!(updated.phone_number.as_deref(), Some("123456789"));
    assert_eq!(service.find_all(), vec![updated]);
}

#[test]
fn update_applying_same_patch_twice_is_idempotent() {
    let service = seeded(vec![user()]);
    let patch = PersonPatch {
        first_name: Some("Again".to_string()),
        phone_number: Some(None),
        ..PersonPatch::default()
    };

    let once = service.update("user@email.com", &patch).unwrap();
    let twice = service.update("user@email.com", &patch).unwrap();

    assert_eq!(once, twice);
    assert_eq!(service.find_all(), vec![twice]);
}

#[test]
fn update_with_underage_birth_date_applies_nothing() {
    let service = seeded(vec![user()]);
    let patch = PersonPatch {
        first_name: Some("Kid".to_string()),
        birth_date: Some(date(2016, 1, 1)),
        ..PersonPatch::default()
    };

    let err = service.update("user@email.com", &patch).unwrap_err();

    assert_eq!(err.to_string(), "Age: 8 is not allowed. You must be at least 18.");
    assert_eq!(service.find_all(), vec![user()]);
}

#[test]
fn update_without_birth_date_skips_age_check() {
    // Stored before the threshold was raised; untouched birth dates are not
    // re-validated.
    let minor = PersonRecord::new("kid@email.com", "Kid", "Young", date(2016, 1, 1));
    let service = seeded(vec![minor]);
    let patch = PersonPatch {
        first_name: Some("Still".to_string()),
        ..PersonPatch::default()
    };

    let updated = service.update("kid@email.com", &patch).unwrap();
    assert_eq!(updated.first_name, "Still");
}

#[test]
fn update_may_rename_key_in_place() {
    let other = PersonRecord::new("other@email.com", "Other", "Person", date(1990, 1, 1));
    let service = seeded(vec![user(), other.clone()]);
    let patch = PersonPatch {
        email: Some("renamed@email.com".to_string()),
        ..PersonPatch::default()
    };

    let updated = service.update("user@email.com", &patch).unwrap();
    assert_eq!(updated.email, "renamed@email.com");

    let all = service.find_all();
    assert_eq!(all[0].email, "renamed@email.com");
    assert_eq!(all[1], other);

    let err = service.update("user@email.com", &patch).unwrap_err();
    assert!(matches!(err, DirectoryError::NotFound { .. }));
    service.update("renamed@email.com", &patch).unwrap();
}

#[test]
fn update_targets_first_of_duplicate_emails() {
    let second = user().with_address("Second");
    let service = seeded(vec![user(), second.clone()]);
    let patch = PersonPatch {
        first_name: Some("First".to_string()),
        ..PersonPatch::default()
    };

    service.update("user@email.com", &patch).unwrap();

    let all = service.find_all();
    assert_eq!(all[0].first_name, "First");
    assert_eq!(all[1], second);
}

#[test]
fn delete_removes_one_record_then_reports_not_found() {
    let other = PersonRecord::new("other@email.com", "Other", "Person", date(1990, 1, 1));
    let service = seeded(vec![user(), other.clone()]);

    service.delete_user("user@email.com").unwrap();
    assert_eq!(service.find_all(), vec![other]);

    let err = service.delete_user("user@email.com").unwrap_err();
    assert_eq!(err.to_string(), "There is no user with email: user@email.com");
    assert_eq!(service.len(), 1);
}

#[test]
fn delete_with_duplicates_removes_only_first() {
    let service = seeded(vec![user(), user()]);

    service.delete_user("user@email.com").unwrap();

    assert_eq!(service.len(), 1);
}

#[test]
fn range_query_returns_matches_in_insertion_order() {
    let first = user().with_address("first");
    let second = user().with_address("second");
    let older = user().with_address("older");
    let service = seeded(vec![
        PersonRecord {
            birth_date: date(2005, 5, 22),
            ..first
        },
        PersonRecord {
            birth_date: date(2005, 4, 22),
            ..second
        },
        PersonRecord {
            birth_date: date(2004, 5, 22),
            ..older
        },
    ]);

    let hits = service
        .get_users_by_birth_date_range(date(2005, 1, 1), date(2005, 12, 31))
        .unwrap();

    let addresses: Vec<&str> = hits.iter().filter_map(|p| p.address.as_deref()).collect();
    assert_eq!(addresses, vec!["first", "second"]);
}

#[test]
fn range_query_bounds_are_inclusive() {
    let low = PersonRecord::new("low@email.com", "Low", "Bound", date(2005, 1, 1));
    let high = PersonRecord::new("high@email.com", "High", "Bound", date(2005, 12, 31));
    let outside = PersonRecord::new("out@email.com", "Out", "Side", date(2006, 1, 1));
    let service = seeded(vec![low.clone(), high.clone(), outside]);

    let hits = service
        .get_users_by_birth_date_range(date(2005, 1, 1), date(2005, 12, 31))
        .unwrap();
    assert_eq!(hits, vec![low.clone(), high]);

    let single_day = service
        .get_users_by_birth_date_range(date(2005, 1, 1), date(2005, 1, 1))
        .unwrap();
    assert_eq!(single_day, vec![low]);
}

#[test]
fn range_query_rejects_reversed_bounds_regardless_of_contents() {
    for service in [seeded(Vec::new()), seeded(vec![user()])] {
        let err = service
            .get_users_by_birth_date_range(date(2005, 1, 1), date(2004, 12, 31))
            .unwrap_err();
        assert_eq!(err.to_string(), "[from] date must be before [to] date");
        assert_eq!(err.kind(), ErrorKind::InvalidRange);
    }
}

#[test]
fn concurrent_registrations_are_all_recorded() {
    let service = Arc::new(service_on(date(2024, 1, 1)));
    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for index in 0..25 {
                    let email = format!("w{worker}-{index}@email.com");
                    service
                        .register(PersonRecord::new(email, "N", "S", date(1990, 1, 1)))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(service.len(), 200);
}

#[test]
fn concurrent_duplicate_registrations_keep_one_when_rejecting() {
    let config = DirectoryConfig {
        reject_duplicate_email: true,
        ..DirectoryConfig::default()
    };
    let service = Arc::new(DirectoryService::new(
        InMemoryPersonStore::new(),
        FixedClock(date(2024, 1, 1)),
        config,
    ));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || service.register(user()).is_ok())
        })
        .collect();
    let successes = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(successes, 1);
    assert_eq!(service.len(), 1);
}

#[test]
fn in_memory_service_keeps_config_and_starts_empty() {
    let config = DirectoryConfig {
        min_allowed_age: 21,
        reject_duplicate_email: true,
    };
    let service = DirectoryService::in_memory(config);

    assert_eq!(service.config(), config);
    assert!(service.is_empty());

    service
        .register(PersonRecord::new("a@b.com", "Ann", "Bell", date(1970, 1, 1)))
        .unwrap();
    assert_eq!(service.len(), 1);
}
