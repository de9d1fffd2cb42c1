mod helpers;

use chrono::Duration;
use helpers::{Harness, OWNER};
use vitality::engine::{ActionInput, CompanionStatus, MealType, VitalityError};

#[test]
fn affection_stays_in_range_over_long_history() {
    let mut h = Harness::new();
    let meals = [MealType::Breakfast, MealType::Lunch, MealType::Dinner];

    for n in 0..40 {
        h.at(n, 0);
        // Busy for twenty days, then mostly absent
        if n < 20 || n % 9 == 0 {
            for input in [
                ActionInput::app_checkin(),
                ActionInput::meal(meals[(n % 3) as usize], 4),
                ActionInput::meditation(10),
                ActionInput::journal("entry"),
            ] {
                let result = h.record(input);
                let a = result.snapshot.affection;
                assert!((0.0..=100.0).contains(&a), "day {n}: affection {a}");
            }
        }
        let a = h.snapshot().affection;
        assert!((0.0..=100.0).contains(&a), "day {n}: snapshot {a}");
    }
}

#[test]
fn decay_is_monotonic_without_actions() {
    let mut h = Harness::new();
    for _ in 0..5 {
        h.record(ActionInput::meditation(10));
    }

    let mut previous = h.snapshot().affection;
    for hours in (1..24 * 40).step_by(7) {
        h.clock.set(helpers::day(0) + Duration::hours(hours));
        let current = h.snapshot().affection;
        assert!(current <= previous, "affection rose from {previous} to {current}");
        previous = current;
    }
    assert_eq!(previous, 0.0);
}

#[test]
fn snapshot_never_writes() {
    let mut h = Harness::new();
    h.record(ActionInput::app_checkin());
    let stored = h.stored_ledger();

    h.at(4, 0);
    assert_eq!(h.snapshot().affection, 10.0);
    assert_eq!(h.snapshot().affection, 10.0);
    assert_eq!(h.stored_ledger(), stored);
}

#[test]
fn failed_append_leaves_ledger_untouched() {
    let mut h = Harness::new();
    h.record(ActionInput::app_checkin());
    let stored = h.stored_ledger();

    h.conn
        .execute_batch(
            "CREATE TRIGGER reject_journal BEFORE INSERT ON action_records
             WHEN NEW.action_type = 'journal'
             BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
        )
        .unwrap();

    h.at(2, 0);
    let err = h
        .engine
        .record_action(&mut h.conn, OWNER, &h.companion, ActionInput::journal("lost"))
        .unwrap_err();
    assert!(matches!(err, VitalityError::Persistence(_)), "got {err:?}");

    assert_eq!(h.stored_ledger(), stored);
    assert_eq!(h.record_count(), 1);
}

#[test]
fn failed_ledger_save_rolls_back_the_record() {
    let mut h = Harness::new();
    let stored = h.stored_ledger();

    h.conn
        .execute_batch(
            "CREATE TRIGGER freeze_ledgers BEFORE UPDATE ON ledgers
             BEGIN SELECT RAISE(ABORT, 'read only'); END;",
        )
        .unwrap();

    let err = h
        .engine
        .record_action(&mut h.conn, OWNER, &h.companion, ActionInput::meditation(5))
        .unwrap_err();
    assert!(matches!(err, VitalityError::Persistence(_)), "got {err:?}");
    assert_eq!(h.stored_ledger(), stored);
    assert_eq!(h.record_count(), 0);
}

#[test]
fn clock_skew_skips_decay_and_keeps_last_update() {
    let mut h = Harness::new();
    h.at(2, 0);
    h.record(ActionInput::meditation(10));
    let (_, _, last_updated) = h.stored_ledger();

    // Clock jumps back two days
    h.at(0, 0);
    let result = h.record(ActionInput::journal("time travel"));
    // 20 - 6 + 10, then + 10 with no decay
    assert_eq!(result.snapshot.affection, 34.0);
    let (_, _, after) = h.stored_ledger();
    assert_eq!(after, last_updated);
}

#[test]
fn unknown_companion_is_not_found() {
    let mut h = Harness::new();
    let err = h
        .engine
        .record_action(&mut h.conn, OWNER, "nope", ActionInput::app_checkin())
        .unwrap_err();
    assert!(matches!(err, VitalityError::NotFound { .. }));

    // Another owner's companion is invisible too
    let err = h.engine.get_snapshot(&h.conn, "owner-2", &h.companion).unwrap_err();
    assert!(matches!(err, VitalityError::NotFound { .. }));
}

#[test]
fn invalid_input_is_rejected_before_any_write() {
    let mut h = Harness::new();
    for input in [
        ActionInput::meal(MealType::Dinner, 0),
        ActionInput::meal(MealType::Dinner, 6),
        ActionInput::meditation(0),
        ActionInput::journal("   "),
    ] {
        let err = h
            .engine
            .record_action(&mut h.conn, OWNER, &h.companion, input)
            .unwrap_err();
        assert!(matches!(err, VitalityError::InvalidInput(_)), "got {err:?}");
    }
    assert_eq!(h.record_count(), 0);
}

#[test]
fn retired_ledger_is_frozen() {
    let mut h = Harness::new();
    h.record(ActionInput::meditation(30));

    h.at(2, 0);
    let retired = h
        .engine
        .retire_companion(&mut h.conn, OWNER, &h.companion)
        .unwrap();
    assert_eq!(retired.status, CompanionStatus::Retired);
    assert_eq!(retired.affection, 24.0);

    h.at(30, 0);
    assert_eq!(h.snapshot().affection, 24.0);

    let err = h
        .engine
        .record_action(&mut h.conn, OWNER, &h.companion, ActionInput::app_checkin())
        .unwrap_err();
    assert!(matches!(err, VitalityError::Retired(_)));

    // Retiring twice returns the frozen snapshot
    let again = h
        .engine
        .retire_companion(&mut h.conn, OWNER, &h.companion)
        .unwrap();
    assert_eq!(again.affection, 24.0);

    let list = h.engine.list_companions(&h.conn, OWNER).unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].status, CompanionStatus::Retired);
}
