mod helpers;

use std::sync::{Arc, Barrier};
use std::thread;

use helpers::{day, engine_at, Harness, OWNER};
use tempfile::TempDir;
use vitality::db;
use vitality::engine::{ActionInput, ActionOutcome, MealType};

#[test]
fn second_checkin_same_day_changes_nothing() {
    let mut h = Harness::new();
    let first = h.record(ActionInput::app_checkin());
    let stored = h.stored_ledger();

    h.at(0, 8);
    let second = h.record(ActionInput::app_checkin());

    assert_eq!(second.outcome, ActionOutcome::Duplicate);
    assert_eq!(second.snapshot.affection, first.snapshot.affection);
    assert_eq!(second.snapshot.app_streak_days, 1);
    assert_eq!(h.stored_ledger(), stored);
    assert_eq!(h.record_count(), 1);
}

#[test]
fn duplicate_reports_decayed_view_without_writing() {
    let mut h = Harness::new();
    h.at(1, 0);
    h.record(ActionInput::meal(MealType::Lunch, 3));
    let stored = h.stored_ledger();

    // Same meal and day, logged again late in the evening
    let evening = h.now() + chrono::Duration::hours(12);
    h.clock.set(evening + chrono::Duration::days(1));
    let dup = h.record(ActionInput::meal(MealType::Lunch, 5).at(evening));

    assert!(dup.is_duplicate());
    // 20 - 3 + 3 = 20, then one day of decay on read
    assert_eq!(dup.snapshot.affection, 17.0);
    assert_eq!(h.stored_ledger(), stored);
}

#[test]
fn duplicates_are_per_owner_across_companions() {
    let mut h = Harness::new();
    let second = helpers::adopt(&h.engine, &h.conn, "Biscuit");

    h.record(ActionInput::app_checkin());
    let other = h
        .engine
        .record_action(&mut h.conn, OWNER, &second, ActionInput::app_checkin())
        .unwrap();
    assert!(other.is_duplicate());
    assert_eq!(other.snapshot.affection, 20.0);

    // A different owner is unaffected
    let stranger = h
        .engine
        .adopt_companion(&h.conn, "owner-2", "Pip", Some(0))
        .unwrap()
        .companion_id;
    let theirs = h
        .engine
        .record_action(&mut h.conn, "owner-2", &stranger, ActionInput::app_checkin())
        .unwrap();
    assert!(!theirs.is_duplicate());
}

#[test]
fn concurrent_checkins_credit_exactly_once() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("vitality.db");
    let (engine, _clock) = engine_at(day(0));
    let companion = {
        let conn = db::open_database(&db_path).unwrap();
        helpers::adopt(&engine, &conn, "Mochi")
    };

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let engine = engine.clone();
            let barrier = barrier.clone();
            let db_path = db_path.clone();
            let companion = companion.clone();
            thread::spawn(move || {
                let mut conn = db::open_database(&db_path).unwrap();
                barrier.wait();
                engine
                    .record_action(&mut conn, OWNER, &companion, ActionInput::app_checkin())
                    .unwrap()
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let recorded = results.iter().filter(|r| !r.is_duplicate()).count();
    assert_eq!(recorded, 1);

    let conn = db::open_database(&db_path).unwrap();
    let snapshot = engine.get_snapshot(&conn, OWNER, &companion).unwrap();
    assert_eq!(snapshot.affection, 22.0);
    assert_eq!(snapshot.app_streak_days, 1);
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM action_records", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn concurrent_meditations_all_count() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("vitality.db");
    let (engine, _clock) = engine_at(day(0));
    let companion = {
        let conn = db::open_database(&db_path).unwrap();
        helpers::adopt(&engine, &conn, "Mochi")
    };

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = engine.clone();
            let db_path = db_path.clone();
            let companion = companion.clone();
            thread::spawn(move || {
                let mut conn = db::open_database(&db_path).unwrap();
                engine
                    .record_action(&mut conn, OWNER, &companion, ActionInput::meditation(10))
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert!(!handle.join().unwrap().is_duplicate());
    }

    let conn = db::open_database(&db_path).unwrap();
    let snapshot = engine.get_snapshot(&conn, OWNER, &companion).unwrap();
    assert_eq!(snapshot.affection, 60.0);
    let version: i64 = conn
        .query_row("SELECT version FROM ledgers WHERE companion_id = ?1", [&companion], |row| row.get(0))
        .unwrap();
    assert_eq!(version, 4);
}
