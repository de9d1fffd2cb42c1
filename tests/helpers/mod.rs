#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rusqlite::Connection;
use vitality::config::ScoringConfig;
use vitality::db;
use vitality::engine::{
    ActionInput, Clock, Engine, ManualClock, RecordResult, VitalitySnapshot,
};

pub const OWNER: &str = "owner-1";

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    db::schema::init_schema(&conn).unwrap();
    db::migrations::run_migrations(&conn).unwrap();
    conn
}

/// 09:00 UTC on the first day of every scenario.
pub fn day0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap()
}

/// 09:00 UTC, `n` days after [`day0`].
pub fn day(n: i64) -> DateTime<Utc> {
    day0() + Duration::days(n)
}

/// An engine on the reference scoring table with a manual clock at `start`.
pub fn engine_at(start: DateTime<Utc>) -> (Engine, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start));
    let engine = Engine::new(ScoringConfig::default(), clock.clone());
    (engine, clock)
}

/// Adopt a companion for [`OWNER`] in UTC. Returns its id.
pub fn adopt(engine: &Engine, conn: &Connection, name: &str) -> String {
    engine
        .adopt_companion(conn, OWNER, name, Some(0))
        .unwrap()
        .companion_id
}

/// One companion on an in-memory database, driven by a manual clock.
pub struct Harness {
    pub conn: Connection,
    pub engine: Engine,
    pub clock: Arc<ManualClock>,
    pub companion: String,
}

impl Harness {
    /// A companion adopted at [`day0`].
    pub fn new() -> Self {
        let conn = test_db();
        let (engine, clock) = engine_at(day0());
        let companion = adopt(&engine, &conn, "Mochi");
        Self {
            conn,
            engine,
            clock,
            companion,
        }
    }

    /// Move the clock to 09:00 on day `n` plus `hours`.
    pub fn at(&self, n: i64, hours: i64) -> &Self {
        self.clock.set(day(n) + Duration::hours(hours));
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn record(&mut self, input: ActionInput) -> RecordResult {
        self.engine
            .record_action(&mut self.conn, OWNER, &self.companion, input)
            .unwrap()
    }

    pub fn snapshot(&self) -> VitalitySnapshot {
        self.engine
            .get_snapshot(&self.conn, OWNER, &self.companion)
            .unwrap()
    }

    pub fn record_count(&self) -> i64 {
        self.conn
            .query_row("SELECT COUNT(*) FROM action_records", [], |row| row.get(0))
            .unwrap()
    }

    /// `(affection, version, last_updated_at)` straight from the ledgers table.
    pub fn stored_ledger(&self) -> (f64, i64, String) {
        self.conn
            .query_row(
                "SELECT affection, version, last_updated_at FROM ledgers WHERE companion_id = ?1",
                [&self.companion],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap()
    }
}
