pub mod adopt_companion;
pub mod checkin_status;
pub mod companion_stats;
pub mod get_snapshot;
pub mod narrate;
pub mod record_action;

use adopt_companion::AdoptCompanionParams;
use checkin_status::CheckinStatusParams;
use chrono::NaiveDate;
use companion_stats::CompanionStatsParams;
use get_snapshot::GetSnapshotParams;
use narrate::NarrateParams;
use record_action::RecordActionParams;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use vitality::config::VitalityConfig;
use vitality::engine::{actions, ledger, narration, stats, status, Engine};
use vitality::narrator::Narrator;

/// Most action records `companion_stats` will return.
const MAX_HISTORY: usize = 50;

/// Connections shared by the tool handlers. Writes go through `writer`; read-only
/// tools use `reader` so they never queue behind a write.
#[derive(Clone)]
pub struct DbHandles {
    pub writer: Arc<Mutex<Connection>>,
    pub reader: Arc<Mutex<Connection>>,
}

impl DbHandles {
    /// One connection serving both roles, for in-memory databases.
    pub fn single(conn: Connection) -> Self {
        let shared = Arc::new(Mutex::new(conn));
        Self {
            writer: Arc::clone(&shared),
            reader: shared,
        }
    }
}

/// The vitality MCP tool handler. Holds the shared connections, engine, narrator and
/// config, and exposes every tool via the `#[tool_router]` macro.
#[derive(Clone)]
pub struct VitalityTools {
    tool_router: ToolRouter<Self>,
    db: DbHandles,
    engine: Engine,
    narrator: Arc<dyn Narrator>,
    config: Arc<VitalityConfig>,
}

/// Resolve the companion a call refers to: the explicit id, else the owner's
/// latest active companion.
fn resolve_companion(
    conn: &Connection,
    owner_id: &str,
    companion_id: Option<String>,
) -> anyhow::Result<String> {
    match companion_id {
        Some(id) => Ok(id),
        None => ledger::latest_active_companion(conn, owner_id)?.ok_or_else(|| {
            anyhow::anyhow!("owner {owner_id} has no active companion; call adopt_companion first")
        }),
    }
}

fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| format!("invalid day {raw:?}: {e}"))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("serialization failed: {e}"))
}

impl VitalityTools {
    fn owner(&self, owner_id: Option<String>) -> String {
        owner_id.unwrap_or_else(|| self.config.storage.default_owner.clone())
    }

    /// Run a closure against the write connection on a blocking thread.
    async fn with_db<T, F>(&self, what: &'static str, f: F) -> Result<T, String>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection, &Engine) -> anyhow::Result<T> + Send + 'static,
    {
        self.run_locked(Arc::clone(&self.db.writer), what, f).await
    }

    /// Like [`Self::with_db`], on the read connection.
    async fn with_reader<T, F>(&self, what: &'static str, f: F) -> Result<T, String>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection, &Engine) -> anyhow::Result<T> + Send + 'static,
    {
        self.run_locked(Arc::clone(&self.db.reader), what, f).await
    }

    async fn run_locked<T, F>(
        &self,
        db: Arc<Mutex<Connection>>,
        what: &'static str,
        f: F,
    ) -> Result<T, String>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection, &Engine) -> anyhow::Result<T> + Send + 'static,
    {
        let engine = self.engine.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = db
                .lock()
                .map_err(|e| anyhow::anyhow!("db lock poisoned: {e}"))?;
            f(&mut conn, &engine)
        })
        .await
        .map_err(|e| format!("db task failed: {e}"))?
        .map_err(|e| {
            tracing::warn!(tool = what, error = %e, "tool call failed");
            format!("{what} failed: {e}")
        })
    }
}

#[tool_router]
impl VitalityTools {
    pub fn new(
        db: DbHandles,
        engine: Engine,
        narrator: Arc<dyn Narrator>,
        config: Arc<VitalityConfig>,
    ) -> Self {
        Self {
            tool_router: Self::tool_router(),
            db,
            engine,
            narrator,
            config,
        }
    }

    /// Create a new companion at baseline affection.
    #[tool(description = "Adopt a new companion. Starts at baseline affection with no streaks. Returns its snapshot including companion_id.")]
    async fn adopt_companion(
        &self,
        Parameters(params): Parameters<AdoptCompanionParams>,
    ) -> Result<String, String> {
        let owner = self.owner(params.owner_id);
        tracing::info!(owner_id = %owner, name = %params.name, "adopt_companion called");

        let snapshot = self
            .with_db("adopt_companion", move |conn, engine| {
                Ok(engine.adopt_companion(conn, &owner, &params.name, params.utc_offset_minutes)?)
            })
            .await?;
        to_json(&snapshot)
    }

    /// Record a user action and return the updated snapshot.
    #[tool(description = "Record a user action: app_checkin, meal_checkin (meal_type + rating 1-5), meditation (duration_minutes) or journal (content, optional mood and tags). Same-day repeat check-ins are reported as outcome 'duplicate' and change nothing.")]
    async fn record_action(
        &self,
        Parameters(params): Parameters<RecordActionParams>,
    ) -> Result<String, String> {
        let input = params.to_input()?;
        let owner = self.owner(params.owner_id.clone());
        let companion_id = params.companion_id.clone();
        tracing::info!(owner_id = %owner, action = %input.action_type(), "record_action called");

        let result = self
            .with_db("record_action", move |conn, engine| {
                let companion = resolve_companion(conn, &owner, companion_id)?;
                Ok(engine.record_action(conn, &owner, &companion, input)?)
            })
            .await?;
        to_json(&result)
    }

    /// Read the current, decayed state of a companion without changing it.
    #[tool(description = "Get a companion's current affection, mood and streaks. Decay since the last action is applied on read and not saved.")]
    async fn get_snapshot(
        &self,
        Parameters(params): Parameters<GetSnapshotParams>,
    ) -> Result<String, String> {
        let owner = self.owner(params.owner_id);
        let include_narration = params.include_narration.unwrap_or(false);
        let companion_id = params.companion_id;

        let value = self
            .with_reader("get_snapshot", move |conn, engine| {
                let companion = resolve_companion(conn, &owner, companion_id)?;
                let snapshot = engine.get_snapshot(conn, &owner, &companion)?;
                let mut value = serde_json::to_value(&snapshot)?;
                if include_narration {
                    let latest = narration::latest_narration(conn, &companion)?;
                    value["narration"] = serde_json::to_value(latest)?;
                }
                Ok(value)
            })
            .await?;
        Ok(value.to_string())
    }

    /// Meal check-in completion for a day or a range of days.
    #[tool(description = "Get check-in status for a day (meals completed, app check-in, meditation minutes, journals) or for an inclusive range of days with completion percentages.")]
    async fn checkin_status(
        &self,
        Parameters(params): Parameters<CheckinStatusParams>,
    ) -> Result<String, String> {
        let owner = self.owner(params.owner_id);
        let day = params.day.as_deref().map(parse_day).transpose()?;
        let end_day = params.end_day.as_deref().map(parse_day).transpose()?;
        let default_offset = self.config.scoring.default_utc_offset_minutes;

        let value = self
            .with_reader("checkin_status", move |conn, engine| {
                let start = match day {
                    Some(d) => d,
                    None => status::today_for_owner(conn, &owner, engine.now(), default_offset)?,
                };
                let value = match end_day {
                    Some(end) => serde_json::to_value(status::range_status(conn, &owner, start, end)?)?,
                    None => serde_json::to_value(status::day_status(conn, &owner, start)?)?,
                };
                Ok(value)
            })
            .await?;
        Ok(value.to_string())
    }

    /// History and aggregate statistics for a companion.
    #[tool(description = "Get companion statistics: days since adoption, actions by type, meditation minutes, average meal rating, streaks, plus recent action history.")]
    async fn companion_stats(
        &self,
        Parameters(params): Parameters<CompanionStatsParams>,
    ) -> Result<String, String> {
        let owner = self.owner(params.owner_id);
        let history = params.history.unwrap_or(10).min(MAX_HISTORY);
        let companion_id = params.companion_id;

        let value = self
            .with_reader("companion_stats", move |conn, engine| {
                let companion = resolve_companion(conn, &owner, companion_id)?;
                let stats = stats::companion_stats(conn, &owner, &companion, engine.now())?;
                let recent = actions::recent_actions(conn, &owner, &companion, history)?;
                Ok(serde_json::json!({ "stats": stats, "recent_actions": recent }))
            })
            .await?;
        Ok(value.to_string())
    }

    /// Ask the narrator to describe a companion and optionally log the result.
    #[tool(description = "Generate mood and dialogue text for a companion's current state. Display only; never affects affection. Stored in the mood log unless store=false.")]
    async fn narrate(
        &self,
        Parameters(params): Parameters<NarrateParams>,
    ) -> Result<String, String> {
        let owner = self.owner(params.owner_id);
        let store = params.store.unwrap_or(true);
        let companion_id = params.companion_id;

        let (owner, companion, snapshot) = self
            .with_reader("narrate", move |conn, engine| {
                let companion = resolve_companion(conn, &owner, companion_id)?;
                let snapshot = engine.get_snapshot(conn, &owner, &companion)?;
                Ok((owner, companion, snapshot))
            })
            .await?;

        let narrator = Arc::clone(&self.narrator);
        let for_narrator = snapshot.clone();
        let text = tokio::task::spawn_blocking(move || narrator.narrate(&for_narrator))
            .await
            .map_err(|e| format!("narrator task failed: {e}"))?
            .map_err(|e| format!("narration failed: {e}"))?;

        if !store {
            return to_json(&text);
        }

        let entry = self
            .with_db("narrate", move |conn, engine| {
                Ok(narration::record_narration(
                    conn,
                    &owner,
                    &companion,
                    text,
                    snapshot.last_action,
                    snapshot.affection,
                    engine.now(),
                )?)
            })
            .await?;
        tracing::info!(companion_id = %entry.companion_id, mood = %entry.mood, "narration stored");
        to_json(&entry)
    }
}

#[tool_handler]
impl ServerHandler for VitalityTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "Vitality tracks a virtual companion's affection. Use adopt_companion once, \
                 record_action for every check-in, meal, meditation or journal entry, \
                 get_snapshot to read the current state, and narrate for mood text."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use vitality::engine::ManualClock;
    use vitality::narrator::template::TemplateNarrator;

    fn tools() -> VitalityTools {
        let conn = vitality::db::open_memory_database().unwrap();
        let config = VitalityConfig::default();
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap()));
        let engine = Engine::new(config.scoring.clone(), clock);
        VitalityTools::new(
            DbHandles::single(conn),
            engine,
            Arc::new(TemplateNarrator),
            Arc::new(config),
        )
    }

    fn record(action: &str) -> RecordActionParams {
        RecordActionParams {
            action: action.into(),
            companion_id: None,
            owner_id: None,
            meal_type: None,
            rating: None,
            notes: None,
            duration_minutes: None,
            title: None,
            content: None,
            mood: None,
            tags: None,
            occurred_at: None,
        }
    }

    #[tokio::test]
    async fn adopt_then_checkin_through_tools() {
        let tools = tools();
        let adopted = tools
            .adopt_companion(Parameters(AdoptCompanionParams {
                name: "Miso".into(),
                owner_id: None,
                utc_offset_minutes: Some(0),
            }))
            .await
            .unwrap();
        let adopted: serde_json::Value = serde_json::from_str(&adopted).unwrap();
        assert_eq!(adopted["affection"], 20.0);

        let first: serde_json::Value =
            serde_json::from_str(&tools.record_action(Parameters(record("app_checkin"))).await.unwrap()).unwrap();
        assert_eq!(first["outcome"], "recorded");
        assert_eq!(first["snapshot"]["affection"], 22.0);

        let second: serde_json::Value =
            serde_json::from_str(&tools.record_action(Parameters(record("app_checkin"))).await.unwrap()).unwrap();
        assert_eq!(second["outcome"], "duplicate");
        assert_eq!(second["snapshot"], first["snapshot"]);
    }

    #[tokio::test]
    async fn actions_without_a_companion_fail_cleanly() {
        let tools = tools();
        let err = tools.record_action(Parameters(record("app_checkin"))).await.unwrap_err();
        assert!(err.contains("adopt_companion"));
    }

    #[tokio::test]
    async fn narrate_stores_a_mood_log_entry() {
        let tools = tools();
        tools
            .adopt_companion(Parameters(AdoptCompanionParams {
                name: "Miso".into(),
                owner_id: Some("o1".into()),
                utc_offset_minutes: None,
            }))
            .await
            .unwrap();

        let stored = tools
            .narrate(Parameters(NarrateParams {
                companion_id: None,
                owner_id: Some("o1".into()),
                store: None,
            }))
            .await
            .unwrap();
        let stored: serde_json::Value = serde_json::from_str(&stored).unwrap();
        assert!(stored["id"].as_i64().is_some());

        let snapshot = tools
            .get_snapshot(Parameters(GetSnapshotParams {
                companion_id: None,
                owner_id: Some("o1".into()),
                include_narration: Some(true),
            }))
            .await
            .unwrap();
        let snapshot: serde_json::Value = serde_json::from_str(&snapshot).unwrap();
        assert_eq!(snapshot["narration"]["mood"], stored["mood"]);
        // Narration never moves the score.
        assert_eq!(snapshot["affection"], 20.0);
    }

    #[tokio::test]
    async fn reads_do_not_wait_for_the_writer() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("vitality.db");
        let db = DbHandles {
            writer: Arc::new(Mutex::new(vitality::db::open_database(&path).unwrap())),
            reader: Arc::new(Mutex::new(vitality::db::open_read_connection(&path).unwrap())),
        };
        let config = VitalityConfig::default();
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap()));
        let engine = Engine::new(config.scoring.clone(), clock);
        let tools = VitalityTools::new(db.clone(), engine, Arc::new(TemplateNarrator), Arc::new(config));

        tools
            .adopt_companion(Parameters(AdoptCompanionParams {
                name: "Miso".into(),
                owner_id: Some("o1".into()),
                utc_offset_minutes: Some(0),
            }))
            .await
            .unwrap();

        // A long write holds the writer; reads for any owner still answer
        let _busy = db.writer.lock().unwrap();
        let read = tools.get_snapshot(Parameters(GetSnapshotParams {
            companion_id: None,
            owner_id: Some("o1".into()),
            include_narration: None,
        }));
        let snapshot = tokio::time::timeout(std::time::Duration::from_secs(5), read)
            .await
            .expect("read blocked behind the writer")
            .unwrap();
        let snapshot: serde_json::Value = serde_json::from_str(&snapshot).unwrap();
        assert_eq!(snapshot["affection"], 20.0);
    }

    #[test]
    fn read_connection_refuses_writes() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("vitality.db");
        vitality::db::open_database(&path).unwrap();
        let reader = vitality::db::open_read_connection(&path).unwrap();
        assert!(reader
            .execute("UPDATE schema_meta SET value = '0' WHERE key = 'schema_version'", [])
            .is_err());
    }

    #[tokio::test]
    async fn checkin_status_rejects_bad_dates() {
        let tools = tools();
        let err = tools
            .checkin_status(Parameters(CheckinStatusParams {
                owner_id: None,
                day: Some("01/02/2026".into()),
                end_day: None,
            }))
            .await
            .unwrap_err();
        assert!(err.contains("invalid day"));
    }
}
