mod cli;
mod server;
mod tools;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use vitality::config::VitalityConfig;
use vitality::engine::{ActionInput, MealType, Mood};

#[derive(Parser)]
#[command(name = "vitality", version, about = "Companion vitality and engagement engine")]
struct Cli {
    /// Owner id. Defaults to `storage.default_owner`.
    #[arg(long, global = true)]
    owner: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Transport {
    Stdio,
    Sse,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server
    Serve {
        /// Defaults to `server.transport`
        #[arg(long, value_enum)]
        transport: Option<Transport>,
    },
    /// Adopt a new companion
    Adopt {
        name: String,
        /// Minutes east of UTC where your days begin (e.g. -300)
        #[arg(long, allow_negative_numbers = true)]
        utc_offset: Option<i32>,
    },
    /// List your companions
    List,
    /// Daily app check-in
    Checkin {
        #[arg(long)]
        companion: Option<String>,
    },
    /// Log a meal
    Meal {
        /// breakfast, lunch or dinner
        meal: MealType,
        /// 1-5
        #[arg(long)]
        rating: u8,
        #[arg(long)]
        notes: Option<String>,
        /// When you ate (RFC 3339); defaults to now
        #[arg(long, value_parser = parse_timestamp)]
        at: Option<DateTime<Utc>>,
        #[arg(long)]
        companion: Option<String>,
    },
    /// Log a meditation session
    Meditate {
        minutes: u32,
        #[arg(long, value_parser = parse_timestamp)]
        at: Option<DateTime<Utc>>,
        #[arg(long)]
        companion: Option<String>,
    },
    /// Write a journal entry
    Journal {
        content: String,
        #[arg(long)]
        title: Option<String>,
        /// How you feel, e.g. calm or stressed
        #[arg(long)]
        mood: Option<Mood>,
        /// Label for the entry; repeat for several
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long, value_parser = parse_timestamp)]
        at: Option<DateTime<Utc>>,
        #[arg(long)]
        companion: Option<String>,
    },
    /// Show a companion's current state
    Status {
        #[arg(long)]
        companion: Option<String>,
    },
    /// Show check-in status for a day or a range of days
    Day {
        /// YYYY-MM-DD; defaults to today
        date: Option<NaiveDate>,
        /// Inclusive end of a range
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Show companion statistics
    Stats {
        #[arg(long)]
        companion: Option<String>,
        /// Number of recent actions to list
        #[arg(long, default_value_t = 10)]
        history: usize,
    },
    /// Retire a companion (its ledger is kept, frozen)
    Retire { companion: String },
    /// Describe a companion's mood
    Narrate {
        #[arg(long)]
        companion: Option<String>,
        /// Do not store the narration in the mood log
        #[arg(long)]
        no_store: bool,
    },
    /// Run database diagnostics
    Doctor,
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| format!("expected RFC 3339 timestamp: {e}"))
}

fn with_time(input: ActionInput, at: Option<DateTime<Utc>>) -> ActionInput {
    match at {
        Some(ts) => input.at(ts),
        None => input,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = VitalityConfig::load()?;

    // Log to stderr so stdout stays clean for MCP JSON-RPC.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let owner = cli
        .owner
        .unwrap_or_else(|| config.storage.default_owner.clone());

    match cli.command {
        Command::Serve { transport } => {
            let sse = match transport {
                Some(Transport::Sse) => true,
                Some(Transport::Stdio) => false,
                None => config.server.transport == "sse",
            };
            if sse {
                server::serve_sse(config).await?;
            } else {
                server::serve_stdio(config).await?;
            }
        }
        Command::Adopt { name, utc_offset } => {
            cli::actions::adopt(&config, &owner, &name, utc_offset)?;
        }
        Command::List => cli::actions::list(&config, &owner)?,
        Command::Checkin { companion } => {
            cli::actions::record(&config, &owner, companion.as_deref(), ActionInput::app_checkin())?;
        }
        Command::Meal {
            meal,
            rating,
            notes,
            at,
            companion,
        } => {
            let mut input = ActionInput::meal(meal, rating);
            if let Some(notes) = notes {
                input = input.with_notes(notes);
            }
            cli::actions::record(&config, &owner, companion.as_deref(), with_time(input, at))?;
        }
        Command::Meditate {
            minutes,
            at,
            companion,
        } => {
            let input = with_time(ActionInput::meditation(minutes), at);
            cli::actions::record(&config, &owner, companion.as_deref(), input)?;
        }
        Command::Journal {
            content,
            title,
            mood,
            tags,
            at,
            companion,
        } => {
            let input = ActionInput::new(vitality::engine::ActionKind::Journal {
                title,
                content,
                mood,
                tags,
            });
            cli::actions::record(&config, &owner, companion.as_deref(), with_time(input, at))?;
        }
        Command::Status { companion } => {
            cli::status::show(&config, &owner, companion.as_deref())?;
        }
        Command::Day { date, to } => cli::status::day(&config, &owner, date, to)?,
        Command::Stats { companion, history } => {
            cli::stats::stats(&config, &owner, companion.as_deref(), history)?;
        }
        Command::Retire { companion } => cli::actions::retire(&config, &owner, &companion)?,
        Command::Narrate { companion, no_store } => {
            // The http narrator blocks; keep it off the runtime threads.
            tokio::task::spawn_blocking(move || {
                cli::narrate::narrate(&config, &owner, companion.as_deref(), !no_store)
            })
            .await
            .context("narrate task panicked")??;
        }
        Command::Doctor => cli::doctor::doctor(&config)?,
    }

    Ok(())
}
