pub mod actions;
pub mod calendar;
pub mod clock;
pub mod decay;
pub mod error;
pub mod ledger;
pub mod mood;
pub mod narration;
pub mod orchestrator;
pub mod stats;
pub mod status;
pub mod streak;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Result, VitalityError};
pub use orchestrator::{CompanionSummary, Engine};
pub use types::{
    ActionInput, ActionKind, ActionOutcome, ActionRecord, ActionType, CompanionStatus, MealType,
    Mood, Narration, RecordResult, VitalityLedger, VitalitySnapshot,
};
