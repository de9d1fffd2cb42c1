use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `checkin_status` MCP tool.
///
/// With only `day`, returns one day's status. With `end_day` as well, returns every
/// day in the inclusive range.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CheckinStatusParams {
    #[schemars(description = "Owner id. Defaults to the configured default owner.")]
    pub owner_id: Option<String>,

    #[schemars(description = "Calendar day as YYYY-MM-DD. Defaults to today in the owner's time zone.")]
    pub day: Option<String>,

    #[schemars(description = "Optional inclusive end day (YYYY-MM-DD) for a range report, at most 366 days.")]
    pub end_day: Option<String>,
}
