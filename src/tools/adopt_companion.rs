use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AdoptCompanionParams {
    #[schemars(description = "Name for the new companion")]
    pub name: String,

    #[schemars(description = "Owner id. Defaults to the configured default owner.")]
    pub owner_id: Option<String>,

    #[schemars(
        description = "Owner's UTC offset in minutes east of UTC (e.g. -300 for UTC-5). Defines where calendar days begin."
    )]
    pub utc_offset_minutes: Option<i32>,
}
