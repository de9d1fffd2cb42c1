use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CompanionStatsParams {
    #[schemars(description = "Companion id. Defaults to the owner's most recently adopted active companion.")]
    pub companion_id: Option<String>,

    #[schemars(description = "Owner id. Defaults to the configured default owner.")]
    pub owner_id: Option<String>,

    #[schemars(description = "Number of recent action records to include (0-50). Defaults to 10.")]
    pub history: Option<usize>,
}
