//! MCP `narrate` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `narrate` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct NarrateParams {
    #[schemars(description = "Companion id. Defaults to the owner's most recently adopted active companion.")]
    pub companion_id: Option<String>,

    #[schemars(description = "Owner id. Defaults to the configured default owner.")]
    pub owner_id: Option<String>,

    /// Store the narration in the companion's mood log. Defaults to `true`.
    #[schemars(description = "Store the narration in the companion's mood log. Defaults to true.")]
    pub store: Option<bool>,
}
