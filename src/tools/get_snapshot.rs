//! MCP `get_snapshot` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `get_snapshot` MCP tool. Reading never changes the ledger.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetSnapshotParams {
    #[schemars(description = "Companion id. Defaults to the owner's most recently adopted active companion.")]
    pub companion_id: Option<String>,

    #[schemars(description = "Owner id. Defaults to the configured default owner.")]
    pub owner_id: Option<String>,

    #[schemars(description = "Also return the latest stored narration, if any. Defaults to false.")]
    pub include_narration: Option<bool>,
}
