// Static host identity model

use serde::{Deserialize, Serialize};

/// Static host identity; fetched once at startup and exposed via GET /api/info.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub os_family: String,
    pub os_version: String,
    pub host_name: String,
    pub processor_name: String,
}
