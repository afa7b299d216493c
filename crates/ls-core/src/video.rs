use crate::ids::StoredVideoPath;
use crate::time;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Completed output listed by the history endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryVideoEntry {
    pub path: StoredVideoPath,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default, with = "time::unix_opt")]
    pub created_at: Option<DateTime<Utc>>,
}
