use serde::{Deserialize, Serialize};

/// Per-provider cost strings as formatted by the service (e.g. `"$0.30"`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    #[serde(default)]
    pub gemini: String,
    #[serde(default)]
    pub elevenlabs: String,
    #[serde(default)]
    pub wavespeed: String,
    #[serde(default)]
    pub total: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimate {
    pub num_batches: usize,
    pub num_videos: usize,
    pub num_chars: usize,
    #[serde(default)]
    pub estimated_time: String,
    #[serde(default)]
    pub estimated_cost: CostBreakdown,
}
