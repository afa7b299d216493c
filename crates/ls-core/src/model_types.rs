use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// TTS model used when nothing else is configured
pub const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";

/// Voice providers the generation service can synthesize with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    ElevenLabs,
    MiniMax,
}

impl Provider {
    /// Provider name for display in UI
    pub fn name(&self) -> &str {
        match self {
            Self::ElevenLabs => "ElevenLabs",
            Self::MiniMax => "MiniMax",
        }
    }

    /// Provider ID for API communication
    pub fn id(&self) -> &str {
        match self {
            Self::ElevenLabs => "elevenlabs",
            Self::MiniMax => "minimax",
        }
    }

    /// Credential field accepted by the config endpoint
    pub fn credential_key(&self) -> &str {
        match self {
            Self::ElevenLabs => "elevenlabs_api_key",
            Self::MiniMax => "minimax_api_key",
        }
    }

    /// Whether the provider honours the `model_id` of a request
    pub fn uses_model_id(&self) -> bool {
        matches!(self, Self::ElevenLabs)
    }

    /// All available providers
    pub fn all() -> [Provider; 2] {
        [Self::ElevenLabs, Self::MiniMax]
    }
}

impl Default for Provider {
    fn default() -> Self {
        Self::ElevenLabs
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown provider: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "elevenlabs" | "eleven_labs" => Ok(Self::ElevenLabs),
            "minimax" => Ok(Self::MiniMax),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}
