use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which service credentials the backend has configured
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigStatus {
    #[serde(default)]
    pub keys: BTreeMap<String, bool>,
    #[serde(default)]
    pub masked_keys: BTreeMap<String, Option<String>>,
}

impl ConfigStatus {
    pub fn is_configured(&self, service: &str) -> bool {
        self.keys.get(service).copied().unwrap_or(false)
    }

    pub fn masked(&self, service: &str) -> Option<&str> {
        self.masked_keys.get(service).and_then(|k| k.as_deref())
    }
}

/// Credentials to store; blank fields leave the stored value unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elevenlabs_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimax_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wavespeed_api_key: Option<String>,
}

impl Credentials {
    /// Drop blank entries so they are not sent at all
    pub fn trimmed(self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
        Self {
            elevenlabs_api_key: keep(self.elevenlabs_api_key),
            minimax_api_key: keep(self.minimax_api_key),
            gemini_api_key: keep(self.gemini_api_key),
            wavespeed_api_key: keep(self.wavespeed_api_key),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elevenlabs_api_key.is_none()
            && self.minimax_api_key.is_none()
            && self.gemini_api_key.is_none()
            && self.wavespeed_api_key.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn trimmed_drops_blank_keys() {
        let creds = Credentials {
            elevenlabs_api_key: Some("  sk-123 ".into()),
            minimax_api_key: Some("   ".into()),
            ..Default::default()
        }
        .trimmed();
        assert_eq!(
            serde_json::to_value(&creds).unwrap(),
            json!({"elevenlabs_api_key": "sk-123"})
        );
        assert!(Credentials::default().trimmed().is_empty());
    }

    #[test]
    fn status_lookup() {
        let status: ConfigStatus = serde_json::from_value(json!({
            "keys": {"elevenlabs": true, "minimax": false},
            "masked_keys": {"elevenlabs": "sk-1****abcd", "minimax": null}
        }))
        .unwrap();
        assert!(status.is_configured("elevenlabs"));
        assert!(!status.is_configured("minimax"));
        assert!(!status.is_configured("gemini"));
        assert_eq!(status.masked("elevenlabs"), Some("sk-1****abcd"));
        assert_eq!(status.masked("minimax"), None);
    }
}
