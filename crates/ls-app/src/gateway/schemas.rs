use ls_core::Provider;
use ls_core::ids::{StoredImagePath, StoredVideoPath};
use ls_core::script::{BatchImageMode, BatchKey, Script, ScriptId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Local file handed to an upload call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SingleGenerationRequest {
    pub text: String,
    pub provider: Provider,
    pub voice_name: String,
    pub model_id: String,
    pub image_paths: Vec<StoredImagePath>,
    pub max_workers: u32,
    /// Echoed back so the reply can be matched to its placeholder
    pub client_ref: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SingleGenerationResult {
    pub video_path: StoredVideoPath,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchGenerationRequest {
    pub scripts: Vec<Script>,
    pub provider: Provider,
    pub model_id: String,
    pub image_paths: Vec<StoredImagePath>,
    pub max_workers: u32,
    /// One voice per script, in script order
    pub voice_selections: Vec<String>,
    pub batch_image_mode: BatchImageMode,
    pub batch_images: BTreeMap<BatchKey, StoredImagePath>,
    pub client_ref: String,
}

/// Outcome of one script inside a batch generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub script_id: ScriptId,
    pub success: bool,
    #[serde(default)]
    pub video_path: Option<StoredVideoPath>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
}

impl BatchResult {
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or("Unknown error")
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PreviewRequest<'a> {
    pub scripts_text: &'a str,
    pub batch_size: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct TextRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct TagRequest<'a> {
    pub name: &'a str,
    pub color: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn batch_request_keys_batches_by_composite_key() {
        let mut batch_images = BTreeMap::new();
        batch_images.insert(BatchKey::new(1, 2), StoredImagePath::new("uploads/b.png"));
        let req = BatchGenerationRequest {
            scripts: vec![],
            provider: Provider::ElevenLabs,
            model_id: "eleven_multilingual_v2".into(),
            image_paths: vec![StoredImagePath::new("uploads/a.png")],
            max_workers: 3,
            voice_selections: vec!["Rachel".into()],
            batch_image_mode: BatchImageMode::Individual,
            batch_images,
            client_ref: "ref-1".into(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["batch_image_mode"], json!("individual"));
        assert_eq!(value["batch_images"], json!({"1_2": "uploads/b.png"}));
        assert_eq!(value["provider"], json!("elevenlabs"));
    }

    #[test]
    fn failed_batch_item_has_message() {
        let item: BatchResult = serde_json::from_value(json!({
            "script_id": 2,
            "success": false,
            "error": "Voz não encontrada"
        }))
        .unwrap();
        assert!(!item.success);
        assert_eq!(item.error_message(), "Voz não encontrada");
        assert!(item.video_path.is_none());
    }
}
