//! Local files to stored paths, raw script text to a segmented preview.

use crate::error::AppError;
use crate::gateway::Gateway;
use crate::state::ImageAsset;
use ls_core::Provider;
use ls_core::estimate::Estimate;
use ls_core::ids::StoredImagePath;
use ls_core::script::Preview;
use tracing::{info, warn};

/// A preview together with the voices its scripts default to
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewOutcome {
    pub preview: Preview,
    pub voices: Vec<String>,
}

/// Upload every image or none: any refusal, or an answer that does not have
/// one path per image, fails the whole call.
pub async fn upload_images(
    gateway: &dyn Gateway,
    images: &[ImageAsset],
) -> Result<Vec<StoredImagePath>, AppError> {
    if images.is_empty() {
        return Ok(Vec::new());
    }
    let files = images.iter().map(ImageAsset::to_upload).collect();
    let paths = gateway
        .upload_images(files)
        .await
        .map_err(AppError::from_upload)?;

    if paths.len() != images.len() {
        warn!(sent = images.len(), stored = paths.len(), "Partial upload");
        return Err(AppError::Upload(format!(
            "{} of {} images were stored",
            paths.len(),
            images.len()
        )));
    }
    info!(count = paths.len(), "Images uploaded");
    Ok(paths)
}

/// Segment `scripts_text` and fetch the voice list of `provider`
pub async fn generate_preview(
    gateway: &dyn Gateway,
    scripts_text: &str,
    provider: Provider,
    batch_size: u32,
) -> Result<PreviewOutcome, AppError> {
    if scripts_text.trim().is_empty() {
        return Err(AppError::EmptyInput);
    }
    let preview = gateway
        .preview(scripts_text, batch_size)
        .await?
        .validated()
        .map_err(|err| AppError::Transport(format!("Invalid preview: {err}")))?;

    let voices = match gateway.list_voices(provider).await {
        Ok(voices) => voices,
        Err(err) => {
            warn!(%provider, error = %err, "Voice list unavailable");
            Vec::new()
        }
    };
    info!(
        scripts = preview.summary.total_scripts,
        batches = preview.summary.total_batches,
        voices = voices.len(),
        "Preview ready"
    );
    Ok(PreviewOutcome { preview, voices })
}

pub async fn estimate(gateway: &dyn Gateway, text: &str) -> Result<Estimate, AppError> {
    if text.trim().is_empty() {
        return Err(AppError::EmptyInput);
    }
    Ok(gateway.estimate(text).await?)
}
