//! Backend boundary.
//!
//! Everything the client persists or computes remotely goes through [`Gateway`].
//! Two transports implement it: [`HttpGateway`] for the REST service and
//! [`BridgeGateway`] for an in-process command bridge.

mod bridge;
mod envelope;
mod http;
pub mod schemas;

#[cfg(test)]
pub(crate) mod fake;

pub use bridge::{Bridge, BridgeGateway};
pub(crate) use envelope::data_uri;
pub use http::HttpGateway;
pub use schemas::{
    BatchGenerationRequest, BatchResult, SingleGenerationRequest, SingleGenerationResult,
    UploadFile,
};

use async_trait::async_trait;
use ls_core::Provider;
use ls_core::avatar::Avatar;
use ls_core::credentials::{ConfigStatus, Credentials};
use ls_core::estimate::Estimate;
use ls_core::ids::{AvatarId, JobId, ProjectId, StoredImagePath, StoredVideoPath, TagId};
use ls_core::job::{Job, JobStatus};
use ls_core::project::{NewProject, NewProjectVideo, Project, ProjectPatch, Tag};
use ls_core::script::Preview;
use ls_core::video::HistoryVideoEntry;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Network or bridge failure without a structured answer
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Text is empty")]
    EmptyInput,
    /// The service answered `success: false`
    #[error("{0}")]
    Rejected(String),
    #[error("unexpected response: {0}")]
    Malformed(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

#[async_trait]
pub trait Gateway: Send + Sync {
    async fn get_config_status(&self) -> GatewayResult<ConfigStatus>;

    /// Store credentials; returns the service's confirmation message
    async fn save_config(&self, credentials: &Credentials) -> GatewayResult<String>;

    /// Voice names for `provider`, empty when none are available
    async fn list_voices(&self, provider: Provider) -> GatewayResult<Vec<String>>;

    async fn estimate(&self, text: &str) -> GatewayResult<Estimate>;

    async fn preview(&self, scripts_text: &str, batch_size: u32) -> GatewayResult<Preview>;

    /// Stored paths in input order
    async fn upload_images(&self, files: Vec<UploadFile>) -> GatewayResult<Vec<StoredImagePath>>;

    async fn generate_single(
        &self,
        request: SingleGenerationRequest,
    ) -> GatewayResult<SingleGenerationResult>;

    /// One result per submitted script; per-item failures are not an `Err`
    async fn generate_batch(&self, request: BatchGenerationRequest)
    -> GatewayResult<Vec<BatchResult>>;

    async fn list_avatars(&self) -> GatewayResult<Vec<Avatar>>;
    async fn create_avatar(&self, name: &str, image: UploadFile) -> GatewayResult<Avatar>;
    async fn delete_avatar(&self, id: &AvatarId) -> GatewayResult<()>;
    async fn get_avatar_image(&self, id: &AvatarId) -> GatewayResult<Vec<u8>>;

    async fn list_projects(&self, tag: Option<&str>) -> GatewayResult<Vec<Project>>;
    async fn get_project(&self, id: &ProjectId) -> GatewayResult<Project>;
    async fn create_project(&self, project: &NewProject) -> GatewayResult<Project>;
    async fn update_project(&self, id: &ProjectId, patch: &ProjectPatch)
    -> GatewayResult<Project>;
    async fn delete_project(&self, id: &ProjectId) -> GatewayResult<()>;
    async fn add_video_to_project(
        &self,
        id: &ProjectId,
        video: &NewProjectVideo,
    ) -> GatewayResult<()>;

    async fn list_tags(&self) -> GatewayResult<Vec<Tag>>;
    async fn create_tag(&self, name: &str, color: &str) -> GatewayResult<Tag>;
    async fn delete_tag(&self, id: &TagId) -> GatewayResult<()>;

    async fn list_jobs(&self, status: Option<JobStatus>) -> GatewayResult<Vec<Job>>;
    async fn get_job(&self, id: &JobId) -> GatewayResult<Job>;

    async fn list_video_history(&self) -> GatewayResult<Vec<HistoryVideoEntry>>;
    async fn download_video(&self, path: &StoredVideoPath) -> GatewayResult<Vec<u8>>;
}

/// Blank text never leaves the client
pub(crate) fn require_text(text: &str) -> GatewayResult<()> {
    if text.trim().is_empty() {
        Err(GatewayError::EmptyInput)
    } else {
        Ok(())
    }
}

/// A voice lookup the service refused is reported as "no voices"
pub(crate) fn voices_or_empty(
    result: GatewayResult<Vec<String>>,
    provider: Provider,
) -> GatewayResult<Vec<String>> {
    match result {
        Err(GatewayError::Rejected(reason)) | Err(GatewayError::NotFound(reason)) => {
            tracing::warn!(%provider, %reason, "No voices available");
            Ok(Vec::new())
        }
        other => other,
    }
}
