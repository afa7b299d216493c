use super::envelope;
use super::{
    BatchGenerationRequest, BatchResult, Gateway, GatewayError, GatewayResult,
    SingleGenerationRequest, SingleGenerationResult, UploadFile, require_text, voices_or_empty,
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
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

/// In-process command channel to the backend.
///
/// Arguments and answers are JSON; answers use the same envelope as the REST
/// service. Binary data travels as base64 data URIs.
#[async_trait]
pub trait Bridge: Send + Sync {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, String>;
}

pub struct BridgeGateway {
    bridge: Arc<dyn Bridge>,
}

impl BridgeGateway {
    pub fn new(bridge: Arc<dyn Bridge>) -> Self {
        Self { bridge }
    }

    async fn call(&self, command: &str, args: Value) -> GatewayResult<Value> {
        debug!(command, "Bridge call");
        let body = self.bridge.invoke(command, args).await.map_err(|err| {
            warn!(command, error = %err, "Bridge failed");
            GatewayError::Transport(err)
        })?;
        envelope::open(body, None).inspect_err(|err| {
            warn!(command, error = %err, "Bridge refused request");
        })
    }

    async fn call_field<T: serde::de::DeserializeOwned>(
        &self,
        command: &str,
        args: Value,
        field: &str,
    ) -> GatewayResult<T> {
        let mut body = self.call(command, args).await?;
        envelope::field(&mut body, field)
    }
}

fn to_args(value: &impl serde::Serialize) -> GatewayResult<Value> {
    serde_json::to_value(value).map_err(|err| GatewayError::Malformed(err.to_string()))
}

#[async_trait]
impl Gateway for BridgeGateway {
    async fn get_config_status(&self) -> GatewayResult<ConfigStatus> {
        let body = self.call("get_api_keys_status", Value::Null).await?;
        envelope::whole(body)
    }

    async fn save_config(&self, credentials: &Credentials) -> GatewayResult<String> {
        let mut body = self.call("save_api_keys", to_args(credentials)?).await?;
        Ok(envelope::field(&mut body, "message").unwrap_or_default())
    }

    async fn list_voices(&self, provider: Provider) -> GatewayResult<Vec<String>> {
        let result = self
            .call_field("get_voices", json!({ "provider": provider.id() }), "voices")
            .await;
        voices_or_empty(result, provider)
    }

    async fn estimate(&self, text: &str) -> GatewayResult<Estimate> {
        require_text(text)?;
        self.call_field("estimate_job", json!({ "text": text }), "estimate")
            .await
    }

    async fn preview(&self, scripts_text: &str, batch_size: u32) -> GatewayResult<Preview> {
        require_text(scripts_text)?;
        let body = self
            .call(
                "generate_preview",
                json!({ "scripts_text": scripts_text, "batch_size": batch_size }),
            )
            .await?;
        envelope::whole(body)
    }

    async fn upload_images(&self, files: Vec<UploadFile>) -> GatewayResult<Vec<StoredImagePath>> {
        let images: Vec<Value> = files
            .iter()
            .map(|f| json!({ "name": f.name, "data": envelope::data_uri(&f.mime, &f.bytes) }))
            .collect();
        self.call_field("upload_images_base64", json!({ "images": images }), "paths")
            .await
    }

    async fn generate_single(
        &self,
        request: SingleGenerationRequest,
    ) -> GatewayResult<SingleGenerationResult> {
        let body = self
            .call("generate_single_video", to_args(&request)?)
            .await?;
        envelope::whole(body)
    }

    async fn generate_batch(
        &self,
        request: BatchGenerationRequest,
    ) -> GatewayResult<Vec<BatchResult>> {
        self.call_field("generate_batch_videos", to_args(&request)?, "results")
            .await
    }

    async fn list_avatars(&self) -> GatewayResult<Vec<Avatar>> {
        self.call_field("get_avatars", Value::Null, "avatars").await
    }

    async fn create_avatar(&self, name: &str, image: UploadFile) -> GatewayResult<Avatar> {
        let args = json!({
            "name": name,
            "image_base64": envelope::data_uri(&image.mime, &image.bytes),
        });
        self.call_field("create_avatar", args, "avatar").await
    }

    async fn delete_avatar(&self, id: &AvatarId) -> GatewayResult<()> {
        self.call("delete_avatar", json!({ "avatar_id": id })).await?;
        Ok(())
    }

    async fn get_avatar_image(&self, id: &AvatarId) -> GatewayResult<Vec<u8>> {
        let data: String = self
            .call_field("get_avatar_image_base64", json!({ "avatar_id": id }), "data")
            .await?;
        envelope::decode_base64(&data)
    }

    async fn list_projects(&self, tag: Option<&str>) -> GatewayResult<Vec<Project>> {
        self.call_field("get_projects", json!({ "tag_filter": tag }), "projects")
            .await
    }

    async fn get_project(&self, id: &ProjectId) -> GatewayResult<Project> {
        self.call_field("get_project", json!({ "project_id": id }), "project")
            .await
    }

    async fn create_project(&self, project: &NewProject) -> GatewayResult<Project> {
        self.call_field("create_project", to_args(project)?, "project")
            .await
    }

    async fn update_project(
        &self,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> GatewayResult<Project> {
        let args = json!({ "project_id": id, "data": to_args(patch)? });
        self.call_field("update_project", args, "project").await
    }

    async fn delete_project(&self, id: &ProjectId) -> GatewayResult<()> {
        self.call("delete_project", json!({ "project_id": id }))
            .await?;
        Ok(())
    }

    async fn add_video_to_project(
        &self,
        id: &ProjectId,
        video: &NewProjectVideo,
    ) -> GatewayResult<()> {
        let args = json!({ "project_id": id, "video_data": to_args(video)? });
        self.call("add_video_to_project", args).await?;
        Ok(())
    }

    async fn list_tags(&self) -> GatewayResult<Vec<Tag>> {
        self.call_field("get_tags", Value::Null, "tags").await
    }

    async fn create_tag(&self, name: &str, color: &str) -> GatewayResult<Tag> {
        self.call_field("create_tag", json!({ "name": name, "color": color }), "tag")
            .await
    }

    async fn delete_tag(&self, id: &TagId) -> GatewayResult<()> {
        self.call("delete_tag", json!({ "tag_id": id })).await?;
        Ok(())
    }

    async fn list_jobs(&self, status: Option<JobStatus>) -> GatewayResult<Vec<Job>> {
        self.call_field("get_jobs", json!({ "status": status }), "jobs")
            .await
    }

    async fn get_job(&self, id: &JobId) -> GatewayResult<Job> {
        self.call_field("get_job_status", json!({ "job_id": id }), "job")
            .await
    }

    async fn list_video_history(&self) -> GatewayResult<Vec<HistoryVideoEntry>> {
        self.call_field("get_video_history", Value::Null, "videos")
            .await
    }

    async fn download_video(&self, path: &StoredVideoPath) -> GatewayResult<Vec<u8>> {
        let data: String = self
            .call_field("get_video_base64", json!({ "video_path": path }), "data")
            .await?;
        envelope::decode_base64(&data)
    }
}
