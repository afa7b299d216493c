use super::envelope;
use super::schemas::{PreviewRequest, TagRequest, TextRequest};
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
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Talks to the REST service under `{base_url}/api`
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// Send and open the JSON envelope
    async fn call(&self, op: &str, request: RequestBuilder) -> GatewayResult<Value> {
        debug!(op, "Gateway call");
        let response = request.send().await.map_err(|err| {
            warn!(op, error = %err, "Request failed");
            GatewayError::Transport(err.to_string())
        })?;

        let status = response.status();
        let body = match response.json::<Value>().await {
            Ok(body) => body,
            Err(_) if status == StatusCode::NOT_FOUND => {
                return Err(GatewayError::NotFound(status.to_string()));
            }
            Err(_) if !status.is_success() => {
                return Err(GatewayError::Transport(format!("HTTP {status}")));
            }
            Err(err) => return Err(GatewayError::Malformed(err.to_string())),
        };

        envelope::open(body, Some(status.as_u16())).inspect_err(|err| {
            warn!(op, %status, error = %err, "Service refused request");
        })
    }

    /// Raw bytes, with the JSON envelope only on failure
    async fn fetch_bytes(&self, op: &str, request: RequestBuilder) -> GatewayResult<Vec<u8>> {
        debug!(op, "Gateway call");
        let response = request
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let bytes = response
                .bytes()
                .await
                .map_err(|err| GatewayError::Transport(err.to_string()))?;
            return Ok(bytes.to_vec());
        }

        let message = match response.json::<Value>().await {
            Ok(body) => body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("request failed")
                .to_string(),
            Err(_) => format!("HTTP {status}"),
        };
        warn!(op, %status, error = %message, "Download failed");
        if status == StatusCode::NOT_FOUND {
            Err(GatewayError::NotFound(message))
        } else {
            Err(GatewayError::Rejected(message))
        }
    }
}

fn file_part(file: UploadFile) -> GatewayResult<Part> {
    Part::bytes(file.bytes)
        .file_name(file.name)
        .mime_str(&file.mime)
        .map_err(|err| GatewayError::Transport(err.to_string()))
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn get_config_status(&self) -> GatewayResult<ConfigStatus> {
        let body = self
            .call("get_config_status", self.client.get(self.url("/config/keys")))
            .await?;
        envelope::whole(body)
    }

    async fn save_config(&self, credentials: &Credentials) -> GatewayResult<String> {
        let mut body = self
            .call(
                "save_config",
                self.client.post(self.url("/config/keys")).json(credentials),
            )
            .await?;
        Ok(envelope::field(&mut body, "message").unwrap_or_default())
    }

    async fn list_voices(&self, provider: Provider) -> GatewayResult<Vec<String>> {
        let result = async {
            let url = self.url(&format!("/voices/{}", provider.id()));
            let mut body = self.call("list_voices", self.client.get(url)).await?;
            envelope::field(&mut body, "voices")
        }
        .await;
        voices_or_empty(result, provider)
    }

    async fn estimate(&self, text: &str) -> GatewayResult<Estimate> {
        require_text(text)?;
        let mut body = self
            .call(
                "estimate",
                self.client.post(self.url("/estimate")).json(&TextRequest { text }),
            )
            .await?;
        envelope::field(&mut body, "estimate")
    }

    async fn preview(&self, scripts_text: &str, batch_size: u32) -> GatewayResult<Preview> {
        require_text(scripts_text)?;
        let request = PreviewRequest {
            scripts_text,
            batch_size,
        };
        let body = self
            .call("preview", self.client.post(self.url("/preview")).json(&request))
            .await?;
        envelope::whole(body)
    }

    async fn upload_images(&self, files: Vec<UploadFile>) -> GatewayResult<Vec<StoredImagePath>> {
        let mut form = Form::new();
        for file in files {
            form = form.part("images", file_part(file)?);
        }
        let mut body = self
            .call(
                "upload_images",
                self.client.post(self.url("/upload/images")).multipart(form),
            )
            .await?;
        envelope::field(&mut body, "paths")
    }

    async fn generate_single(
        &self,
        request: SingleGenerationRequest,
    ) -> GatewayResult<SingleGenerationResult> {
        let body = self
            .call(
                "generate_single",
                self.client.post(self.url("/generate/single")).json(&request),
            )
            .await?;
        envelope::whole(body)
    }

    async fn generate_batch(
        &self,
        request: BatchGenerationRequest,
    ) -> GatewayResult<Vec<BatchResult>> {
        let mut body = self
            .call(
                "generate_batch",
                self.client.post(self.url("/generate/batch")).json(&request),
            )
            .await?;
        envelope::field(&mut body, "results")
    }

    async fn list_avatars(&self) -> GatewayResult<Vec<Avatar>> {
        let mut body = self
            .call("list_avatars", self.client.get(self.url("/avatars")))
            .await?;
        envelope::field(&mut body, "avatars")
    }

    async fn create_avatar(&self, name: &str, image: UploadFile) -> GatewayResult<Avatar> {
        let form = Form::new()
            .text("name", name.to_string())
            .part("image", file_part(image)?);
        let mut body = self
            .call(
                "create_avatar",
                self.client.post(self.url("/avatars")).multipart(form),
            )
            .await?;
        envelope::field(&mut body, "avatar")
    }

    async fn delete_avatar(&self, id: &AvatarId) -> GatewayResult<()> {
        let url = self.url(&format!("/avatars/{id}"));
        self.call("delete_avatar", self.client.delete(url)).await?;
        Ok(())
    }

    async fn get_avatar_image(&self, id: &AvatarId) -> GatewayResult<Vec<u8>> {
        let url = self.url(&format!("/avatars/{id}/image"));
        self.fetch_bytes("get_avatar_image", self.client.get(url))
            .await
    }

    async fn list_projects(&self, tag: Option<&str>) -> GatewayResult<Vec<Project>> {
        let mut request = self.client.get(self.url("/projects"));
        if let Some(tag) = tag {
            request = request.query(&[("tag", tag)]);
        }
        let mut body = self.call("list_projects", request).await?;
        envelope::field(&mut body, "projects")
    }

    async fn get_project(&self, id: &ProjectId) -> GatewayResult<Project> {
        let url = self.url(&format!("/projects/{id}"));
        let mut body = self.call("get_project", self.client.get(url)).await?;
        envelope::field(&mut body, "project")
    }

    async fn create_project(&self, project: &NewProject) -> GatewayResult<Project> {
        let mut body = self
            .call(
                "create_project",
                self.client.post(self.url("/projects")).json(project),
            )
            .await?;
        envelope::field(&mut body, "project")
    }

    async fn update_project(
        &self,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> GatewayResult<Project> {
        let url = self.url(&format!("/projects/{id}"));
        let mut body = self
            .call("update_project", self.client.put(url).json(patch))
            .await?;
        envelope::field(&mut body, "project")
    }

    async fn delete_project(&self, id: &ProjectId) -> GatewayResult<()> {
        let url = self.url(&format!("/projects/{id}"));
        self.call("delete_project", self.client.delete(url)).await?;
        Ok(())
    }

    async fn add_video_to_project(
        &self,
        id: &ProjectId,
        video: &NewProjectVideo,
    ) -> GatewayResult<()> {
        let url = self.url(&format!("/projects/{id}/videos"));
        self.call("add_video_to_project", self.client.post(url).json(video))
            .await?;
        Ok(())
    }

    async fn list_tags(&self) -> GatewayResult<Vec<Tag>> {
        let mut body = self
            .call("list_tags", self.client.get(self.url("/tags")))
            .await?;
        envelope::field(&mut body, "tags")
    }

    async fn create_tag(&self, name: &str, color: &str) -> GatewayResult<Tag> {
        let mut body = self
            .call(
                "create_tag",
                self.client
                    .post(self.url("/tags"))
                    .json(&TagRequest { name, color }),
            )
            .await?;
        envelope::field(&mut body, "tag")
    }

    async fn delete_tag(&self, id: &TagId) -> GatewayResult<()> {
        let url = self.url(&format!("/tags/{id}"));
        self.call("delete_tag", self.client.delete(url)).await?;
        Ok(())
    }

    async fn list_jobs(&self, status: Option<JobStatus>) -> GatewayResult<Vec<Job>> {
        let mut request = self.client.get(self.url("/jobs"));
        if let Some(status) = status {
            request = request.query(&[("status", status.as_str())]);
        }
        let mut body = self.call("list_jobs", request).await?;
        envelope::field(&mut body, "jobs")
    }

    async fn get_job(&self, id: &JobId) -> GatewayResult<Job> {
        let url = self.url(&format!("/jobs/{id}"));
        let mut body = self.call("get_job", self.client.get(url)).await?;
        envelope::field(&mut body, "job")
    }

    async fn list_video_history(&self) -> GatewayResult<Vec<HistoryVideoEntry>> {
        let mut body = self
            .call("list_video_history", self.client.get(self.url("/videos/history")))
            .await?;
        envelope::field(&mut body, "videos")
    }

    async fn download_video(&self, path: &StoredVideoPath) -> GatewayResult<Vec<u8>> {
        // The whole stored path travels as one encoded segment
        let mut url = Url::parse(&self.url("/download"))
            .map_err(|err| GatewayError::Transport(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| GatewayError::Transport(format!("cannot address {}", self.base_url)))?
            .push(path.as_str());
        self.fetch_bytes("download_video", self.client.get(url))
            .await
    }
}
