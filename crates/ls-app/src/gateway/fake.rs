//! Scripted in-memory gateway for tests.

use super::{
    BatchGenerationRequest, BatchResult, Gateway, GatewayError, GatewayResult,
    SingleGenerationRequest, SingleGenerationResult, UploadFile, require_text,
};
use async_trait::async_trait;
use ls_core::Provider;
use ls_core::avatar::Avatar;
use ls_core::credentials::{ConfigStatus, Credentials};
use ls_core::estimate::{CostBreakdown, Estimate};
use ls_core::ids::{
    AvatarId, JobId, ProjectId, StoredImagePath, StoredVideoPath, TagId,
};
use ls_core::job::{Job, JobStatus};
use ls_core::project::{NewProject, NewProjectVideo, Project, ProjectPatch, Tag};
use ls_core::script::{Batch, Preview, PreviewSummary, Script, ScriptId};
use ls_core::video::HistoryVideoEntry;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct FakeData {
    pub voices: HashMap<Provider, Vec<String>>,
    pub avatars: Vec<Avatar>,
    pub avatar_images: HashMap<AvatarId, Vec<u8>>,
    pub projects: Vec<Project>,
    pub tags: Vec<Tag>,
    pub jobs: Vec<Job>,
    pub history: Vec<HistoryVideoEntry>,
    pub config: ConfigStatus,
    pub upload_error: Option<GatewayError>,
    /// Upload answers with one path fewer than requested
    pub upload_drops_one: bool,
    pub single_error: Option<GatewayError>,
    pub failing_scripts: HashSet<ScriptId>,
    pub list_error: Option<GatewayError>,
}

#[derive(Default)]
pub(crate) struct FakeGateway {
    pub data: Mutex<FakeData>,
    pub calls: Mutex<Vec<String>>,
    pub single_requests: Mutex<Vec<SingleGenerationRequest>>,
    pub batch_requests: Mutex<Vec<BatchGenerationRequest>>,
    pub uploads: Mutex<Vec<Vec<String>>>,
}

impl FakeGateway {
    pub fn with(setup: impl FnOnce(&mut FakeData)) -> Self {
        let fake = Self::default();
        setup(&mut fake.data.lock().unwrap());
        fake
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == op).count()
    }

    fn record(&self, op: &str) {
        self.calls.lock().unwrap().push(op.to_string());
    }

    fn list_error(&self) -> GatewayResult<()> {
        match &self.data.lock().unwrap().list_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Same segmentation rules as the service: scripts split on `---`,
/// paragraphs on newlines, `batch_size` paragraphs per batch.
pub(crate) fn segment(text: &str, batch_size: u32) -> Vec<Script> {
    text.split("---")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .enumerate()
        .map(|(idx, script)| {
            let paragraphs: Vec<&str> = script
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect();
            let batches: Vec<Batch> = paragraphs
                .chunks(batch_size.max(1) as usize)
                .enumerate()
                .map(|(b_idx, chunk)| Batch {
                    batch_number: b_idx as u32 + 1,
                    text: chunk.join("\n\n"),
                    char_count: chunk.iter().map(|p| p.chars().count()).sum(),
                })
                .collect();
            Script {
                id: idx as ScriptId + 1,
                text: script.to_string(),
                batches,
                total_chars: script.chars().count(),
            }
        })
        .collect()
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn get_config_status(&self) -> GatewayResult<ConfigStatus> {
        self.record("get_config_status");
        Ok(self.data.lock().unwrap().config.clone())
    }

    async fn save_config(&self, credentials: &Credentials) -> GatewayResult<String> {
        self.record("save_config");
        let mut data = self.data.lock().unwrap();
        if let Some(key) = &credentials.elevenlabs_api_key {
            data.config.keys.insert("elevenlabs".into(), true);
            data.config.masked_keys.insert("elevenlabs".into(), Some(format!("{}****", &key[..2.min(key.len())])));
        }
        Ok("API keys saved".into())
    }

    async fn list_voices(&self, provider: Provider) -> GatewayResult<Vec<String>> {
        self.record("list_voices");
        Ok(self
            .data
            .lock()
            .unwrap()
            .voices
            .get(&provider)
            .cloned()
            .unwrap_or_default())
    }

    async fn estimate(&self, text: &str) -> GatewayResult<Estimate> {
        self.record("estimate");
        require_text(text)?;
        let scripts = segment(text, 1);
        Ok(Estimate {
            num_batches: scripts.iter().map(|s| s.batches.len()).sum(),
            num_videos: scripts.len(),
            num_chars: text.chars().count(),
            estimated_time: "~2 min".into(),
            estimated_cost: CostBreakdown {
                total: "$0.10".into(),
                ..Default::default()
            },
        })
    }

    async fn preview(&self, scripts_text: &str, batch_size: u32) -> GatewayResult<Preview> {
        self.record("preview");
        require_text(scripts_text)?;
        let scripts = segment(scripts_text, batch_size);
        Ok(Preview {
            summary: PreviewSummary {
                total_scripts: scripts.len(),
                total_batches: scripts.iter().map(|s| s.batches.len()).sum(),
                total_chars: scripts.iter().map(|s| s.total_chars).sum(),
            },
            scripts,
        })
    }

    async fn upload_images(&self, files: Vec<UploadFile>) -> GatewayResult<Vec<StoredImagePath>> {
        self.record("upload_images");
        self.uploads
            .lock()
            .unwrap()
            .push(files.iter().map(|f| f.name.clone()).collect());
        let data = self.data.lock().unwrap();
        if let Some(err) = &data.upload_error {
            return Err(err.clone());
        }
        let mut paths: Vec<StoredImagePath> = files
            .iter()
            .map(|f| StoredImagePath::new(format!("uploads/{}", f.name)))
            .collect();
        if data.upload_drops_one {
            paths.pop();
        }
        Ok(paths)
    }

    async fn generate_single(
        &self,
        request: SingleGenerationRequest,
    ) -> GatewayResult<SingleGenerationResult> {
        self.record("generate_single");
        self.single_requests.lock().unwrap().push(request);
        if let Some(err) = &self.data.lock().unwrap().single_error {
            return Err(err.clone());
        }
        Ok(SingleGenerationResult {
            video_path: StoredVideoPath::new("outputs/final_single.mp4"),
            job_id: Some("job_42".into()),
            duration: 12.5,
        })
    }

    async fn generate_batch(
        &self,
        request: BatchGenerationRequest,
    ) -> GatewayResult<Vec<BatchResult>> {
        self.record("generate_batch");
        let failing = self.data.lock().unwrap().failing_scripts.clone();
        let results = request
            .scripts
            .iter()
            .map(|script| {
                if failing.contains(&script.id) {
                    BatchResult {
                        script_id: script.id,
                        success: false,
                        video_path: None,
                        error: Some(format!("script {} failed", script.id)),
                        duration: None,
                    }
                } else {
                    BatchResult {
                        script_id: script.id,
                        success: true,
                        video_path: Some(StoredVideoPath::new(format!(
                            "outputs/script_{}.mp4",
                            script.id
                        ))),
                        error: None,
                        duration: Some(3.0),
                    }
                }
            })
            .collect();
        self.batch_requests.lock().unwrap().push(request);
        Ok(results)
    }

    async fn list_avatars(&self) -> GatewayResult<Vec<Avatar>> {
        self.record("list_avatars");
        self.list_error()?;
        Ok(self.data.lock().unwrap().avatars.clone())
    }

    async fn create_avatar(&self, name: &str, image: UploadFile) -> GatewayResult<Avatar> {
        self.record("create_avatar");
        let mut data = self.data.lock().unwrap();
        let id = AvatarId::new(format!("avatar_{}", data.avatars.len() + 1));
        let avatar = Avatar {
            id: id.clone(),
            name: name.to_string(),
            image_path: Some(StoredImagePath::new(format!("avatars/{}", image.name))),
            thumbnail_path: None,
            images: vec![],
            created_at: None,
        };
        data.avatar_images.insert(id, image.bytes);
        data.avatars.push(avatar.clone());
        Ok(avatar)
    }

    async fn delete_avatar(&self, id: &AvatarId) -> GatewayResult<()> {
        self.record("delete_avatar");
        let mut data = self.data.lock().unwrap();
        let before = data.avatars.len();
        data.avatars.retain(|a| &a.id != id);
        if data.avatars.len() == before {
            return Err(GatewayError::NotFound("Avatar não encontrado".into()));
        }
        Ok(())
    }

    async fn get_avatar_image(&self, id: &AvatarId) -> GatewayResult<Vec<u8>> {
        self.record("get_avatar_image");
        self.data
            .lock()
            .unwrap()
            .avatar_images
            .get(id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound("Imagem não encontrada".into()))
    }

    async fn list_projects(&self, tag: Option<&str>) -> GatewayResult<Vec<Project>> {
        self.record("list_projects");
        self.list_error()?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .projects
            .iter()
            .filter(|p| tag.is_none_or(|t| p.has_tag(t)))
            .cloned()
            .collect())
    }

    async fn get_project(&self, id: &ProjectId) -> GatewayResult<Project> {
        self.record("get_project");
        self.data
            .lock()
            .unwrap()
            .projects
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound("Projeto não encontrado".into()))
    }

    async fn create_project(&self, project: &NewProject) -> GatewayResult<Project> {
        self.record("create_project");
        let mut data = self.data.lock().unwrap();
        let created = Project {
            id: ProjectId::new(format!("proj_{}", data.projects.len() + 1)),
            name: project.name.clone(),
            description: Some(project.description.clone()),
            tags: project.tags.clone(),
            videos: vec![],
            created_at: None,
            updated_at: None,
        };
        data.projects.push(created.clone());
        Ok(created)
    }

    async fn update_project(
        &self,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> GatewayResult<Project> {
        self.record("update_project");
        let mut data = self.data.lock().unwrap();
        let project = data
            .projects
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| GatewayError::NotFound("Projeto não encontrado".into()))?;
        if let Some(name) = &patch.name {
            project.name = name.clone();
        }
        if let Some(description) = &patch.description {
            project.description = Some(description.clone());
        }
        if let Some(tags) = &patch.tags {
            project.tags = tags.clone();
        }
        Ok(project.clone())
    }

    async fn delete_project(&self, id: &ProjectId) -> GatewayResult<()> {
        self.record("delete_project");
        let mut data = self.data.lock().unwrap();
        let before = data.projects.len();
        data.projects.retain(|p| &p.id != id);
        if data.projects.len() == before {
            return Err(GatewayError::NotFound("Projeto não encontrado".into()));
        }
        Ok(())
    }

    async fn add_video_to_project(
        &self,
        id: &ProjectId,
        video: &NewProjectVideo,
    ) -> GatewayResult<()> {
        self.record("add_video_to_project");
        let mut data = self.data.lock().unwrap();
        let project = data
            .projects
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| GatewayError::NotFound("Projeto não encontrado".into()))?;
        project.videos.push(ls_core::project::ProjectVideo {
            id: None,
            path: video.path.clone(),
            name: video.name.clone(),
            duration: video.duration,
            created_at: None,
        });
        Ok(())
    }

    async fn list_tags(&self) -> GatewayResult<Vec<Tag>> {
        self.record("list_tags");
        self.list_error()?;
        Ok(self.data.lock().unwrap().tags.clone())
    }

    async fn create_tag(&self, name: &str, color: &str) -> GatewayResult<Tag> {
        self.record("create_tag");
        let mut data = self.data.lock().unwrap();
        let tag = Tag {
            id: TagId::new(format!("tag_{}", data.tags.len() + 1)),
            name: name.to_string(),
            color: color.to_string(),
        };
        data.tags.push(tag.clone());
        Ok(tag)
    }

    async fn delete_tag(&self, id: &TagId) -> GatewayResult<()> {
        self.record("delete_tag");
        let mut data = self.data.lock().unwrap();
        let before = data.tags.len();
        data.tags.retain(|t| &t.id != id);
        if data.tags.len() == before {
            return Err(GatewayError::NotFound("Tag não encontrada".into()));
        }
        Ok(())
    }

    async fn list_jobs(&self, status: Option<JobStatus>) -> GatewayResult<Vec<Job>> {
        self.record("list_jobs");
        self.list_error()?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .jobs
            .iter()
            .filter(|j| status.is_none_or(|s| j.status == s))
            .cloned()
            .collect())
    }

    async fn get_job(&self, id: &JobId) -> GatewayResult<Job> {
        self.record("get_job");
        self.data
            .lock()
            .unwrap()
            .jobs
            .iter()
            .find(|j| &j.id == id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound("Job não encontrado".into()))
    }

    async fn list_video_history(&self) -> GatewayResult<Vec<HistoryVideoEntry>> {
        self.record("list_video_history");
        self.list_error()?;
        Ok(self.data.lock().unwrap().history.clone())
    }

    async fn download_video(&self, path: &StoredVideoPath) -> GatewayResult<Vec<u8>> {
        self.record("download_video");
        if self
            .data
            .lock()
            .unwrap()
            .history
            .iter()
            .any(|h| &h.path == path)
        {
            Ok(b"\x00\x00\x00\x18ftypmp42".to_vec())
        } else {
            Err(GatewayError::NotFound("Vídeo não encontrado".into()))
        }
    }
}

pub(crate) fn avatar(id: &str, name: &str) -> Avatar {
    Avatar {
        id: AvatarId::new(id),
        name: name.to_string(),
        image_path: Some(StoredImagePath::new(format!("avatars/{id}.png"))),
        thumbnail_path: None,
        images: vec![],
        created_at: None,
    }
}

/// Smallest valid PNG: 1x1 transparent pixel
pub(crate) const PNG_1X1: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];
