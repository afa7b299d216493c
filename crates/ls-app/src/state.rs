//! Everything the user has picked or typed that the backend does not own yet,
//! plus read caches of backend lists.
//!
//! Every mutation returns a [`Redraw`] naming the views to re-render; the
//! store never renders on its own.

mod images;
mod redraw;
mod thumbnails;

pub use images::{ImageAsset, ImageId, LocalFile};
pub use redraw::{Context, Redraw, View};
pub use thumbnails::{Thumbnail, ThumbnailCache};

use crate::error::AppError;
use crate::gateway::BatchResult;
use crate::notifications::{Level, NoticeId, Notifications};
use crate::orchestrator::CorrelationId;
use chrono::{DateTime, Utc};
use ls_core::Provider;
use ls_core::avatar::Avatar;
use ls_core::credentials::ConfigStatus;
use ls_core::estimate::Estimate;
use ls_core::ids::{AvatarId, ProjectId, StoredVideoPath, TagId};
use ls_core::job::Job;
use ls_core::project::{Project, Tag};
use ls_core::script::{BatchImageMode, BatchKey, Preview, ScriptId};
use ls_core::video::HistoryVideoEntry;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageSource {
    #[default]
    Upload,
    Avatar,
}

/// Image assigned to one batch in individual mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchImage {
    /// Whatever the fixed image source of the context resolves to
    Shared,
    Avatar(AvatarId),
    Upload(ImageId),
}

/// Per-context selections
#[derive(Debug, Default)]
pub struct ContextState {
    images: Vec<ImageAsset>,
    image_source: ImageSource,
    selected_avatar: Option<AvatarId>,
    provider: Provider,
    voices: Vec<String>,
    estimate: Option<Estimate>,
}

impl ContextState {
    pub fn images(&self) -> &[ImageAsset] {
        &self.images
    }

    pub fn image(&self, id: ImageId) -> Option<&ImageAsset> {
        self.images.iter().find(|img| img.id == id)
    }

    pub fn image_source(&self) -> ImageSource {
        self.image_source
    }

    pub fn selected_avatar(&self) -> Option<&AvatarId> {
        self.selected_avatar.as_ref()
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn voices(&self) -> &[String] {
        &self.voices
    }

    pub fn estimate(&self) -> Option<&Estimate> {
        self.estimate.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingStatus {
    Processing,
    Failed(String),
}

/// Placeholder shown in the loading view while a generation is in flight
#[derive(Debug, Clone, PartialEq)]
pub struct PendingJob {
    pub correlation: CorrelationId,
    pub script_id: Option<ScriptId>,
    pub title: String,
    pub excerpt: String,
    pub status: PendingStatus,
    pub started_at: DateTime<Utc>,
}

impl PendingJob {
    fn matches(&self, correlation: CorrelationId, script_id: Option<ScriptId>) -> bool {
        self.correlation == correlation && self.script_id == script_id
    }
}

/// Finished generation as reported back to this client
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedEntry {
    pub correlation: CorrelationId,
    pub script_id: Option<ScriptId>,
    pub title: String,
    pub video_path: StoredVideoPath,
    pub duration: f64,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestructiveAction {
    DeleteAvatar(AvatarId),
    DeleteProject(ProjectId),
    DeleteTag(TagId),
}

#[derive(Debug)]
pub struct ViewState {
    max_images: usize,

    single: ContextState,
    multi: ContextState,

    single_text: String,
    single_voice: Option<String>,
    single_result: Option<CompletedEntry>,

    scripts_text: String,
    preview: Option<Preview>,
    voice_selections: Vec<Option<String>>,
    batch_image_mode: BatchImageMode,
    batch_images: BTreeMap<BatchKey, BatchImage>,
    batch_results: Vec<BatchResult>,

    avatars: Vec<Avatar>,
    projects: Vec<Project>,
    tags: Vec<Tag>,
    selected_tag: Option<String>,
    selected_project: Option<ProjectId>,

    jobs: Vec<Job>,
    pending: Vec<PendingJob>,
    completed: Vec<CompletedEntry>,
    history: Vec<HistoryVideoEntry>,

    config_status: Option<ConfigStatus>,
    notifications: Notifications,
    confirmation: Option<DestructiveAction>,
}

impl ViewState {
    pub fn new(max_images: usize, provider: Provider) -> Self {
        let context = |provider| ContextState {
            provider,
            ..Default::default()
        };
        Self {
            max_images,
            single: context(provider),
            multi: context(provider),
            single_text: String::new(),
            single_voice: None,
            single_result: None,
            scripts_text: String::new(),
            preview: None,
            voice_selections: Vec::new(),
            batch_image_mode: BatchImageMode::Fixed,
            batch_images: BTreeMap::new(),
            batch_results: Vec::new(),
            avatars: Vec::new(),
            projects: Vec::new(),
            tags: Vec::new(),
            selected_tag: None,
            selected_project: None,
            jobs: Vec::new(),
            pending: Vec::new(),
            completed: Vec::new(),
            history: Vec::new(),
            config_status: None,
            notifications: Notifications::default(),
            confirmation: None,
        }
    }

    pub fn context(&self, ctx: Context) -> &ContextState {
        match ctx {
            Context::Single => &self.single,
            Context::Multi => &self.multi,
        }
    }

    fn context_mut(&mut self, ctx: Context) -> &mut ContextState {
        match ctx {
            Context::Single => &mut self.single,
            Context::Multi => &mut self.multi,
        }
    }

    // ---- images ----

    /// All files are checked before any is added
    pub fn add_images(&mut self, ctx: Context, files: Vec<LocalFile>) -> Result<Redraw, AppError> {
        let current = self.context(ctx).images.len();
        if current + files.len() > self.max_images {
            return Err(AppError::validation(format!(
                "At most {} images per generation",
                self.max_images
            )));
        }
        let assets = files
            .into_iter()
            .map(ImageAsset::from_file)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(context = ctx.as_str(), count = assets.len(), "Images added");
        self.context_mut(ctx).images.extend(assets);
        Ok(Redraw::of([View::ImagePreviews(ctx)]).and(self.batch_redraw(ctx)))
    }

    pub fn remove_image(&mut self, ctx: Context, id: ImageId) -> Redraw {
        self.context_mut(ctx).images.retain(|img| img.id != id);
        let mut redraw = Redraw::of([View::ImagePreviews(ctx)]);
        if ctx == Context::Multi {
            let before = self.batch_images.len();
            self.batch_images
                .retain(|_, img| *img != BatchImage::Upload(id));
            if self.batch_images.len() != before {
                redraw.merge(Redraw::of([View::Preview]));
            }
        }
        redraw
    }

    pub fn set_image_source(&mut self, ctx: Context, source: ImageSource) -> Redraw {
        self.context_mut(ctx).image_source = source;
        Redraw::of([View::ImagePreviews(ctx), View::AvatarSelector(ctx)])
    }

    fn batch_redraw(&self, ctx: Context) -> Redraw {
        if ctx == Context::Multi && self.preview.is_some() {
            Redraw::of([View::Preview])
        } else {
            Redraw::none()
        }
    }

    // ---- avatars ----

    pub fn avatars(&self) -> &[Avatar] {
        &self.avatars
    }

    pub fn avatar(&self, id: &AvatarId) -> Option<&Avatar> {
        self.avatars.iter().find(|a| &a.id == id)
    }

    /// Replace the cache; selections pointing at vanished avatars are cleared
    pub fn replace_avatars(&mut self, avatars: Vec<Avatar>) -> Redraw {
        self.avatars = avatars;
        let mut redraw = Redraw::of([
            View::AvatarGallery,
            View::AvatarSelector(Context::Single),
            View::AvatarSelector(Context::Multi),
        ]);
        redraw.merge(self.purge_stale_avatar_refs());
        redraw
    }

    pub fn select_avatar(&mut self, ctx: Context, id: Option<AvatarId>) -> Result<Redraw, AppError> {
        if let Some(id) = &id {
            if self.avatar(id).is_none() {
                return Err(AppError::validation(format!("Avatar {id} no longer exists")));
            }
        }
        self.context_mut(ctx).selected_avatar = id;
        Ok(Redraw::of([View::AvatarSelector(ctx)]))
    }

    /// Drop one avatar from the cache along with every reference to it
    pub fn remove_avatar(&mut self, id: &AvatarId) -> Redraw {
        self.avatars.retain(|a| &a.id != id);
        Redraw::of([
            View::AvatarGallery,
            View::AvatarSelector(Context::Single),
            View::AvatarSelector(Context::Multi),
        ])
        .and(self.purge_stale_avatar_refs())
    }

    fn purge_stale_avatar_refs(&mut self) -> Redraw {
        let avatars = &self.avatars;
        let known = |id: &AvatarId| avatars.iter().any(|a| &a.id == id);

        for ctx in [&mut self.single, &mut self.multi] {
            if ctx.selected_avatar.as_ref().is_some_and(|id| !known(id)) {
                debug!(avatar_id = ?ctx.selected_avatar, "Clearing stale avatar selection");
                ctx.selected_avatar = None;
            }
        }

        let before = self.batch_images.len();
        self.batch_images.retain(|_, img| match img {
            BatchImage::Avatar(id) => known(id),
            _ => true,
        });
        if self.batch_images.len() != before {
            Redraw::of([View::Preview])
        } else {
            Redraw::none()
        }
    }

    // ---- voices and provider ----

    /// Switching provider invalidates the voice list of that context
    pub fn set_provider(&mut self, ctx: Context, provider: Provider) -> Redraw {
        let state = self.context_mut(ctx);
        if state.provider == provider {
            return Redraw::none();
        }
        state.provider = provider;
        state.voices.clear();
        Redraw::of([View::Voices(ctx)])
    }

    /// New voice list; selections not offered any more fall back to the first voice
    pub fn set_voices(&mut self, ctx: Context, voices: Vec<String>) -> Redraw {
        let first = voices.first().cloned();
        let offered = |v: &Option<String>| v.as_ref().is_some_and(|v| voices.contains(v));
        match ctx {
            Context::Single => {
                if !offered(&self.single_voice) {
                    self.single_voice = first;
                }
            }
            Context::Multi => {
                for selection in &mut self.voice_selections {
                    if !offered(selection) {
                        *selection = first.clone();
                    }
                }
            }
        }
        self.context_mut(ctx).voices = voices;
        let mut redraw = Redraw::of([View::Voices(ctx)]);
        if ctx == Context::Multi {
            redraw.merge(self.batch_redraw(ctx));
        }
        redraw
    }

    pub fn single_voice(&self) -> Option<&str> {
        self.single_voice.as_deref()
    }

    pub fn set_single_voice(&mut self, voice: Option<String>) -> Redraw {
        self.single_voice = voice;
        Redraw::of([View::Voices(Context::Single)])
    }

    pub fn voice_selections(&self) -> &[Option<String>] {
        &self.voice_selections
    }

    pub fn set_voice(&mut self, script_index: usize, voice: String) -> Result<Redraw, AppError> {
        let slot = self
            .voice_selections
            .get_mut(script_index)
            .ok_or_else(|| AppError::validation(format!("No script #{}", script_index + 1)))?;
        *slot = Some(voice);
        Ok(Redraw::of([View::Preview]))
    }

    // ---- text ----

    pub fn single_text(&self) -> &str {
        &self.single_text
    }

    pub fn set_single_text(&mut self, text: String) -> Redraw {
        self.single_text = text;
        Redraw::of([View::SingleForm])
    }

    pub fn scripts_text(&self) -> &str {
        &self.scripts_text
    }

    pub fn set_scripts_text(&mut self, text: String) -> Redraw {
        self.scripts_text = text;
        Redraw::none()
    }

    pub fn set_estimate(&mut self, ctx: Context, estimate: Option<Estimate>) -> Redraw {
        self.context_mut(ctx).estimate = estimate;
        Redraw::of([View::Estimate])
    }

    // ---- preview and batch images ----

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    /// Replace the preview wholesale: voices default to the first available
    /// one and every batch assignment is dropped.
    pub fn replace_preview(&mut self, preview: Preview, voices: Vec<String>) -> Redraw {
        let first = voices.first().cloned();
        self.voice_selections = vec![first; preview.scripts.len()];
        self.batch_images.clear();
        self.batch_results.clear();
        self.multi.voices = voices;
        self.preview = Some(preview);
        Redraw::of([
            View::Preview,
            View::Voices(Context::Multi),
            View::BatchResults,
        ])
    }

    pub fn batch_image_mode(&self) -> BatchImageMode {
        self.batch_image_mode
    }

    pub fn set_batch_image_mode(&mut self, mode: BatchImageMode) -> Redraw {
        self.batch_image_mode = mode;
        Redraw::of([View::Preview])
    }

    pub fn batch_images(&self) -> &BTreeMap<BatchKey, BatchImage> {
        &self.batch_images
    }

    pub fn batch_image(&self, key: BatchKey) -> Option<&BatchImage> {
        self.batch_images.get(&key)
    }

    /// Only keys of the current preview and images that still exist are accepted
    pub fn assign_batch_image(&mut self, key: BatchKey, image: BatchImage) -> Result<Redraw, AppError> {
        let known_key = self
            .preview
            .as_ref()
            .is_some_and(|p| p.batch_keys().any(|k| k == key));
        if !known_key {
            return Err(AppError::validation(format!("Batch {key} is not in the preview")));
        }
        match &image {
            BatchImage::Avatar(id) if self.avatar(id).is_none() => {
                return Err(AppError::validation(format!("Avatar {id} no longer exists")));
            }
            BatchImage::Upload(id) if self.multi.image(*id).is_none() => {
                return Err(AppError::validation("Image was removed"));
            }
            _ => {}
        }
        self.batch_images.insert(key, image);
        Ok(Redraw::of([View::Preview]))
    }

    pub fn clear_batch_image(&mut self, key: BatchKey) -> Redraw {
        self.batch_images.remove(&key);
        Redraw::of([View::Preview])
    }

    pub fn batch_results(&self) -> &[BatchResult] {
        &self.batch_results
    }

    pub fn set_batch_results(&mut self, results: Vec<BatchResult>) -> Redraw {
        self.batch_results = results;
        Redraw::of([View::BatchResults])
    }

    pub fn single_result(&self) -> Option<&CompletedEntry> {
        self.single_result.as_ref()
    }

    pub fn set_single_result(&mut self, entry: Option<CompletedEntry>) -> Redraw {
        self.single_result = entry;
        Redraw::of([View::SingleResult])
    }

    // ---- jobs timeline ----

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn replace_jobs(&mut self, jobs: Vec<Job>) -> Redraw {
        self.jobs = jobs;
        Redraw::of([View::Jobs])
    }

    pub fn pending(&self) -> &[PendingJob] {
        &self.pending
    }

    pub fn completed(&self) -> &[CompletedEntry] {
        &self.completed
    }

    pub fn insert_pending(&mut self, jobs: Vec<PendingJob>) -> Redraw {
        self.pending.extend(jobs);
        Redraw::of([View::Jobs])
    }

    /// Swap a placeholder for its completed entry; false if no such placeholder
    pub fn complete_pending(&mut self, entry: CompletedEntry) -> bool {
        let before = self.pending.len();
        self.pending
            .retain(|p| !p.matches(entry.correlation, entry.script_id));
        if self.pending.len() == before {
            return false;
        }
        self.completed.insert(0, entry);
        true
    }

    pub fn fail_pending(
        &mut self,
        correlation: CorrelationId,
        script_id: Option<ScriptId>,
        error: &str,
    ) -> bool {
        match self
            .pending
            .iter_mut()
            .find(|p| p.matches(correlation, script_id))
        {
            Some(job) => {
                job.status = PendingStatus::Failed(error.to_string());
                true
            }
            None => false,
        }
    }

    /// Drop failed placeholders
    pub fn clear_failed(&mut self) -> Redraw {
        self.pending
            .retain(|p| p.status == PendingStatus::Processing);
        Redraw::of([View::Jobs])
    }

    // ---- history ----

    pub fn history(&self) -> &[HistoryVideoEntry] {
        &self.history
    }

    pub fn replace_history(&mut self, mut history: Vec<HistoryVideoEntry>) -> Redraw {
        history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.history = history;
        Redraw::of([View::History])
    }

    // ---- projects and tags ----

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn replace_projects(&mut self, projects: Vec<Project>) -> Redraw {
        if let Some(selected) = &self.selected_project {
            if !projects.iter().any(|p| &p.id == selected) {
                self.selected_project = None;
            }
        }
        self.projects = projects;
        Redraw::of([View::Projects, View::SidebarProjects])
    }

    /// Insert or replace one project, e.g. after an edit or a detail fetch
    pub fn upsert_project(&mut self, project: Project) -> Redraw {
        match self.projects.iter_mut().find(|p| p.id == project.id) {
            Some(existing) => *existing = project,
            None => self.projects.push(project),
        }
        Redraw::of([View::Projects, View::SidebarProjects])
    }

    pub fn selected_project(&self) -> Option<&ProjectId> {
        self.selected_project.as_ref()
    }

    pub fn select_project(&mut self, id: Option<ProjectId>) -> Redraw {
        self.selected_project = id;
        Redraw::of([View::Projects, View::SidebarProjects])
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn replace_tags(&mut self, tags: Vec<Tag>) -> Redraw {
        if let Some(selected) = &self.selected_tag {
            if !tags.iter().any(|t| &t.name == selected) {
                self.selected_tag = None;
            }
        }
        self.tags = tags;
        Redraw::of([View::Tags])
    }

    pub fn selected_tag(&self) -> Option<&str> {
        self.selected_tag.as_deref()
    }

    pub fn set_selected_tag(&mut self, tag: Option<String>) -> Redraw {
        self.selected_tag = tag;
        Redraw::of([View::Tags, View::Projects])
    }

    // ---- config, notices, confirmation ----

    pub fn config_status(&self) -> Option<&ConfigStatus> {
        self.config_status.as_ref()
    }

    pub fn set_config_status(&mut self, status: ConfigStatus) -> Redraw {
        self.config_status = Some(status);
        Redraw::of([View::ConfigStatus])
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notify(&mut self, level: Level, message: impl Into<String>) -> (NoticeId, Redraw) {
        let id = self.notifications.push(level, message);
        (id, Redraw::of([View::Notifications]))
    }

    pub fn dismiss_notice(&mut self, id: NoticeId) -> Redraw {
        if self.notifications.dismiss(id) {
            Redraw::of([View::Notifications])
        } else {
            Redraw::none()
        }
    }

    pub fn confirmation(&self) -> Option<&DestructiveAction> {
        self.confirmation.as_ref()
    }

    pub fn request_confirmation(&mut self, action: DestructiveAction) -> Redraw {
        self.confirmation = Some(action);
        Redraw::of([View::Confirmation])
    }

    pub fn take_confirmation(&mut self) -> (Option<DestructiveAction>, Redraw) {
        (self.confirmation.take(), Redraw::of([View::Confirmation]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::fake::{PNG_1X1, avatar, segment};
    use ls_core::script::PreviewSummary;

    fn state() -> ViewState {
        ViewState::new(3, Provider::ElevenLabs)
    }

    fn png(name: &str) -> LocalFile {
        LocalFile::new(name, PNG_1X1.to_vec())
    }

    fn preview(text: &str) -> Preview {
        Preview {
            scripts: segment(text, 1),
            summary: PreviewSummary::default(),
        }
        .validated()
        .unwrap()
    }

    #[test]
    fn image_limit_is_per_context() {
        let mut s = state();
        let _ = s
            .add_images(Context::Single, vec![png("a.png"), png("b.png")])
            .unwrap();
        let err = s
            .add_images(Context::Single, vec![png("c.png"), png("d.png")])
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(s.context(Context::Single).images().len(), 2);

        let _ = s.add_images(Context::Multi, vec![png("c.png")]).unwrap();
        assert_eq!(s.context(Context::Multi).images().len(), 1);
    }

    #[test]
    fn one_bad_file_adds_nothing() {
        let mut s = state();
        let err = s
            .add_images(
                Context::Single,
                vec![png("a.png"), LocalFile::new("x.txt", b"plain".to_vec())],
            )
            .unwrap_err();
        assert!(matches!(err, AppError::Upload(_)));
        assert!(s.context(Context::Single).images().is_empty());
    }

    #[test]
    fn removing_selected_avatar_cascades() {
        let mut s = state();
        let _ = s.replace_avatars(vec![avatar("avatar_1", "Ana"), avatar("avatar_2", "Bia")]);
        let _ = s.replace_preview(preview("One\nTwo"), vec!["Rachel".into()]);
        let gone = AvatarId::new("avatar_1");
        let kept = AvatarId::new("avatar_2");
        let _ = s.select_avatar(Context::Single, Some(gone.clone())).unwrap();
        let _ = s.select_avatar(Context::Multi, Some(gone.clone())).unwrap();
        let _ = s
            .assign_batch_image(BatchKey::new(1, 1), BatchImage::Avatar(gone.clone()))
            .unwrap();
        let _ = s
            .assign_batch_image(BatchKey::new(1, 2), BatchImage::Avatar(kept.clone()))
            .unwrap();

        let redraw = s.remove_avatar(&gone);

        assert!(s.context(Context::Single).selected_avatar().is_none());
        assert!(s.context(Context::Multi).selected_avatar().is_none());
        assert!(s.batch_image(BatchKey::new(1, 1)).is_none());
        assert_eq!(s.batch_image(BatchKey::new(1, 2)), Some(&BatchImage::Avatar(kept)));
        assert!(redraw.contains(View::AvatarGallery));
        assert!(redraw.contains(View::AvatarSelector(Context::Single)));
        assert!(redraw.contains(View::Preview));
    }

    #[test]
    fn refreshed_avatar_list_purges_stale_selection() {
        let mut s = state();
        let _ = s.replace_avatars(vec![avatar("avatar_1", "Ana")]);
        let _ = s
            .select_avatar(Context::Single, Some(AvatarId::new("avatar_1")))
            .unwrap();
        let _ = s.replace_avatars(vec![avatar("avatar_9", "Zoe")]);
        assert!(s.context(Context::Single).selected_avatar().is_none());
    }

    #[test]
    fn selecting_unknown_avatar_is_refused() {
        let mut s = state();
        assert!(s
            .select_avatar(Context::Single, Some(AvatarId::new("nope")))
            .is_err());
    }

    #[test]
    fn new_preview_resets_voices_and_assignments() {
        let mut s = state();
        let _ = s.replace_preview(preview("A\nB\n---\nC"), vec!["Rachel".into(), "Adam".into()]);
        assert_eq!(
            s.voice_selections(),
            &[Some("Rachel".to_string()), Some("Rachel".to_string())]
        );
        let _ = s.set_voice(1, "Adam".into()).unwrap();
        let _ = s
            .assign_batch_image(BatchKey::new(1, 2), BatchImage::Shared)
            .unwrap();

        let _ = s.replace_preview(preview("X"), vec!["Rachel".into()]);
        assert_eq!(s.voice_selections(), &[Some("Rachel".to_string())]);
        assert!(s.batch_images().is_empty());
    }

    #[test]
    fn no_voices_leaves_selection_unset() {
        let mut s = state();
        let _ = s.replace_preview(preview("A"), vec![]);
        assert_eq!(s.voice_selections(), &[None]);
    }

    #[test]
    fn assignment_needs_a_known_key() {
        let mut s = state();
        let _ = s.replace_preview(preview("A"), vec![]);
        assert!(s
            .assign_batch_image(BatchKey::new(1, 5), BatchImage::Shared)
            .is_err());
        assert!(s
            .assign_batch_image(BatchKey::new(1, 1), BatchImage::Upload(ImageId::new()))
            .is_err());
    }

    #[test]
    fn removing_upload_clears_its_assignments() {
        let mut s = state();
        let _ = s.replace_preview(preview("A"), vec![]);
        let _ = s.add_images(Context::Multi, vec![png("a.png")]).unwrap();
        let id = s.context(Context::Multi).images()[0].id;
        let _ = s
            .assign_batch_image(BatchKey::new(1, 1), BatchImage::Upload(id))
            .unwrap();
        let redraw = s.remove_image(Context::Multi, id);
        assert!(s.batch_images().is_empty());
        assert!(redraw.contains(View::Preview));
    }

    #[test]
    fn voice_list_change_keeps_valid_selection() {
        let mut s = state();
        let _ = s.set_voices(Context::Single, vec!["Rachel".into(), "Adam".into()]);
        assert_eq!(s.single_voice(), Some("Rachel"));
        let _ = s.set_single_voice(Some("Adam".into()));
        let _ = s.set_voices(Context::Single, vec!["Adam".into(), "Bella".into()]);
        assert_eq!(s.single_voice(), Some("Adam"));
        let _ = s.set_voices(Context::Single, vec![]);
        assert_eq!(s.single_voice(), None);
    }

    #[test]
    fn provider_switch_clears_voices() {
        let mut s = state();
        let _ = s.set_voices(Context::Multi, vec!["Rachel".into()]);
        assert!(s.set_provider(Context::Multi, Provider::ElevenLabs).is_empty());
        let redraw = s.set_provider(Context::Multi, Provider::MiniMax);
        assert!(redraw.contains(View::Voices(Context::Multi)));
        assert!(s.context(Context::Multi).voices().is_empty());
    }
}
