//! Event dispatch: every [`LsEvent`] goes through [`App::handle`], which
//! mutates the owned state and returns the [`Effect`]s to run next.

use crate::config::ClientConfig;
use crate::error::AppError;
use crate::events::{AppEvent, GenEvent, LsEvent};
use crate::gateway::{Gateway, GatewayError, GatewayResult};
use crate::notifications::Level;
use crate::orchestrator::{
    GenerationCall, GenerationSettings, Orchestrator, Reconciled, Started, Submission,
};
use crate::pipeline;
use crate::router::{Polling, Refresh, Tab, TabRouter, Transition};
use crate::runtime::Effect;
use crate::sequence::{RequestSequencer, Target, Ticket};
use crate::state::{
    Context, DestructiveAction, ImageAsset, ImageSource, Redraw, ThumbnailCache, View, ViewState,
};
use crate::ui::{Page, UiContext, UiEvent, dom_id, render_view};
use chrono::Utc;
use ls_core::project::DEFAULT_TAG_COLOR;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Video fetched for the user to keep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub struct App {
    gateway: Arc<dyn Gateway>,
    config: ClientConfig,
    page: Page,

    state: ViewState,
    router: TabRouter,
    sequencer: RequestSequencer,
    orchestrator: Orchestrator,
    thumbnails: ThumbnailCache,

    dirty: Redraw,
    downloads: Vec<Download>,
}

impl App {
    pub fn new(gateway: Arc<dyn Gateway>, config: ClientConfig) -> Self {
        let orchestrator = Orchestrator::new(GenerationSettings {
            model_id: config.model_id.clone(),
            workers: config.workers,
        });
        Self {
            gateway,
            state: ViewState::new(config.max_images, config.provider),
            config,
            page: Page::default(),
            router: TabRouter::default(),
            sequencer: RequestSequencer::default(),
            orchestrator,
            thumbnails: ThumbnailCache::default(),
            dirty: Redraw::none(),
            downloads: Vec::new(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn router(&self) -> &TabRouter {
        &self.router
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Initial reads: credentials status, voices of both contexts and every list
    pub fn bootstrap(&mut self) -> Vec<Effect> {
        info!(provider = %self.config.provider, "Bootstrapping");
        let mut effects = vec![
            self.load_config_status(),
            self.load_voices(Context::Single),
            self.load_voices(Context::Multi),
        ];
        for refresh in [Refresh::Avatars, Refresh::Projects, Refresh::History, Refresh::Jobs] {
            effects.extend(self.refresh(refresh));
        }
        effects
    }

    pub fn handle(&mut self, event: LsEvent) -> Vec<Effect> {
        match event {
            LsEvent::Ui(e) => self.on_ui_event(e),
            LsEvent::App(e) => self.on_app_event(e),
            LsEvent::Gen(e) => self.on_gen_event(e),
        }
    }

    /// Handle `event` and run every gateway task it leads to, in order, until
    /// none is left. Polling and timer effects are returned instead of run.
    pub async fn settle(&mut self, event: impl Into<LsEvent>) -> Vec<Effect> {
        let effects = self.handle(event.into());
        self.settle_effects(effects).await
    }

    pub async fn settle_effects(&mut self, effects: Vec<Effect>) -> Vec<Effect> {
        let mut pending: VecDeque<Effect> = effects.into();
        let mut deferred = Vec::new();
        while let Some(effect) = pending.pop_front() {
            match effect {
                Effect::Task(task) => {
                    let event = task.await;
                    pending.extend(self.handle(event));
                }
                other => deferred.push(other),
            }
        }
        deferred
    }

    /// Whole page for the active tab
    pub fn render(&self) -> String {
        self.page.render(&self.ui_context())
    }

    /// Views changed since the last call, rendered as `(dom id, html)`
    pub fn take_patches(&mut self) -> Vec<(String, String)> {
        let dirty = self.take_redraw();
        let ui = self.ui_context();
        dirty
            .views()
            .map(|view| (dom_id(view), render_view(view, &ui).render()))
            .collect()
    }

    pub fn take_redraw(&mut self) -> Redraw {
        std::mem::replace(&mut self.dirty, Redraw::none())
    }

    pub fn take_downloads(&mut self) -> Vec<Download> {
        std::mem::take(&mut self.downloads)
    }

    fn ui_context(&self) -> UiContext<'_> {
        UiContext {
            state: &self.state,
            thumbnails: &self.thumbnails,
            active_tab: self.router.active(),
            now: Utc::now(),
        }
    }

    fn redraw(&mut self, redraw: Redraw) {
        self.dirty.merge(redraw);
    }

    /// Gateway call run off the event loop; its outcome comes back as an event
    fn spawn<F, Fut, E>(&self, call: F) -> Effect
    where
        F: FnOnce(Arc<dyn Gateway>) -> Fut,
        Fut: Future<Output = E> + Send + 'static,
        E: Into<LsEvent>,
    {
        let task = call(self.gateway.clone());
        Effect::task(async move {
            let event: LsEvent = task.await.into();
            event
        })
    }

    /// Post a notice; the returned effect expires it
    fn notify(&mut self, level: Level, message: impl Into<String>) -> Effect {
        let (id, redraw) = self.state.notify(level, message);
        self.redraw(redraw);
        Effect::After(self.config.notice_ttl, AppEvent::NoticeExpired(id).into())
    }

    fn report(&mut self, err: AppError) -> Vec<Effect> {
        warn!(error = %err, "Reporting error");
        vec![self.notify(Level::Error, err.to_string())]
    }

    fn apply_redraw(&mut self, result: Result<Redraw, AppError>) -> Vec<Effect> {
        match result {
            Ok(redraw) => {
                self.redraw(redraw);
                Vec::new()
            }
            Err(err) => self.report(err),
        }
    }

    // ---- reads ----

    fn load_config_status(&mut self) -> Effect {
        let ticket = self.sequencer.issue(Target::ConfigStatus);
        self.spawn(move |gw| async move {
            AppEvent::ConfigStatusLoaded(ticket, gw.get_config_status().await)
        })
    }

    fn load_voices(&mut self, ctx: Context) -> Effect {
        let ticket = self.sequencer.issue(Target::Voices(ctx));
        let provider = self.state.context(ctx).provider();
        debug!(context = ctx.as_str(), %provider, "Loading voices");
        self.spawn(move |gw| async move {
            let result = gw.list_voices(provider).await;
            AppEvent::VoicesLoaded {
                ticket,
                ctx,
                provider,
                result,
            }
        })
    }

    fn load_projects(&mut self) -> Effect {
        let ticket = self.sequencer.issue(Target::Projects);
        let tag = self.state.selected_tag().map(str::to_owned);
        self.spawn(move |gw| async move {
            AppEvent::ProjectsLoaded(ticket, gw.list_projects(tag.as_deref()).await)
        })
    }

    fn load_tags(&mut self) -> Effect {
        let ticket = self.sequencer.issue(Target::Tags);
        self.spawn(move |gw| async move { AppEvent::TagsLoaded(ticket, gw.list_tags().await) })
    }

    fn refresh(&mut self, refresh: Refresh) -> Vec<Effect> {
        match refresh {
            Refresh::Jobs => {
                let ticket = self.sequencer.issue(Target::Jobs);
                vec![self.spawn(move |gw| async move {
                    AppEvent::JobsLoaded(ticket, gw.list_jobs(None).await)
                })]
            }
            Refresh::History => {
                let ticket = self.sequencer.issue(Target::History);
                vec![self.spawn(move |gw| async move {
                    AppEvent::HistoryLoaded(ticket, gw.list_video_history().await)
                })]
            }
            Refresh::Avatars => {
                let ticket = self.sequencer.issue(Target::Avatars);
                vec![self.spawn(move |gw| async move {
                    AppEvent::AvatarsLoaded(ticket, gw.list_avatars().await)
                })]
            }
            Refresh::Projects => vec![self.load_projects(), self.load_tags()],
        }
    }

    /// Apply a list reply if it is the newest for its target. Tab switches
    /// are refused while the new data is being written.
    fn apply_list<T>(
        &mut self,
        ticket: Ticket,
        result: GatewayResult<T>,
        apply: impl FnOnce(&mut ViewState, T) -> Redraw,
    ) -> Vec<Effect> {
        if !self.sequencer.accept(ticket) {
            return Vec::new();
        }
        match result {
            Ok(value) => {
                self.router.enter_refresh();
                let redraw = apply(&mut self.state, value);
                self.router.exit_refresh();
                self.redraw(redraw);
                Vec::new()
            }
            Err(err) => {
                warn!(target = ?ticket.target, error = %err, "Refresh failed");
                self.report(AppError::from_gateway(err))
            }
        }
    }

    fn apply_transition(&mut self, transition: Transition) -> Vec<Effect> {
        self.redraw(Redraw::of([View::Tabs]));
        let mut effects = match transition.polling {
            Polling::Start => vec![Effect::StartPolling],
            Polling::Stop => vec![Effect::StopPolling],
            Polling::Keep => Vec::new(),
        };
        if let Some(refresh) = transition.refresh {
            effects.extend(self.refresh(refresh));
        }
        effects.extend(self.fetch_thumbnails());
        effects
    }

    /// Claim thumbnails of the avatars the active tab shows
    fn fetch_thumbnails(&mut self) -> Vec<Effect> {
        let shows_avatars = match self.router.active() {
            Tab::Avatars => true,
            Tab::Single => self.state.context(Context::Single).image_source() == ImageSource::Avatar,
            Tab::Multi => self.state.context(Context::Multi).image_source() == ImageSource::Avatar,
            Tab::Loading | Tab::History | Tab::Projects => false,
        };
        if !shows_avatars {
            return Vec::new();
        }
        let claimed = self
            .thumbnails
            .claim_missing(self.state.avatars().iter().map(|a| &a.id));
        claimed
            .into_iter()
            .map(|id| {
                self.spawn(move |gw| async move {
                    let result = gw.get_avatar_image(&id).await;
                    AppEvent::ThumbnailLoaded(id, result)
                })
            })
            .collect()
    }

    // ---- ui ----

    fn on_ui_event(&mut self, event: UiEvent) -> Vec<Effect> {
        match event {
            UiEvent::ActivateTab(tab) => match self.router.activate(tab) {
                Ok(transition) => self.apply_transition(transition),
                Err(err) => self.report(err),
            },

            UiEvent::AddImages { ctx, files } => {
                let result = self.state.add_images(ctx, files);
                self.apply_redraw(result)
            }
            UiEvent::RemoveImage { ctx, id } => {
                let redraw = self.state.remove_image(ctx, id);
                self.redraw(redraw);
                Vec::new()
            }
            UiEvent::SetImageSource { ctx, source } => {
                let redraw = self.state.set_image_source(ctx, source);
                self.redraw(redraw);
                self.fetch_thumbnails()
            }
            UiEvent::SelectAvatar { ctx, avatar } => {
                let result = self.state.select_avatar(ctx, avatar);
                self.apply_redraw(result)
            }
            UiEvent::SetProvider { ctx, provider } => {
                let redraw = self.state.set_provider(ctx, provider);
                if redraw.is_empty() {
                    return Vec::new();
                }
                self.redraw(redraw);
                vec![self.load_voices(ctx)]
            }

            UiEvent::SingleTextChanged(text) => {
                let redraw = self.state.set_single_text(text);
                self.redraw(redraw);
                Vec::new()
            }
            UiEvent::SingleVoiceChanged(voice) => {
                let redraw = self.state.set_single_voice(voice);
                self.redraw(redraw);
                Vec::new()
            }
            UiEvent::GenerateSingle => {
                let started = self.orchestrator.start_single(&self.state);
                self.start_generation(started)
            }

            UiEvent::ScriptsTextChanged(text) => {
                let redraw = self.state.set_scripts_text(text);
                self.redraw(redraw);
                Vec::new()
            }
            UiEvent::ScriptVoiceChanged { script_index, voice } => {
                let result = self.state.set_voice(script_index, voice);
                self.apply_redraw(result)
            }
            UiEvent::SetBatchImageMode(mode) => {
                let redraw = self.state.set_batch_image_mode(mode);
                self.redraw(redraw);
                Vec::new()
            }
            UiEvent::AssignBatchImage { key, image } => match image {
                Some(image) => {
                    let result = self.state.assign_batch_image(key, image);
                    self.apply_redraw(result)
                }
                None => {
                    let redraw = self.state.clear_batch_image(key);
                    self.redraw(redraw);
                    Vec::new()
                }
            },
            UiEvent::RequestPreview => {
                let text = self.state.scripts_text().to_string();
                let provider = self.state.context(Context::Multi).provider();
                let batch_size = self.config.batch_size;
                let ticket = self.sequencer.issue(Target::Preview);
                vec![self.spawn(move |gw| async move {
                    let result =
                        pipeline::generate_preview(gw.as_ref(), &text, provider, batch_size).await;
                    AppEvent::PreviewReady(ticket, result)
                })]
            }
            UiEvent::RequestEstimate(ctx) => {
                let text = match ctx {
                    Context::Single => self.state.single_text(),
                    Context::Multi => self.state.scripts_text(),
                }
                .to_string();
                let ticket = self.sequencer.issue(Target::Estimate(ctx));
                vec![self.spawn(move |gw| async move {
                    let result = pipeline::estimate(gw.as_ref(), &text).await;
                    AppEvent::EstimateReady(ticket, ctx, result)
                })]
            }
            UiEvent::GenerateBatch => {
                let started = self.orchestrator.start_batch(&self.state);
                self.start_generation(started)
            }

            UiEvent::ClearFailedJobs => {
                let redraw = self.state.clear_failed();
                self.redraw(redraw);
                Vec::new()
            }

            UiEvent::CreateAvatar { name, image } => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return self.report(AppError::validation("Enter a name for the avatar"));
                }
                let upload = match ImageAsset::from_file(image) {
                    Ok(asset) => asset.to_upload(),
                    Err(err) => return self.report(err),
                };
                vec![self.spawn(move |gw| async move {
                    AppEvent::AvatarCreated(gw.create_avatar(&name, upload).await)
                })]
            }
            UiEvent::RequestDelete(action) => {
                let redraw = self.state.request_confirmation(action);
                self.redraw(redraw);
                Vec::new()
            }
            UiEvent::Confirm => {
                let (action, redraw) = self.state.take_confirmation();
                self.redraw(redraw);
                match action {
                    Some(action) => vec![self.delete(action)],
                    None => Vec::new(),
                }
            }
            UiEvent::Cancel => {
                let (action, redraw) = self.state.take_confirmation();
                debug!(?action, "Confirmation cancelled");
                self.redraw(redraw);
                Vec::new()
            }
            UiEvent::CreateProject(project) => {
                if project.name.trim().is_empty() {
                    return self.report(AppError::validation("Enter a project name"));
                }
                vec![self.spawn(move |gw| async move {
                    AppEvent::ProjectSaved(gw.create_project(&project).await)
                })]
            }
            UiEvent::UpdateProject { id, patch } => vec![self.spawn(move |gw| async move {
                AppEvent::ProjectSaved(gw.update_project(&id, &patch).await)
            })],
            UiEvent::SelectProject(id) => {
                let redraw = self.state.select_project(id.clone());
                self.redraw(redraw);
                match id {
                    Some(id) => vec![self.spawn(move |gw| async move {
                        let result = gw.get_project(&id).await;
                        AppEvent::ProjectLoaded(id, result)
                    })],
                    None => Vec::new(),
                }
            }
            UiEvent::AddVideoToProject { project, video } => vec![self.spawn(move |gw| async move {
                let result = gw.add_video_to_project(&project, &video).await;
                AppEvent::VideoAddedToProject(project, result)
            })],
            UiEvent::SelectTag(tag) => {
                let redraw = self.state.set_selected_tag(tag);
                self.redraw(redraw);
                vec![self.load_projects()]
            }
            UiEvent::CreateTag { name, color } => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return self.report(AppError::validation("Enter a tag name"));
                }
                let color = match color.trim() {
                    "" => DEFAULT_TAG_COLOR.to_string(),
                    c => c.to_string(),
                };
                vec![self.spawn(move |gw| async move {
                    AppEvent::TagCreated(gw.create_tag(&name, &color).await)
                })]
            }

            UiEvent::SaveConfig(credentials) => {
                let credentials = credentials.trimmed();
                if credentials.is_empty() {
                    return self.report(AppError::validation("Enter at least one API key"));
                }
                vec![self.spawn(move |gw| async move {
                    AppEvent::ConfigSaved(gw.save_config(&credentials).await)
                })]
            }
            UiEvent::Refresh(refresh) => self.refresh(refresh),
            UiEvent::DismissNotice(id) => {
                let redraw = self.state.dismiss_notice(id);
                self.redraw(redraw);
                Vec::new()
            }
            UiEvent::DownloadVideo(path) => vec![self.spawn(move |gw| async move {
                let result = gw.download_video(&path).await;
                AppEvent::VideoDownloaded { path, result }
            })],
        }
    }

    fn delete(&mut self, action: DestructiveAction) -> Effect {
        info!(?action, "Deleting");
        self.spawn(move |gw| async move {
            let result = match &action {
                DestructiveAction::DeleteAvatar(id) => gw.delete_avatar(id).await,
                DestructiveAction::DeleteProject(id) => gw.delete_project(id).await,
                DestructiveAction::DeleteTag(id) => gw.delete_tag(id).await,
            };
            AppEvent::Deleted(action, result)
        })
    }

    // ---- gateway replies ----

    fn on_app_event(&mut self, event: AppEvent) -> Vec<Effect> {
        match event {
            AppEvent::ConfigStatusLoaded(ticket, result) => {
                self.apply_list(ticket, result, |state, status| state.set_config_status(status))
            }
            AppEvent::ConfigSaved(result) => match result {
                Ok(message) => {
                    let mut effects = vec![
                        self.notify(Level::Success, message),
                        self.load_config_status(),
                    ];
                    effects.push(self.load_voices(Context::Single));
                    effects.push(self.load_voices(Context::Multi));
                    effects
                }
                Err(err) => self.report(err.into()),
            },
            AppEvent::VoicesLoaded {
                ticket,
                ctx,
                provider,
                result,
            } => {
                if self.state.context(ctx).provider() != provider {
                    debug!(context = ctx.as_str(), %provider, "Voices for a provider no longer selected");
                    return Vec::new();
                }
                self.apply_list(ticket, result, |state, voices| state.set_voices(ctx, voices))
            }
            AppEvent::AvatarsLoaded(ticket, result) => {
                let mut effects =
                    self.apply_list(ticket, result, |state, avatars| state.replace_avatars(avatars));
                self.thumbnails.retain(self.state.avatars());
                effects.extend(self.fetch_thumbnails());
                effects
            }
            AppEvent::ProjectsLoaded(ticket, result) => {
                self.apply_list(ticket, result, |state, projects| state.replace_projects(projects))
            }
            AppEvent::TagsLoaded(ticket, result) => {
                self.apply_list(ticket, result, |state, tags| state.replace_tags(tags))
            }
            AppEvent::JobsLoaded(ticket, result) => {
                self.apply_list(ticket, result, |state, jobs| state.replace_jobs(jobs))
            }
            AppEvent::HistoryLoaded(ticket, result) => {
                self.apply_list(ticket, result, |state, history| state.replace_history(history))
            }

            AppEvent::PreviewReady(ticket, _) | AppEvent::EstimateReady(ticket, _, _)
                if !self.sequencer.accept(ticket) =>
            {
                Vec::new()
            }
            AppEvent::PreviewReady(_, result) => match result {
                Ok(outcome) => {
                    let redraw = self.state.replace_preview(outcome.preview, outcome.voices);
                    self.redraw(redraw);
                    Vec::new()
                }
                Err(err) => self.report(err),
            },
            AppEvent::EstimateReady(_, ctx, result) => match result {
                Ok(estimate) => {
                    let redraw = self.state.set_estimate(ctx, Some(estimate));
                    self.redraw(redraw);
                    Vec::new()
                }
                Err(err) => {
                    let redraw = self.state.set_estimate(ctx, None);
                    self.redraw(redraw);
                    self.report(err)
                }
            },
            AppEvent::ThumbnailLoaded(id, result) => {
                if self.state.avatar(&id).is_none() {
                    return Vec::new();
                }
                if let Err(err) = &result {
                    debug!(avatar_id = %id, error = %err, "Thumbnail unavailable");
                }
                self.thumbnails.store(id, result);
                self.redraw(Redraw::of([
                    View::AvatarGallery,
                    View::AvatarSelector(Context::Single),
                    View::AvatarSelector(Context::Multi),
                ]));
                Vec::new()
            }

            AppEvent::AvatarCreated(result) => match result {
                Ok(avatar) => {
                    let mut effects =
                        vec![self.notify(Level::Success, format!("Avatar {} created", avatar.name))];
                    effects.extend(self.refresh(Refresh::Avatars));
                    effects
                }
                Err(err) => self.report(err.into()),
            },
            AppEvent::Deleted(action, result) => self.on_deleted(action, result),
            AppEvent::ProjectSaved(result) => match result {
                Ok(project) => {
                    let message = format!("Project {} saved", project.name);
                    let redraw = self.state.upsert_project(project);
                    self.redraw(redraw);
                    let mut effects = vec![self.notify(Level::Success, message)];
                    effects.extend(self.refresh(Refresh::Projects));
                    effects
                }
                Err(err) => self.report(err.into()),
            },
            AppEvent::ProjectLoaded(id, result) => {
                if self.state.selected_project() != Some(&id) {
                    return Vec::new();
                }
                match result {
                    Ok(project) => {
                        let redraw = self.state.upsert_project(project);
                        self.redraw(redraw);
                        Vec::new()
                    }
                    Err(GatewayError::NotFound(_)) => {
                        let redraw = self.state.select_project(None);
                        self.redraw(redraw);
                        self.refresh(Refresh::Projects)
                    }
                    Err(err) => self.report(err.into()),
                }
            }
            AppEvent::VideoAddedToProject(project, result) => match result {
                Ok(()) => {
                    info!(project_id = %project, "Video added to project");
                    let mut effects = vec![self.notify(Level::Success, "Video added to project")];
                    effects.extend(self.refresh(Refresh::Projects));
                    effects
                }
                Err(err) => self.report(err.into()),
            },
            AppEvent::TagCreated(result) => match result {
                Ok(tag) => vec![
                    self.notify(Level::Success, format!("Tag {} created", tag.name)),
                    self.load_tags(),
                ],
                Err(err) => self.report(err.into()),
            },
            AppEvent::VideoDownloaded { path, result } => match result {
                Ok(bytes) => {
                    let file_name = path.file_name().to_string();
                    info!(file = %file_name, bytes = bytes.len(), "Video downloaded");
                    let effect = self.notify(Level::Success, format!("Downloaded {file_name}"));
                    self.downloads.push(Download { file_name, bytes });
                    vec![effect]
                }
                Err(err @ GatewayError::NotFound(_)) => {
                    let mut effects = self.report(err.into());
                    effects.extend(self.refresh(Refresh::History));
                    effects
                }
                Err(err) => self.report(err.into()),
            },

            AppEvent::NoticeExpired(id) => {
                let redraw = self.state.dismiss_notice(id);
                self.redraw(redraw);
                Vec::new()
            }
            AppEvent::PollTick => {
                if !self.router.is_polling() {
                    debug!("Poll tick outside the loading tab");
                    return Vec::new();
                }
                self.refresh(Refresh::Jobs)
            }
        }
    }

    /// A delete that finds nothing means the list is stale: re-read it quietly
    fn on_deleted(&mut self, action: DestructiveAction, result: GatewayResult<()>) -> Vec<Effect> {
        let refresh = match &action {
            DestructiveAction::DeleteAvatar(_) => Refresh::Avatars,
            DestructiveAction::DeleteProject(_) | DestructiveAction::DeleteTag(_) => Refresh::Projects,
        };
        match result {
            Ok(()) => {
                let message = match &action {
                    DestructiveAction::DeleteAvatar(id) => {
                        let redraw = self.state.remove_avatar(id);
                        self.redraw(redraw);
                        self.thumbnails.remove(id);
                        "Avatar deleted"
                    }
                    DestructiveAction::DeleteProject(id) => {
                        if self.state.selected_project() == Some(id) {
                            let redraw = self.state.select_project(None);
                            self.redraw(redraw);
                        }
                        "Project deleted"
                    }
                    DestructiveAction::DeleteTag(_) => "Tag deleted",
                };
                let mut effects = vec![self.notify(Level::Success, message)];
                effects.extend(self.refresh(refresh));
                effects
            }
            Err(GatewayError::NotFound(reason)) => {
                info!(?action, %reason, "Already gone, reloading list");
                self.refresh(refresh)
            }
            Err(err) => self.report(err.into()),
        }
    }

    // ---- generation ----

    fn start_generation(&mut self, started: Result<Started, AppError>) -> Vec<Effect> {
        let Started {
            correlation,
            uploads,
        } = match started {
            Ok(started) => started,
            Err(err) => return self.report(err),
        };
        info!(%correlation, uploads = uploads.len(), "Generation started");
        vec![self.spawn(move |gw| async move {
            let result = pipeline::upload_images(gw.as_ref(), &uploads).await;
            GenEvent::ImagesUploaded {
                correlation,
                result,
            }
        })]
    }

    fn on_gen_event(&mut self, event: GenEvent) -> Vec<Effect> {
        match event {
            GenEvent::ImagesUploaded {
                correlation,
                result,
            } => {
                let Submission {
                    correlation,
                    call,
                    placeholders,
                } = match self.orchestrator.submit(correlation, result, &self.state) {
                    Ok(submission) => submission,
                    Err(err) => return self.report(err),
                };
                let count = placeholders.len();
                let redraw = self.state.insert_pending(placeholders);
                self.redraw(redraw);

                let mut effects = match self.router.activate(Tab::Loading) {
                    Ok(transition) => self.apply_transition(transition),
                    Err(err) => {
                        warn!(%correlation, error = %err, "Could not switch to the loading tab");
                        Vec::new()
                    }
                };
                effects.push(self.notify(Level::Info, format!("Generating {count} video(s)...")));
                effects.push(match call {
                    GenerationCall::Single(request) => self.spawn(move |gw| async move {
                        let result = gw.generate_single(request).await;
                        GenEvent::SingleFinished {
                            correlation,
                            result,
                        }
                    }),
                    GenerationCall::Batch(request) => self.spawn(move |gw| async move {
                        let result = gw.generate_batch(request).await;
                        GenEvent::BatchFinished {
                            correlation,
                            result,
                        }
                    }),
                });
                effects
            }
            GenEvent::SingleFinished {
                correlation,
                result,
            } => {
                let reconciled = self
                    .orchestrator
                    .reconcile_single(correlation, result, &mut self.state);
                self.finish_generation(reconciled)
            }
            GenEvent::BatchFinished {
                correlation,
                result,
            } => {
                let reconciled = self
                    .orchestrator
                    .reconcile_batch(correlation, result, &mut self.state);
                self.finish_generation(reconciled)
            }
        }
    }

    fn finish_generation(
        &mut self,
        reconciled: Option<Reconciled>,
    ) -> Vec<Effect> {
        let Some(reconciled) = reconciled else {
            return Vec::new();
        };
        self.redraw(reconciled.redraw);
        let mut effects = vec![self.notify(reconciled.level, reconciled.message)];
        effects.extend(self.refresh(Refresh::History));
        effects.extend(self.refresh(Refresh::Jobs));
        effects
    }
}
