mod avatar_panel;
mod central_panel;
mod format;
mod history_panel;
pub mod markup;
mod project_panel;
mod queue_panel;
mod side_panel;
mod top_panel;

pub use avatar_panel::AvatarPanel;
pub use central_panel::CentralPanel;
pub use history_panel::HistoryPanel;
pub use markup::Node;
pub use project_panel::ProjectPanel;
pub use queue_panel::QueuePanel;
pub use side_panel::SidePanel;
pub use top_panel::TopPanel;

use crate::notifications::NoticeId;
use crate::router::{Refresh, Tab};
use crate::state::{
    BatchImage, Context, DestructiveAction, ImageId, ImageSource, LocalFile, ThumbnailCache,
    View, ViewState,
};
use chrono::{DateTime, Utc};
use ls_core::Provider;
use ls_core::credentials::Credentials;
use ls_core::ids::{AvatarId, ProjectId, StoredVideoPath};
use ls_core::project::{NewProject, NewProjectVideo, ProjectPatch};
use ls_core::script::{BatchImageMode, BatchKey};
use markup::el;

/// Everything a user can do on the page
#[derive(Debug, Clone)]
pub enum UiEvent {
    ActivateTab(Tab),

    // Image sources
    AddImages { ctx: Context, files: Vec<LocalFile> },
    RemoveImage { ctx: Context, id: ImageId },
    SetImageSource { ctx: Context, source: ImageSource },
    SelectAvatar { ctx: Context, avatar: Option<AvatarId> },
    SetProvider { ctx: Context, provider: Provider },

    // Single video
    SingleTextChanged(String),
    SingleVoiceChanged(Option<String>),
    GenerateSingle,

    // Multiple scripts
    ScriptsTextChanged(String),
    ScriptVoiceChanged { script_index: usize, voice: String },
    SetBatchImageMode(BatchImageMode),
    AssignBatchImage { key: BatchKey, image: Option<BatchImage> },
    RequestPreview,
    RequestEstimate(Context),
    GenerateBatch,

    // Jobs
    ClearFailedJobs,

    // Avatars, projects, tags
    CreateAvatar { name: String, image: LocalFile },
    RequestDelete(DestructiveAction),
    Confirm,
    Cancel,
    CreateProject(NewProject),
    UpdateProject { id: ProjectId, patch: ProjectPatch },
    SelectProject(Option<ProjectId>),
    AddVideoToProject { project: ProjectId, video: NewProjectVideo },
    SelectTag(Option<String>),
    CreateTag { name: String, color: String },

    SaveConfig(Credentials),
    Refresh(Refresh),
    DismissNotice(NoticeId),
    DownloadVideo(StoredVideoPath),
}

/// Read-only view of what the renderers draw from
pub struct UiContext<'a> {
    pub state: &'a ViewState,
    pub thumbnails: &'a ThumbnailCache,
    pub active_tab: Tab,
    pub now: DateTime<Utc>,
}

pub trait UiComponent {
    /// Whether the component is part of the page for the active tab
    fn visible(&self, _ui: &UiContext) -> bool {
        true
    }

    fn show(&self, ui: &UiContext) -> Node;
}

/// DOM id of the element a view renders into
pub fn dom_id(view: View) -> String {
    match view {
        View::Tabs => "tabs".into(),
        View::ImagePreviews(ctx) => format!("image-previews-{}", ctx.as_str()),
        View::AvatarSelector(ctx) => format!("avatar-selector-{}", ctx.as_str()),
        View::Voices(ctx) => format!("voices-{}", ctx.as_str()),
        View::SingleForm => "single-form".into(),
        View::SingleResult => "single-result".into(),
        View::Estimate => "estimate".into(),
        View::Preview => "preview".into(),
        View::BatchResults => "batch-results".into(),
        View::AvatarGallery => "avatar-gallery".into(),
        View::Jobs => "jobs".into(),
        View::History => "history".into(),
        View::Projects => "projects".into(),
        View::SidebarProjects => "sidebar-projects".into(),
        View::Tags => "tags".into(),
        View::ConfigStatus => "config-status".into(),
        View::Notifications => "notifications".into(),
        View::Confirmation => "confirmation".into(),
    }
}

/// Render one view on its own, for patching a page already on screen
pub fn render_view(view: View, ui: &UiContext) -> Node {
    match view {
        View::Tabs => top_panel::tabs(ui),
        View::Notifications => top_panel::notifications(ui),
        View::Confirmation => top_panel::confirmation(ui),
        View::ConfigStatus => side_panel::config_status(ui),
        View::Tags => side_panel::tags(ui),
        View::SidebarProjects => side_panel::sidebar_projects(ui),
        View::ImagePreviews(ctx) => central_panel::image_previews(ui, ctx),
        View::AvatarSelector(ctx) => central_panel::avatar_selector(ui, ctx),
        View::Voices(ctx) => central_panel::voices(ui, ctx),
        View::SingleForm => central_panel::single_form(ui),
        View::SingleResult => central_panel::single_result(ui),
        View::Estimate => central_panel::estimate(ui),
        View::Preview => central_panel::preview(ui),
        View::BatchResults => central_panel::batch_results(ui),
        View::AvatarGallery => avatar_panel::gallery(ui),
        View::Jobs => queue_panel::timeline(ui),
        View::History => history_panel::grid(ui),
        View::Projects => project_panel::projects(ui),
    }
}

pub struct Page {
    components: Vec<Box<dyn UiComponent>>,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            components: vec![
                Box::new(TopPanel),
                Box::new(SidePanel),
                Box::new(CentralPanel),
                Box::new(QueuePanel),
                Box::new(HistoryPanel),
                Box::new(AvatarPanel),
                Box::new(ProjectPanel),
            ],
        }
    }
}

impl Page {
    pub fn add_component(&mut self, component: Box<dyn UiComponent>) {
        self.components.push(component);
    }

    pub fn render(&self, ui: &UiContext) -> String {
        let body = el("body").children(
            self.components
                .iter()
                .filter(|c| c.visible(ui))
                .map(|c| c.show(ui)),
        );
        let page: Node = el("html")
            .child(
                el("head")
                    .child(el("meta").attr("charset", "utf-8"))
                    .child(el("title").text("Lip-sync Studio")),
            )
            .child(body)
            .into();
        format!("<!DOCTYPE html>{}", page.render())
    }
}

/// Container element carrying the DOM id of `view`
fn region(view: View) -> markup::Element {
    el("section").id(dom_id(view))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::gateway::fake::avatar;

    pub(crate) fn with_ui<R>(state: &ViewState, tab: Tab, f: impl FnOnce(&UiContext) -> R) -> R {
        let thumbnails = ThumbnailCache::default();
        let ui = UiContext {
            state,
            thumbnails: &thumbnails,
            active_tab: tab,
            now: Utc::now(),
        };
        f(&ui)
    }

    #[test]
    fn page_render_is_idempotent() {
        let mut state = ViewState::new(20, Provider::ElevenLabs);
        let _ = state.replace_avatars(vec![avatar("avatar_1", "Ana")]);
        for tab in Tab::all() {
            let (a, b) = with_ui(&state, tab, |ui| {
                let page = Page::default();
                (page.render(ui), page.render(ui))
            });
            assert_eq!(a, b);
        }
    }

    #[test]
    fn user_text_never_becomes_markup() {
        let mut state = ViewState::new(20, Provider::ElevenLabs);
        let _ = state.replace_avatars(vec![avatar("avatar_1", "<img src=x onerror=alert(1)>")]);
        let _ = state.set_single_text("</textarea><script>alert(1)</script>".into());
        for tab in [Tab::Single, Tab::Avatars] {
            let html = with_ui(&state, tab, |ui| Page::default().render(ui));
            assert!(!html.contains("<script>alert"));
            assert!(!html.contains("<img src=x"));
        }
    }

    #[test]
    fn every_view_renders_into_its_region() {
        let state = ViewState::new(20, Provider::ElevenLabs);
        let views = [
            View::Tabs,
            View::ImagePreviews(Context::Multi),
            View::AvatarSelector(Context::Single),
            View::Voices(Context::Single),
            View::SingleForm,
            View::SingleResult,
            View::Estimate,
            View::Preview,
            View::BatchResults,
            View::AvatarGallery,
            View::Jobs,
            View::History,
            View::Projects,
            View::SidebarProjects,
            View::Tags,
            View::ConfigStatus,
            View::Notifications,
            View::Confirmation,
        ];
        with_ui(&state, Tab::Single, |ui| {
            for view in views {
                let html = render_view(view, ui).render();
                assert!(
                    html.contains(&format!("id=\"{}\"", dom_id(view))),
                    "{view:?} rendered {html}"
                );
            }
        });
    }
}
