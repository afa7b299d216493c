use crate::error::AppError;
use crate::gateway::{BatchResult, GatewayResult, SingleGenerationResult};
use crate::notifications::NoticeId;
use crate::orchestrator::CorrelationId;
use crate::pipeline::PreviewOutcome;
use crate::sequence::Ticket;
use crate::state::{Context, DestructiveAction};
use crate::ui::UiEvent;
use ls_core::Provider;
use ls_core::avatar::Avatar;
use ls_core::credentials::ConfigStatus;
use ls_core::estimate::Estimate;
use ls_core::ids::{AvatarId, ProjectId, StoredImagePath, StoredVideoPath};
use ls_core::job::Job;
use ls_core::project::{Project, Tag};
use ls_core::video::HistoryVideoEntry;

#[derive(Debug)]
pub enum LsEvent {
    Ui(UiEvent),
    App(AppEvent),
    Gen(GenEvent),
}

/// Replies of gateway reads and edits, plus timers
#[derive(Debug)]
pub enum AppEvent {
    ConfigStatusLoaded(Ticket, GatewayResult<ConfigStatus>),
    ConfigSaved(GatewayResult<String>),
    VoicesLoaded {
        ticket: Ticket,
        ctx: Context,
        provider: Provider,
        result: GatewayResult<Vec<String>>,
    },
    AvatarsLoaded(Ticket, GatewayResult<Vec<Avatar>>),
    ProjectsLoaded(Ticket, GatewayResult<Vec<Project>>),
    TagsLoaded(Ticket, GatewayResult<Vec<Tag>>),
    JobsLoaded(Ticket, GatewayResult<Vec<Job>>),
    HistoryLoaded(Ticket, GatewayResult<Vec<HistoryVideoEntry>>),

    PreviewReady(Ticket, Result<PreviewOutcome, AppError>),
    EstimateReady(Ticket, Context, Result<Estimate, AppError>),
    ThumbnailLoaded(AvatarId, GatewayResult<Vec<u8>>),

    AvatarCreated(GatewayResult<Avatar>),
    Deleted(DestructiveAction, GatewayResult<()>),
    ProjectSaved(GatewayResult<Project>),
    ProjectLoaded(ProjectId, GatewayResult<Project>),
    VideoAddedToProject(ProjectId, GatewayResult<()>),
    TagCreated(GatewayResult<Tag>),
    VideoDownloaded {
        path: StoredVideoPath,
        result: GatewayResult<Vec<u8>>,
    },

    NoticeExpired(NoticeId),
    PollTick,
}

/// Progress of a generation request, keyed by its correlation id
#[derive(Debug)]
pub enum GenEvent {
    ImagesUploaded {
        correlation: CorrelationId,
        result: Result<Vec<StoredImagePath>, AppError>,
    },
    SingleFinished {
        correlation: CorrelationId,
        result: GatewayResult<SingleGenerationResult>,
    },
    BatchFinished {
        correlation: CorrelationId,
        result: GatewayResult<Vec<BatchResult>>,
    },
}

impl From<UiEvent> for LsEvent {
    fn from(event: UiEvent) -> Self {
        Self::Ui(event)
    }
}

impl From<AppEvent> for LsEvent {
    fn from(event: AppEvent) -> Self {
        Self::App(event)
    }
}

impl From<GenEvent> for LsEvent {
    fn from(event: GenEvent) -> Self {
        Self::Gen(event)
    }
}
