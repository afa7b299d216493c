//! Generation requests from validation to reconciliation.
//!
//! Every request lives under its own [`CorrelationId`]. The orchestrator owns
//! the state machine; the caller performs the uploads and the gateway call in
//! between and feeds the outcomes back in.

mod resolve;

pub use resolve::{FixedSource, ImagePlan, ResolvedImages};

use crate::error::AppError;
use crate::gateway::{
    BatchGenerationRequest, BatchResult, GatewayError, SingleGenerationRequest,
    SingleGenerationResult,
};
use crate::notifications::Level;
use crate::state::{CompletedEntry, Context, ImageAsset, PendingJob, PendingStatus, Redraw, View, ViewState};
use chrono::Utc;
use ls_core::Provider;
use ls_core::ids::StoredImagePath;
use ls_core::script::{Script, excerpt};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};
use uuid::Uuid;

const EXCERPT_CHARS: usize = 80;

/// Client-generated handle sent with a request and carried through its reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestPhase {
    Idle,
    Validating,
    ImagesResolving,
    Submitting,
    AwaitingResult,
    Completed,
    Failed(AppError),
}

#[derive(Debug, Clone)]
enum Draft {
    Single {
        text: String,
        voice: String,
        provider: Provider,
    },
    Batch {
        scripts: Vec<Script>,
        voices: Vec<String>,
        provider: Provider,
    },
}

#[derive(Debug)]
struct Request {
    phase: RequestPhase,
    draft: Draft,
    plan: ImagePlan,
}

/// Values every request carries that are not picked per generation
#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub model_id: String,
    pub workers: u32,
}

/// A validated request waiting for its images to be uploaded
#[derive(Debug)]
pub struct Started {
    pub correlation: CorrelationId,
    pub uploads: Vec<ImageAsset>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationCall {
    Single(SingleGenerationRequest),
    Batch(BatchGenerationRequest),
}

/// The one gateway call of a request plus its loading-view placeholders
#[derive(Debug)]
pub struct Submission {
    pub correlation: CorrelationId,
    pub call: GenerationCall,
    pub placeholders: Vec<PendingJob>,
}

/// What the user is told once a reply has been applied
#[derive(Debug)]
pub struct Reconciled {
    pub redraw: Redraw,
    pub level: Level,
    pub message: String,
}

#[derive(Debug)]
pub struct Orchestrator {
    settings: GenerationSettings,
    requests: HashMap<CorrelationId, Request>,
    outcomes: HashMap<CorrelationId, RequestPhase>,
}

impl Orchestrator {
    pub fn new(settings: GenerationSettings) -> Self {
        Self {
            settings,
            requests: HashMap::new(),
            outcomes: HashMap::new(),
        }
    }

    /// Current phase; `Idle` for ids this orchestrator never saw
    pub fn phase(&self, id: CorrelationId) -> RequestPhase {
        self.requests
            .get(&id)
            .map(|r| r.phase.clone())
            .or_else(|| self.outcomes.get(&id).cloned())
            .unwrap_or(RequestPhase::Idle)
    }

    pub fn in_flight(&self) -> usize {
        self.requests.len()
    }

    pub fn start_single(&mut self, state: &ViewState) -> Result<Started, AppError> {
        let correlation = CorrelationId::new();
        debug!(%correlation, "Validating single generation");
        self.begin(correlation, validate_single(state))
    }

    pub fn start_batch(&mut self, state: &ViewState) -> Result<Started, AppError> {
        let correlation = CorrelationId::new();
        debug!(%correlation, "Validating batch generation");
        self.begin(correlation, validate_batch(state))
    }

    fn begin(
        &mut self,
        correlation: CorrelationId,
        validated: Result<(Draft, ImagePlan), AppError>,
    ) -> Result<Started, AppError> {
        let (draft, plan) = match validated {
            Ok(ok) => ok,
            Err(err) => return Err(self.record_failure(correlation, err)),
        };
        if let Err(err) = plan.check_complete() {
            return Err(self.record_failure(correlation, err));
        }
        let uploads = plan.uploads().to_vec();
        self.requests.insert(
            correlation,
            Request {
                phase: RequestPhase::ImagesResolving,
                draft,
                plan,
            },
        );
        Ok(Started {
            correlation,
            uploads,
        })
    }

    /// Finish resolving with the upload outcome and build the gateway call.
    /// Avatars are checked against `state` as it is now, not as it was when
    /// the request started.
    pub fn submit(
        &mut self,
        correlation: CorrelationId,
        uploaded: Result<Vec<StoredImagePath>, AppError>,
        state: &ViewState,
    ) -> Result<Submission, AppError> {
        let Some(request) = self.requests.get(&correlation) else {
            return Err(AppError::validation(format!("Unknown request {correlation}")));
        };
        let resolved = uploaded.and_then(|paths| request.plan.finish(&paths, state));
        let resolved = match resolved {
            Ok(resolved) => resolved,
            Err(err) => return Err(self.fail(correlation, err)),
        };

        let Some(request) = self.requests.get_mut(&correlation) else {
            return Err(AppError::validation(format!("Unknown request {correlation}")));
        };
        request.phase = RequestPhase::Submitting;
        let now = Utc::now();
        let client_ref = correlation.to_string();

        let (call, placeholders) = match &request.draft {
            Draft::Single { text, voice, provider } => {
                let call = GenerationCall::Single(SingleGenerationRequest {
                    text: text.clone(),
                    provider: *provider,
                    voice_name: voice.clone(),
                    model_id: self.settings.model_id.clone(),
                    image_paths: resolved.image_paths,
                    max_workers: self.settings.workers,
                    client_ref,
                });
                let placeholder = PendingJob {
                    correlation,
                    script_id: None,
                    title: "Single video".into(),
                    excerpt: excerpt(text, EXCERPT_CHARS),
                    status: PendingStatus::Processing,
                    started_at: now,
                };
                (call, vec![placeholder])
            }
            Draft::Batch { scripts, voices, provider } => {
                let placeholders = scripts
                    .iter()
                    .map(|script| PendingJob {
                        correlation,
                        script_id: Some(script.id),
                        title: format!("Script {}", script.id),
                        excerpt: script.excerpt(EXCERPT_CHARS),
                        status: PendingStatus::Processing,
                        started_at: now,
                    })
                    .collect();
                let call = GenerationCall::Batch(BatchGenerationRequest {
                    scripts: scripts.clone(),
                    provider: *provider,
                    model_id: self.settings.model_id.clone(),
                    image_paths: resolved.image_paths,
                    max_workers: self.settings.workers,
                    voice_selections: voices.clone(),
                    batch_image_mode: request.plan.mode(),
                    batch_images: resolved.batch_images,
                    client_ref,
                });
                (call, placeholders)
            }
        };

        request.phase = RequestPhase::AwaitingResult;
        info!(%correlation, placeholders = placeholders.len(), "Generation submitted");
        Ok(Submission {
            correlation,
            call,
            placeholders,
        })
    }

    /// Abort an in-flight request before its gateway call
    pub fn fail(&mut self, correlation: CorrelationId, err: AppError) -> AppError {
        self.requests.remove(&correlation);
        self.record_failure(correlation, err)
    }

    fn record_failure(&mut self, correlation: CorrelationId, err: AppError) -> AppError {
        warn!(%correlation, error = %err, "Generation failed");
        self.outcomes
            .insert(correlation, RequestPhase::Failed(err.clone()));
        err
    }

    /// Take a request awaiting its reply; a second reply finds nothing
    fn take_awaiting(&mut self, correlation: CorrelationId) -> Option<Request> {
        match self.requests.get(&correlation) {
            Some(r) if r.phase == RequestPhase::AwaitingResult => self.requests.remove(&correlation),
            _ => {
                debug!(%correlation, "Ignoring reply for unknown or settled request");
                None
            }
        }
    }

    pub fn reconcile_single(
        &mut self,
        correlation: CorrelationId,
        result: Result<SingleGenerationResult, GatewayError>,
        state: &mut ViewState,
    ) -> Option<Reconciled> {
        let request = self.take_awaiting(correlation)?;
        let Draft::Single { text, .. } = &request.draft else {
            warn!(%correlation, "Single reply for a batch request");
            return None;
        };

        match result {
            Ok(result) => {
                let entry = CompletedEntry {
                    correlation,
                    script_id: None,
                    title: excerpt(text, 40),
                    video_path: result.video_path,
                    duration: result.duration,
                    finished_at: Utc::now(),
                };
                state.complete_pending(entry.clone());
                let redraw = state.set_single_result(Some(entry)).and(Redraw::of([View::Jobs]));
                self.outcomes.insert(correlation, RequestPhase::Completed);
                info!(%correlation, duration = result.duration, "Single video ready");
                Some(Reconciled {
                    redraw,
                    level: Level::Success,
                    message: format!("Video generated in {:.1}s", result.duration),
                })
            }
            Err(err) => {
                let err = AppError::from_generation(err);
                state.fail_pending(correlation, None, &err.to_string());
                self.record_failure(correlation, err.clone());
                Some(Reconciled {
                    redraw: Redraw::of([View::Jobs]),
                    level: Level::Error,
                    message: err.to_string(),
                })
            }
        }
    }

    /// Per-script outcomes: one failed script never touches its siblings
    pub fn reconcile_batch(
        &mut self,
        correlation: CorrelationId,
        result: Result<Vec<BatchResult>, GatewayError>,
        state: &mut ViewState,
    ) -> Option<Reconciled> {
        let request = self.take_awaiting(correlation)?;
        let Draft::Batch { scripts, .. } = &request.draft else {
            warn!(%correlation, "Batch reply for a single request");
            return None;
        };

        let results = match result {
            Ok(results) => results,
            Err(err) => {
                let err = AppError::from_generation(err);
                for script in scripts {
                    state.fail_pending(correlation, Some(script.id), &err.to_string());
                }
                self.record_failure(correlation, err.clone());
                return Some(Reconciled {
                    redraw: Redraw::of([View::Jobs]),
                    level: Level::Error,
                    message: err.to_string(),
                });
            }
        };

        let now = Utc::now();
        let mut succeeded = 0;
        let mut first_error = None;
        for script in scripts {
            match results.iter().find(|r| r.script_id == script.id) {
                Some(BatchResult {
                    success: true,
                    video_path: Some(path),
                    duration,
                    ..
                }) => {
                    succeeded += 1;
                    state.complete_pending(CompletedEntry {
                        correlation,
                        script_id: Some(script.id),
                        title: format!("Script {}", script.id),
                        video_path: path.clone(),
                        duration: duration.unwrap_or_default(),
                        finished_at: now,
                    });
                }
                Some(failed) => {
                    state.fail_pending(correlation, Some(script.id), failed.error_message());
                    first_error.get_or_insert_with(|| failed.error_message().to_string());
                }
                None => {
                    state.fail_pending(correlation, Some(script.id), "No result returned");
                    first_error.get_or_insert_with(|| "No result returned".to_string());
                }
            }
        }

        let total = scripts.len();
        info!(%correlation, succeeded, total, "Batch reconciled");
        match first_error {
            Some(message) if succeeded == 0 => {
                self.record_failure(correlation, AppError::Generation(message));
            }
            _ => {
                self.outcomes.insert(correlation, RequestPhase::Completed);
            }
        }
        let redraw = state.set_batch_results(results).and(Redraw::of([View::Jobs]));
        let level = match succeeded {
            0 => Level::Error,
            n if n == total => Level::Success,
            _ => Level::Info,
        };
        Some(Reconciled {
            redraw,
            level,
            message: format!("{succeeded} of {total} videos generated"),
        })
    }
}

fn validate_single(state: &ViewState) -> Result<(Draft, ImagePlan), AppError> {
    let text = state.single_text().trim();
    if text.is_empty() {
        return Err(AppError::validation("Enter the text to synthesize"));
    }
    let voice = state
        .single_voice()
        .ok_or_else(|| AppError::validation("Select a voice"))?;
    let plan = ImagePlan::single(state)?;
    let draft = Draft::Single {
        text: text.to_string(),
        voice: voice.to_string(),
        provider: state.context(Context::Single).provider(),
    };
    Ok((draft, plan))
}

fn validate_batch(state: &ViewState) -> Result<(Draft, ImagePlan), AppError> {
    let preview = state
        .preview()
        .ok_or_else(|| AppError::validation("Generate a preview first"))?;
    if state.voice_selections().len() != preview.scripts.len() {
        return Err(AppError::validation("Every script needs a voice"));
    }
    let voices = preview
        .scripts
        .iter()
        .zip(state.voice_selections())
        .map(|(script, voice)| {
            voice.clone().ok_or_else(|| {
                AppError::validation(format!("Select a voice for script {}", script.id))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let plan = ImagePlan::batch(state)?;
    let draft = Draft::Batch {
        scripts: preview.scripts.clone(),
        voices,
        provider: state.context(Context::Multi).provider(),
    };
    Ok((draft, plan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::fake::{PNG_1X1, avatar, segment};
    use crate::state::{ImageSource, LocalFile};
    use ls_core::ids::{AvatarId, StoredVideoPath};
    use ls_core::script::{Preview, PreviewSummary};

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(GenerationSettings {
            model_id: "eleven_multilingual_v2".into(),
            workers: 3,
        })
    }

    fn single_ready() -> ViewState {
        let mut state = ViewState::new(20, Provider::ElevenLabs);
        let _ = state.set_single_text("Olá, mundo".into());
        let _ = state.set_voices(Context::Single, vec!["Rachel".into()]);
        let _ = state
            .add_images(Context::Single, vec![LocalFile::new("face.png", PNG_1X1.to_vec())])
            .unwrap();
        state
    }

    fn batch_ready(text: &str) -> ViewState {
        let mut state = ViewState::new(20, Provider::ElevenLabs);
        let preview = Preview {
            scripts: segment(text, 1),
            summary: PreviewSummary::default(),
        }
        .validated()
        .unwrap();
        let _ = state.replace_preview(preview, vec!["Rachel".into()]);
        let _ = state.replace_avatars(vec![avatar("avatar_1", "Ana")]);
        let _ = state.set_image_source(Context::Multi, ImageSource::Avatar);
        let _ = state
            .select_avatar(Context::Multi, Some(AvatarId::new("avatar_1")))
            .unwrap();
        state
    }

    fn submit(orch: &mut Orchestrator, state: &mut ViewState, started: Started) -> Submission {
        let paths = started
            .uploads
            .iter()
            .map(|img| StoredImagePath::new(format!("uploads/{}", img.file_name)))
            .collect();
        let submission = orch.submit(started.correlation, Ok(paths), state).unwrap();
        let _ = state.insert_pending(submission.placeholders.clone());
        submission
    }

    #[test]
    fn missing_voice_fails_validation() {
        let mut orch = orchestrator();
        let mut state = single_ready();
        let _ = state.set_single_voice(None);
        let err = orch.start_single(&state).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(orch.in_flight(), 0);
    }

    #[test]
    fn batch_needs_a_preview() {
        let mut orch = orchestrator();
        let state = ViewState::new(20, Provider::ElevenLabs);
        assert!(matches!(orch.start_batch(&state), Err(AppError::Validation(_))));
    }

    #[test]
    fn single_request_carries_correlation_and_uploads() {
        let mut orch = orchestrator();
        let mut state = single_ready();
        let started = orch.start_single(&state).unwrap();
        assert_eq!(orch.phase(started.correlation), RequestPhase::ImagesResolving);
        assert_eq!(started.uploads.len(), 1);

        let id = started.correlation;
        let submission = submit(&mut orch, &mut state, started);
        let GenerationCall::Single(req) = &submission.call else {
            panic!("expected single call");
        };
        assert_eq!(req.client_ref, id.to_string());
        assert_eq!(req.image_paths, vec![StoredImagePath::new("uploads/face.png")]);
        assert_eq!(req.voice_name, "Rachel");
        assert_eq!(orch.phase(id), RequestPhase::AwaitingResult);
    }

    #[test]
    fn failed_upload_fails_request() {
        let mut orch = orchestrator();
        let state = single_ready();
        let started = orch.start_single(&state).unwrap();
        let err = orch
            .submit(started.correlation, Err(AppError::Upload("disk full".into())), &state)
            .unwrap_err();
        assert_eq!(err, AppError::Upload("disk full".into()));
        assert_eq!(
            orch.phase(started.correlation),
            RequestPhase::Failed(AppError::Upload("disk full".into()))
        );
    }

    #[test]
    fn reply_is_applied_exactly_once() {
        let mut orch = orchestrator();
        let mut state = single_ready();
        let started = orch.start_single(&state).unwrap();
        let id = started.correlation;
        submit(&mut orch, &mut state, started);

        let reply = || {
            Ok(SingleGenerationResult {
                video_path: StoredVideoPath::new("outputs/final.mp4"),
                job_id: None,
                duration: 4.0,
            })
        };
        assert!(orch.reconcile_single(id, reply(), &mut state).is_some());
        assert!(orch.reconcile_single(id, reply(), &mut state).is_none());
        assert_eq!(state.completed().len(), 1);
        assert!(state.pending().is_empty());
        assert_eq!(orch.phase(id), RequestPhase::Completed);
    }

    #[test]
    fn unknown_correlation_is_ignored() {
        let mut orch = orchestrator();
        let mut state = single_ready();
        let reply = Err(GatewayError::Rejected("late".into()));
        assert!(orch
            .reconcile_single(CorrelationId::new(), reply, &mut state)
            .is_none());
    }

    #[test]
    fn backend_message_is_kept_verbatim() {
        let mut orch = orchestrator();
        let mut state = single_ready();
        let started = orch.start_single(&state).unwrap();
        let id = started.correlation;
        submit(&mut orch, &mut state, started);

        let done = orch
            .reconcile_single(id, Err(GatewayError::Rejected("Saldo insuficiente".into())), &mut state)
            .unwrap();
        assert_eq!(done.message, "Saldo insuficiente");
        assert_eq!(
            state.pending()[0].status,
            PendingStatus::Failed("Saldo insuficiente".into())
        );
    }

    #[test]
    fn one_failed_script_leaves_siblings_completed() {
        let mut orch = orchestrator();
        let mut state = batch_ready("A\n---\nB\n---\nC");
        let started = orch.start_batch(&state).unwrap();
        let id = started.correlation;
        let submission = submit(&mut orch, &mut state, started);
        assert_eq!(submission.placeholders.len(), 3);

        let results = (1..=3)
            .map(|script_id| BatchResult {
                script_id,
                success: script_id != 2,
                video_path: (script_id != 2)
                    .then(|| StoredVideoPath::new(format!("outputs/script_{script_id}.mp4"))),
                error: (script_id == 2).then(|| "Voz indisponível".to_string()),
                duration: Some(2.0),
            })
            .collect();
        let done = orch.reconcile_batch(id, Ok(results), &mut state).unwrap();

        assert_eq!(done.level, Level::Info);
        assert_eq!(state.batch_results().len(), 3);
        assert_eq!(state.completed().len(), 2);
        assert_eq!(state.pending().len(), 1);
        assert_eq!(state.pending()[0].script_id, Some(2));
        assert_eq!(
            state.pending()[0].status,
            PendingStatus::Failed("Voz indisponível".into())
        );
    }

    #[test]
    fn batch_with_no_video_is_failed() {
        let mut orch = orchestrator();
        let mut state = batch_ready("A\n---\nB");
        let started = orch.start_batch(&state).unwrap();
        let id = started.correlation;
        submit(&mut orch, &mut state, started);

        let results = (1..=2)
            .map(|script_id| BatchResult {
                script_id,
                success: false,
                video_path: None,
                error: Some(format!("Falha no script {script_id}")),
                duration: None,
            })
            .collect();
        let done = orch.reconcile_batch(id, Ok(results), &mut state).unwrap();

        assert_eq!(done.level, Level::Error);
        assert_eq!(
            orch.phase(id),
            RequestPhase::Failed(AppError::Generation("Falha no script 1".into()))
        );
        assert_eq!(state.pending().len(), 2);
    }

    #[test]
    fn concurrent_requests_are_tracked_apart() {
        let mut orch = orchestrator();
        let mut state = single_ready();
        let first = orch.start_single(&state).unwrap();
        let second = orch.start_single(&state).unwrap();
        assert_ne!(first.correlation, second.correlation);
        let (a, b) = (first.correlation, second.correlation);
        submit(&mut orch, &mut state, first);
        submit(&mut orch, &mut state, second);
        assert_eq!(orch.in_flight(), 2);

        let _ = orch.reconcile_single(b, Err(GatewayError::Rejected("x".into())), &mut state);
        assert_eq!(orch.phase(a), RequestPhase::AwaitingResult);
        assert_eq!(state.pending().len(), 2);
    }
}
