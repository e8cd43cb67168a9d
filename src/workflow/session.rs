// Interprets workflow effects: the only place where transitions meet I/O

use chrono::{DateTime, Utc};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn, Instrument};

use crate::client::{LookupError, SlipBackend, UploadError};
use crate::telemetry::{create_action_span, generate_correlation_id};
use crate::types::{SelectedImage, SelectionError, SlipAck};
use crate::workflow::preview::PreviewRegistry;
use crate::workflow::state::{
    Effect, EventKind, Phase, Rejected, Transition, TransitionError, WorkflowEvent, WorkflowState,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// One applied transition, kept for the session history view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRecord {
    pub from: Phase,
    pub to: Phase,
    pub event: EventKind,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    Resolved { display_name: String },
    Failed(LookupError),
    /// The identifier was cleared while the lookup was in flight
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted(SlipAck),
    Failed(UploadError),
}

/// What came back from the backend while driving an event
enum Completion {
    Lookup(Result<String, LookupError>),
    Upload(Result<SlipAck, UploadError>),
}

/// A single user session: owns the workflow state, its preview handles and
/// the backend it talks to.
pub struct WorkflowSession<B: SlipBackend> {
    backend: B,
    state: WorkflowState,
    previews: PreviewRegistry,
    history: Vec<TransitionRecord>,
    alerts: Vec<String>,
}

impl<B: SlipBackend> WorkflowSession<B> {
    pub fn new(backend: B, placeholder_url: impl Into<String>) -> Self {
        Self {
            backend,
            state: WorkflowState::new(placeholder_url),
            previews: PreviewRegistry::new(),
            history: Vec::new(),
            alerts: Vec::new(),
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    pub fn history(&self) -> &[TransitionRecord] {
        &self.history
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Drain user-visible notifications raised since the last call
    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    pub fn set_identifier(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        let effects = self.dispatch(WorkflowEvent::IdentifierChanged(text.into()))?;
        self.run_local(effects);
        Ok(())
    }

    /// Look up the current identifier. A failed lookup is an outcome, not an error.
    pub async fn resolve(&mut self) -> Result<ResolveOutcome, SessionError> {
        let correlation_id = generate_correlation_id();
        let span = create_action_span("resolve", &correlation_id, Some(self.state.identifier().as_str()));

        let completion = self.drive(WorkflowEvent::ResolveRequested).instrument(span).await?;

        Ok(match completion {
            Some(Completion::Lookup(Ok(display_name))) if self.state.upload_unlocked() => {
                ResolveOutcome::Resolved { display_name }
            }
            Some(Completion::Lookup(Err(e))) => ResolveOutcome::Failed(e),
            _ => ResolveOutcome::Discarded,
        })
    }

    /// Read an image from disk, derive its preview and select it
    pub async fn choose_image_file(&mut self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let image = SelectedImage::load(path).await?;
        self.select_image(image)
    }

    pub fn select_image(&mut self, image: SelectedImage) -> Result<(), SessionError> {
        let preview = self.previews.create(&image);
        let handle = preview.local_handle().cloned();

        match self.dispatch(WorkflowEvent::ImageChosen { image, preview }) {
            Ok(effects) => {
                self.run_local(effects);
                Ok(())
            }
            Err(e) => {
                // the rejected selection never became visible
                if let Some(handle) = handle {
                    self.previews.revoke(&handle);
                }
                Err(e.into())
            }
        }
    }

    /// Upload the selected slip. A failed upload is an outcome, not an error.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, SessionError> {
        let correlation_id = generate_correlation_id();
        let span = create_action_span("submit", &correlation_id, Some(self.state.identifier().as_str()));

        let completion = self.drive(WorkflowEvent::SubmitRequested).instrument(span).await?;

        match completion {
            Some(Completion::Upload(Ok(ack))) => Ok(SubmitOutcome::Accepted(ack)),
            Some(Completion::Upload(Err(e))) => Ok(SubmitOutcome::Failed(e)),
            _ => Err(SessionError::Transition(TransitionError::InvalidTransition {
                phase: self.state.phase(),
                event: EventKind::SubmitRequested,
            })),
        }
    }

    /// Apply an event and follow its network effects to completion
    async fn drive(&mut self, event: WorkflowEvent) -> Result<Option<Completion>, SessionError> {
        let mut completion = None;
        let mut next = Some(event);

        while let Some(event) = next.take() {
            let effects = self.dispatch(event)?;
            for effect in effects {
                match effect {
                    Effect::FetchStudent { identifier } => {
                        let result = self.backend.resolve_student(&identifier).await;
                        completion = Some(Completion::Lookup(
                            result.as_ref().map(|s| s.display_name.clone()).map_err(Clone::clone),
                        ));
                        next = Some(match result {
                            Ok(student) => WorkflowEvent::ResolveSucceeded(student),
                            Err(e) => WorkflowEvent::ResolveFailed(e),
                        });
                    }
                    Effect::UploadSlip => {
                        let result = match self.state.image() {
                            Some(image) => self.backend.submit_slip(image).await,
                            None => Err(UploadError::Encoding("no image held by the session".to_string())),
                        };
                        completion = Some(Completion::Upload(result.clone()));
                        next = Some(match result {
                            Ok(ack) => WorkflowEvent::SubmitSucceeded(ack),
                            Err(e) => WorkflowEvent::SubmitFailed(e),
                        });
                    }
                    local => self.run_local(vec![local]),
                }
            }
        }

        Ok(completion)
    }

    fn dispatch(&mut self, event: WorkflowEvent) -> Result<Vec<Effect>, TransitionError> {
        let kind = event.kind();
        let state = std::mem::take(&mut self.state);

        match state.transition(event) {
            Ok(Transition { from, state, effects }) => {
                self.history.push(TransitionRecord {
                    from,
                    to: state.phase(),
                    event: kind,
                    at: Utc::now(),
                });
                self.state = state;
                Ok(effects)
            }
            Err(Rejected { state, error, .. }) => {
                warn!(phase = %state.phase(), event = %kind, error = %error, "Event rejected");
                self.state = state;
                Err(error)
            }
        }
    }

    fn run_local(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ReleasePreview(handle) => {
                    self.previews.revoke(&handle);
                }
                Effect::Alert(message) => {
                    debug!(alert = %message, "Alert raised");
                    self.alerts.push(message);
                }
                Effect::FetchStudent { .. } | Effect::UploadSlip => {
                    warn!(effect = ?effect, "Network effect outside of an action; ignored");
                }
            }
        }
    }
}
