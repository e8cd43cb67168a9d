// Workflow state and its pure transition rules.
// No I/O happens here: network calls and preview releases are returned as
// effects for the session to carry out.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{info, warn};

use crate::client::{LookupError, UploadError};
use crate::types::{
    Identifier, PreviewHandle, PreviewReference, ResolvedStudent, SelectedImage, SlipAck,
};

/// Icon shown in place of the preview once a slip has been accepted
pub const DEFAULT_PLACEHOLDER_URL: &str = "https://cdn-icons-png.flaticon.com/512/5038/5038663.png";

/// Alert raised when an upload fails
pub const UPLOAD_FAILED_ALERT: &str = "Failed to upload slip. Try again.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// No identifier entered, or identifier cleared
    #[default]
    Idle,
    /// Lookup in flight
    Resolving,
    /// Student known, no image chosen
    Resolved,
    /// Image chosen and previewed
    ImageSelected,
    /// Upload in flight
    Submitting,
    /// Upload accepted; placeholder shown
    Submitted,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Resolving => "resolving",
            Phase::Resolved => "resolved",
            Phase::ImageSelected => "image-selected",
            Phase::Submitting => "submitting",
            Phase::Submitted => "submitted",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum WorkflowEvent {
    IdentifierChanged(String),
    ResolveRequested,
    ResolveSucceeded(ResolvedStudent),
    ResolveFailed(LookupError),
    ImageChosen {
        image: SelectedImage,
        preview: PreviewReference,
    },
    SubmitRequested,
    SubmitSucceeded(SlipAck),
    SubmitFailed(UploadError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    IdentifierChanged,
    ResolveRequested,
    ResolveSucceeded,
    ResolveFailed,
    ImageChosen,
    SubmitRequested,
    SubmitSucceeded,
    SubmitFailed,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::IdentifierChanged => "identifier-changed",
            EventKind::ResolveRequested => "resolve-requested",
            EventKind::ResolveSucceeded => "resolve-succeeded",
            EventKind::ResolveFailed => "resolve-failed",
            EventKind::ImageChosen => "image-chosen",
            EventKind::SubmitRequested => "submit-requested",
            EventKind::SubmitSucceeded => "submit-succeeded",
            EventKind::SubmitFailed => "submit-failed",
        };
        f.write_str(name)
    }
}

impl WorkflowEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            WorkflowEvent::IdentifierChanged(_) => EventKind::IdentifierChanged,
            WorkflowEvent::ResolveRequested => EventKind::ResolveRequested,
            WorkflowEvent::ResolveSucceeded(_) => EventKind::ResolveSucceeded,
            WorkflowEvent::ResolveFailed(_) => EventKind::ResolveFailed,
            WorkflowEvent::ImageChosen { .. } => EventKind::ImageChosen,
            WorkflowEvent::SubmitRequested => EventKind::SubmitRequested,
            WorkflowEvent::SubmitSucceeded(_) => EventKind::SubmitSucceeded,
            WorkflowEvent::SubmitFailed(_) => EventKind::SubmitFailed,
        }
    }
}

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchStudent { identifier: Identifier },
    /// Upload the image currently held by the state
    UploadSlip,
    ReleasePreview(PreviewHandle),
    Alert(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("{event} is not expected while {phase}")]
    InvalidTransition { phase: Phase, event: EventKind },
    #[error("cannot resolve an empty student identifier")]
    EmptyIdentifier,
    #[error("a request is already in flight ({phase})")]
    RequestInFlight { phase: Phase },
    #[error("upload controls are locked until a student is resolved")]
    UploadLocked,
    #[error("no slip image selected")]
    NoImageSelected,
}

/// Result of an accepted event
#[derive(Debug)]
pub struct Transition {
    pub from: Phase,
    pub state: WorkflowState,
    pub effects: Vec<Effect>,
}

/// A rejected event hands everything back untouched
#[derive(Debug)]
pub struct Rejected {
    pub state: WorkflowState,
    pub event: WorkflowEvent,
    pub error: TransitionError,
}

/// The session's workflow state as an explicit value.
#[derive(Debug)]
pub struct WorkflowState {
    identifier: Identifier,
    student: Option<ResolvedStudent>,
    image: Option<SelectedImage>,
    preview: Option<PreviewReference>,
    phase: Phase,
    /// Identifier was cleared while a request was in flight
    clear_pending: bool,
    placeholder_url: String,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER_URL)
    }
}

impl WorkflowState {
    pub fn new(placeholder_url: impl Into<String>) -> Self {
        Self {
            identifier: Identifier::default(),
            student: None,
            image: None,
            preview: None,
            phase: Phase::Idle,
            clear_pending: false,
            placeholder_url: placeholder_url.into(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn student(&self) -> Option<&ResolvedStudent> {
        self.student.as_ref()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.student.as_ref().map(|s| s.display_name.as_str())
    }

    pub fn greeting(&self) -> Option<String> {
        self.student.as_ref().map(ResolvedStudent::greeting)
    }

    pub fn image(&self) -> Option<&SelectedImage> {
        self.image.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewReference> {
        self.preview.as_ref()
    }

    pub fn placeholder_url(&self) -> &str {
        &self.placeholder_url
    }

    pub fn in_flight(&self) -> bool {
        matches!(self.phase, Phase::Resolving | Phase::Submitting)
    }

    pub fn can_resolve(&self) -> bool {
        !self.identifier.is_empty() && !self.in_flight()
    }

    /// Upload section visibility: a student is resolved
    pub fn upload_unlocked(&self) -> bool {
        self.student.is_some()
    }

    pub fn can_choose_image(&self) -> bool {
        self.upload_unlocked() && !self.in_flight()
    }

    pub fn can_submit(&self) -> bool {
        self.image.is_some() && !self.in_flight()
    }

    /// Apply an event. Rejected events return the state unchanged.
    pub fn transition(self, event: WorkflowEvent) -> Result<Transition, Rejected> {
        match self.check(&event) {
            Ok(()) => Ok(self.apply(event)),
            Err(error) => Err(Rejected {
                state: self,
                event,
                error,
            }),
        }
    }

    fn check(&self, event: &WorkflowEvent) -> Result<(), TransitionError> {
        match event {
            WorkflowEvent::IdentifierChanged(_) => Ok(()),
            WorkflowEvent::ResolveRequested => {
                if self.in_flight() {
                    Err(TransitionError::RequestInFlight { phase: self.phase })
                } else if self.identifier.is_empty() {
                    Err(TransitionError::EmptyIdentifier)
                } else {
                    Ok(())
                }
            }
            WorkflowEvent::ResolveSucceeded(_) | WorkflowEvent::ResolveFailed(_) => {
                self.expect_phase(Phase::Resolving, event)
            }
            WorkflowEvent::ImageChosen { .. } => {
                if self.in_flight() {
                    Err(TransitionError::RequestInFlight { phase: self.phase })
                } else if !self.upload_unlocked() {
                    Err(TransitionError::UploadLocked)
                } else {
                    Ok(())
                }
            }
            WorkflowEvent::SubmitRequested => {
                if self.in_flight() {
                    Err(TransitionError::RequestInFlight { phase: self.phase })
                } else if self.image.is_none() {
                    Err(TransitionError::NoImageSelected)
                } else {
                    Ok(())
                }
            }
            WorkflowEvent::SubmitSucceeded(_) | WorkflowEvent::SubmitFailed(_) => {
                self.expect_phase(Phase::Submitting, event)
            }
        }
    }

    fn expect_phase(&self, expected: Phase, event: &WorkflowEvent) -> Result<(), TransitionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(TransitionError::InvalidTransition {
                phase: self.phase,
                event: event.kind(),
            })
        }
    }

    fn apply(mut self, event: WorkflowEvent) -> Transition {
        let from = self.phase;
        let kind = event.kind();
        let mut effects = Vec::new();

        match event {
            WorkflowEvent::IdentifierChanged(text) => {
                self.identifier = Identifier::new(text);
                if self.identifier.is_empty() {
                    if self.in_flight() {
                        self.clear_pending = true;
                    } else {
                        self.reset(&mut effects);
                    }
                }
            }
            WorkflowEvent::ResolveRequested => {
                self.phase = Phase::Resolving;
                effects.push(Effect::FetchStudent {
                    identifier: self.identifier.clone(),
                });
            }
            WorkflowEvent::ResolveSucceeded(student) => {
                if self.clear_pending {
                    self.reset(&mut effects);
                } else {
                    self.student = Some(student);
                    self.phase = self.settled_phase();
                }
            }
            WorkflowEvent::ResolveFailed(reason) => {
                warn!(
                    identifier = %self.identifier,
                    not_found = reason.is_not_found(),
                    error = %reason,
                    "Student lookup failed"
                );
                self.reset(&mut effects);
            }
            WorkflowEvent::ImageChosen { image, preview } => {
                self.release_preview(&mut effects);
                self.image = Some(image);
                self.preview = Some(preview);
                self.phase = Phase::ImageSelected;
            }
            WorkflowEvent::SubmitRequested => {
                self.phase = Phase::Submitting;
                effects.push(Effect::UploadSlip);
            }
            WorkflowEvent::SubmitSucceeded(ack) => {
                info!(status = ack.status, "Slip accepted by backend");
                self.image = None;
                self.release_preview(&mut effects);
                self.preview = Some(PreviewReference::Placeholder {
                    url: self.placeholder_url.clone(),
                });
                if self.clear_pending {
                    self.reset(&mut effects);
                } else {
                    self.phase = Phase::Submitted;
                }
            }
            WorkflowEvent::SubmitFailed(reason) => {
                warn!(error = %reason, "Slip upload failed");
                effects.push(Effect::Alert(UPLOAD_FAILED_ALERT.to_string()));
                if self.clear_pending {
                    self.reset(&mut effects);
                } else {
                    self.phase = Phase::ImageSelected;
                }
            }
        }

        if from != self.phase {
            info!(from = %from, to = %self.phase, event = %kind, "Workflow transition");
        }

        Transition {
            from,
            state: self,
            effects,
        }
    }

    /// Phase implied by the data once nothing is in flight
    fn settled_phase(&self) -> Phase {
        match (&self.student, &self.image, &self.preview) {
            (None, _, _) => Phase::Idle,
            (Some(_), Some(_), _) => Phase::ImageSelected,
            (Some(_), None, Some(preview)) if preview.is_placeholder() => Phase::Submitted,
            (Some(_), None, _) => Phase::Resolved,
        }
    }

    fn release_preview(&mut self, effects: &mut Vec<Effect>) {
        if let Some(PreviewReference::Local { handle, .. }) = self.preview.take() {
            effects.push(Effect::ReleasePreview(handle));
        }
    }

    fn reset(&mut self, effects: &mut Vec<Effect>) {
        self.student = None;
        self.image = None;
        self.release_preview(effects);
        self.phase = Phase::Idle;
        self.clear_pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::png;

    fn local_preview(name: &str) -> PreviewReference {
        PreviewReference::Local {
            handle: PreviewHandle::new(format!("blob:slipcheck/{name}")),
            file_name: name.to_string(),
        }
    }

    fn step(state: WorkflowState, event: WorkflowEvent) -> (WorkflowState, Vec<Effect>) {
        let transition = state.transition(event).unwrap();
        (transition.state, transition.effects)
    }

    fn resolved(name: &str) -> WorkflowState {
        let (state, _) = step(WorkflowState::default(), WorkflowEvent::IdentifierChanged("6500".into()));
        let (state, _) = step(state, WorkflowEvent::ResolveRequested);
        let (state, _) = step(
            state,
            WorkflowEvent::ResolveSucceeded(ResolvedStudent::new("6500".into(), name)),
        );
        state
    }

    fn with_image(state: WorkflowState, name: &str) -> WorkflowState {
        step(
            state,
            WorkflowEvent::ImageChosen {
                image: png(name),
                preview: local_preview(name),
            },
        )
        .0
    }

    #[test]
    fn test_initial_state_is_idle_and_locked() {
        let state = WorkflowState::default();
        assert_eq!(state.phase(), Phase::Idle);
        assert!(!state.can_resolve());
        assert!(!state.upload_unlocked());
        assert!(!state.can_submit());
        assert_eq!(state.placeholder_url(), DEFAULT_PLACEHOLDER_URL);
    }

    #[test]
    fn test_resolve_request_emits_fetch() {
        let (state, _) = step(WorkflowState::default(), WorkflowEvent::IdentifierChanged("6500".into()));
        assert!(state.can_resolve());

        let (state, effects) = step(state, WorkflowEvent::ResolveRequested);
        assert_eq!(state.phase(), Phase::Resolving);
        assert_eq!(
            effects,
            vec![Effect::FetchStudent {
                identifier: Identifier::from("6500")
            }]
        );
        assert!(!state.can_resolve());
    }

    #[test]
    fn test_empty_identifier_cannot_resolve() {
        let rejected = WorkflowState::default()
            .transition(WorkflowEvent::ResolveRequested)
            .unwrap_err();
        assert_eq!(rejected.error, TransitionError::EmptyIdentifier);
        assert_eq!(rejected.state.phase(), Phase::Idle);
    }

    #[test]
    fn test_second_resolve_while_in_flight_is_rejected() {
        let (state, _) = step(WorkflowState::default(), WorkflowEvent::IdentifierChanged("6500".into()));
        let (state, _) = step(state, WorkflowEvent::ResolveRequested);

        let rejected = state.transition(WorkflowEvent::ResolveRequested).unwrap_err();
        assert_eq!(
            rejected.error,
            TransitionError::RequestInFlight {
                phase: Phase::Resolving
            }
        );
        assert_eq!(rejected.state.phase(), Phase::Resolving);
    }

    #[test]
    fn test_successful_resolve_unlocks_upload() {
        let state = resolved("Somchai");
        assert_eq!(state.phase(), Phase::Resolved);
        assert_eq!(state.display_name(), Some("Somchai"));
        assert_eq!(state.greeting().as_deref(), Some("สวัสดี น้อง Somchai"));
        assert!(state.upload_unlocked());
        assert!(state.can_choose_image());
        assert!(!state.can_submit());
    }

    #[test]
    fn test_failed_resolve_returns_to_idle() {
        let (state, _) = step(WorkflowState::default(), WorkflowEvent::IdentifierChanged("0000".into()));
        let (state, _) = step(state, WorkflowEvent::ResolveRequested);
        let (state, effects) = step(state, WorkflowEvent::ResolveFailed(LookupError::Rejected { status: 500 }));

        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.student().is_none());
        assert!(!state.upload_unlocked());
        assert!(effects.is_empty());
        // identifier text survives so the user can resubmit it
        assert_eq!(state.identifier().as_str(), "0000");
        assert!(state.can_resolve());
    }

    #[test]
    fn test_failed_re_resolve_drops_image_and_releases_preview() {
        let state = with_image(resolved("Somchai"), "slip.png");
        let (state, _) = step(state, WorkflowEvent::ResolveRequested);
        let (state, effects) = step(
            state,
            WorkflowEvent::ResolveFailed(LookupError::NotFound {
                identifier: "6500".into(),
            }),
        );

        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.image().is_none());
        assert!(state.preview().is_none());
        assert_eq!(
            effects,
            vec![Effect::ReleasePreview(PreviewHandle::new("blob:slipcheck/slip.png".into()))]
        );
    }

    #[test]
    fn test_image_choice_requires_resolved_student() {
        let rejected = WorkflowState::default()
            .transition(WorkflowEvent::ImageChosen {
                image: png("slip.png"),
                preview: local_preview("slip.png"),
            })
            .unwrap_err();
        assert_eq!(rejected.error, TransitionError::UploadLocked);
        assert!(matches!(rejected.event, WorkflowEvent::ImageChosen { .. }));
    }

    #[test]
    fn test_new_selection_releases_previous_preview() {
        let state = with_image(resolved("Somchai"), "first.png");
        let (state, effects) = step(
            state,
            WorkflowEvent::ImageChosen {
                image: png("second.png"),
                preview: local_preview("second.png"),
            },
        );

        assert_eq!(
            effects,
            vec![Effect::ReleasePreview(PreviewHandle::new("blob:slipcheck/first.png".into()))]
        );
        assert_eq!(state.image().unwrap().file_name(), "second.png");
        assert_eq!(state.preview().unwrap().src(), "blob:slipcheck/second.png");
    }

    #[test]
    fn test_submit_requires_image() {
        let rejected = resolved("Somchai")
            .transition(WorkflowEvent::SubmitRequested)
            .unwrap_err();
        assert_eq!(rejected.error, TransitionError::NoImageSelected);
        assert_eq!(rejected.state.phase(), Phase::Resolved);
    }

    #[test]
    fn test_reentrant_submit_is_rejected() {
        let state = with_image(resolved("Somchai"), "slip.png");
        let (state, effects) = step(state, WorkflowEvent::SubmitRequested);
        assert_eq!(effects, vec![Effect::UploadSlip]);
        assert_eq!(state.phase(), Phase::Submitting);
        assert!(!state.can_submit());

        let rejected = state.transition(WorkflowEvent::SubmitRequested).unwrap_err();
        assert_eq!(
            rejected.error,
            TransitionError::RequestInFlight {
                phase: Phase::Submitting
            }
        );
    }

    #[test]
    fn test_successful_submit_swaps_in_placeholder() {
        let state = with_image(resolved("Somchai"), "slip.png");
        let (state, _) = step(state, WorkflowEvent::SubmitRequested);
        let (state, effects) = step(
            state,
            WorkflowEvent::SubmitSucceeded(SlipAck {
                status: 200,
                body: "ok".into(),
            }),
        );

        assert_eq!(state.phase(), Phase::Submitted);
        assert!(state.image().is_none());
        assert_eq!(state.preview().unwrap().src(), DEFAULT_PLACEHOLDER_URL);
        assert!(state.upload_unlocked());
        assert!(!state.can_submit());
        assert_eq!(
            effects,
            vec![Effect::ReleasePreview(PreviewHandle::new("blob:slipcheck/slip.png".into()))]
        );

        // a fresh selection goes straight back to ImageSelected
        let state = with_image(state, "again.png");
        assert_eq!(state.phase(), Phase::ImageSelected);
    }

    #[test]
    fn test_failed_submit_keeps_image_and_alerts() {
        let state = with_image(resolved("Somchai"), "slip.png");
        let (state, _) = step(state, WorkflowEvent::SubmitRequested);
        let (state, effects) = step(
            state,
            WorkflowEvent::SubmitFailed(UploadError::Rejected {
                status: 500,
                body: String::new(),
            }),
        );

        assert_eq!(state.phase(), Phase::ImageSelected);
        assert_eq!(state.image().unwrap().file_name(), "slip.png");
        assert_eq!(state.preview().unwrap().src(), "blob:slipcheck/slip.png");
        assert_eq!(effects, vec![Effect::Alert(UPLOAD_FAILED_ALERT.to_string())]);
        assert!(state.can_submit());
    }

    #[test]
    fn test_clearing_identifier_resets_everything() {
        let state = with_image(resolved("Somchai"), "slip.png");
        let (state, effects) = step(state, WorkflowEvent::IdentifierChanged(String::new()));

        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.student().is_none());
        assert!(state.image().is_none());
        assert_eq!(effects.len(), 1);
    }

    #[test]
    fn test_editing_identifier_keeps_resolved_student() {
        let (state, effects) = step(resolved("Somchai"), WorkflowEvent::IdentifierChanged("6501".into()));
        assert!(effects.is_empty());
        assert_eq!(state.phase(), Phase::Resolved);
        assert_eq!(state.display_name(), Some("Somchai"));
    }

    #[test]
    fn test_clear_during_lookup_discards_result() {
        let (state, _) = step(WorkflowState::default(), WorkflowEvent::IdentifierChanged("6500".into()));
        let (state, _) = step(state, WorkflowEvent::ResolveRequested);
        let (state, _) = step(state, WorkflowEvent::IdentifierChanged(String::new()));
        assert_eq!(state.phase(), Phase::Resolving);

        let (state, _) = step(
            state,
            WorkflowEvent::ResolveSucceeded(ResolvedStudent::new("6500".into(), "Somchai")),
        );
        assert_eq!(state.phase(), Phase::Idle);
        assert!(!state.upload_unlocked());
    }

    #[test]
    fn test_clear_during_upload_resets_after_completion() {
        let state = with_image(resolved("Somchai"), "slip.png");
        let (state, _) = step(state, WorkflowEvent::SubmitRequested);
        let (state, _) = step(state, WorkflowEvent::IdentifierChanged(String::new()));
        assert!(state.image().is_some());

        let (state, effects) = step(
            state,
            WorkflowEvent::SubmitFailed(UploadError::Network("reset".into())),
        );
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.image().is_none());
        assert!(effects.contains(&Effect::Alert(UPLOAD_FAILED_ALERT.to_string())));
        assert!(effects
            .iter()
            .any(|effect| matches!(effect, Effect::ReleasePreview(_))));
    }

    #[test]
    fn test_stale_completion_is_rejected() {
        let rejected = resolved("Somchai")
            .transition(WorkflowEvent::SubmitSucceeded(SlipAck {
                status: 200,
                body: String::new(),
            }))
            .unwrap_err();
        assert_eq!(
            rejected.error,
            TransitionError::InvalidTransition {
                phase: Phase::Resolved,
                event: EventKind::SubmitSucceeded
            }
        );
    }

    #[test]
    fn test_re_resolve_keeps_selected_image() {
        let state = with_image(resolved("Somchai"), "slip.png");
        let (state, _) = step(state, WorkflowEvent::ResolveRequested);
        assert!(!state.can_choose_image());
        let (state, _) = step(
            state,
            WorkflowEvent::ResolveSucceeded(ResolvedStudent::new("6500".into(), "Somsri")),
        );
        assert_eq!(state.phase(), Phase::ImageSelected);
        assert_eq!(state.display_name(), Some("Somsri"));
    }
}
