// Slip verification workflow
//
// Pure state transitions (`state`) interpreted by a session (`session`) that
// owns the backend and the preview handles.

pub mod preview;
pub mod session;
pub mod state;

#[cfg(test)]
pub mod mocks;


pub use preview::{PreviewEntry, PreviewRegistry};
pub use session::{ResolveOutcome, SessionError, SubmitOutcome, TransitionRecord, WorkflowSession};
pub use state::{
    Effect, EventKind, Phase, Rejected, Transition, TransitionError, WorkflowEvent, WorkflowState,
    DEFAULT_PLACEHOLDER_URL, UPLOAD_FAILED_ALERT,
};
