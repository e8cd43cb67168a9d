// slipcheck library: student lookup and payment-slip upload workflow
// This exposes the core components for testing and integration

pub mod cli;
pub mod client;
pub mod config;
pub mod presentation;
pub mod telemetry;
pub mod types;
pub mod workflow;

// Re-export key types for easy access
pub use client::{ClientError, HttpSlipBackend, LookupError, SlipBackend, UploadError};
pub use config::SlipCheckConfig;
pub use telemetry::{create_action_span, generate_correlation_id, init_telemetry};
pub use types::{Identifier, PreviewHandle, PreviewReference, ResolvedStudent, SelectedImage, SlipAck};
pub use workflow::{
    Effect, Phase, ResolveOutcome, SessionError, SubmitOutcome, Transition, TransitionError,
    WorkflowEvent, WorkflowSession, WorkflowState,
};
