// Seam between the workflow and the remote verification service

use async_trait::async_trait;

use crate::client::errors::{LookupError, UploadError};
use crate::types::{Identifier, ResolvedStudent, SelectedImage, SlipAck};

/// The two calls the workflow makes against the backend.
///
/// Implementations perform network I/O only and never touch workflow state.
/// Each call is a single attempt: there is no retry and no timeout.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SlipBackend: Send + Sync {
    /// Map an identifier to the student's display name
    async fn resolve_student(&self, identifier: &Identifier) -> Result<ResolvedStudent, LookupError>;

    /// Upload a slip image for later verification
    async fn submit_slip(&self, image: &SelectedImage) -> Result<SlipAck, UploadError>;
}
