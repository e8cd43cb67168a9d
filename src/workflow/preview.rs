// Local preview handles, modelled on browser object URLs

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use crate::types::{PreviewHandle, PreviewReference, SelectedImage};

const HANDLE_SCHEME: &str = "blob:slipcheck/";

/// What a live preview handle renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewEntry {
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
    pub created_at: DateTime<Utc>,
}

/// Owns every live preview handle of a session.
///
/// A handle stays live until it is revoked; the session revokes the previous
/// handle whenever a new one supersedes it.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    live: HashMap<PreviewHandle, PreviewEntry>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a local preview for the image and register its handle
    pub fn create(&mut self, image: &SelectedImage) -> PreviewReference {
        let handle = PreviewHandle::new(format!("{HANDLE_SCHEME}{}", Uuid::new_v4()));
        self.live.insert(
            handle.clone(),
            PreviewEntry {
                file_name: image.file_name().to_string(),
                content_type: image.content_type().to_string(),
                size: image.len(),
                created_at: Utc::now(),
            },
        );
        debug!(handle = %handle, file_name = image.file_name(), "Preview created");

        PreviewReference::Local {
            handle,
            file_name: image.file_name().to_string(),
        }
    }

    /// Release a handle. Returns false if it was not live.
    pub fn revoke(&mut self, handle: &PreviewHandle) -> bool {
        let released = self.live.remove(handle).is_some();
        debug!(handle = %handle, released, "Preview revoked");
        released
    }

    pub fn describe(&self, handle: &PreviewHandle) -> Option<&PreviewEntry> {
        self.live.get(handle)
    }

    pub fn is_live(&self, handle: &PreviewHandle) -> bool {
        self.live.contains_key(handle)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::png;

    #[test]
    fn test_create_registers_unique_live_handles() {
        let mut registry = PreviewRegistry::new();
        let first = registry.create(&png("a.png"));
        let second = registry.create(&png("b.png"));

        let (first, second) = (first.local_handle().unwrap(), second.local_handle().unwrap());
        assert_ne!(first, second);
        assert!(first.url().starts_with("blob:slipcheck/"));
        assert_eq!(registry.live_count(), 2);
        assert_eq!(registry.describe(second).unwrap().file_name, "b.png");
    }

    #[test]
    fn test_revoke_releases_once() {
        let mut registry = PreviewRegistry::new();
        let preview = registry.create(&png("slip.png"));
        let handle = preview.local_handle().unwrap();

        assert!(registry.revoke(handle));
        assert!(!registry.is_live(handle));
        assert!(!registry.revoke(handle));
        assert_eq!(registry.live_count(), 0);
    }
}
