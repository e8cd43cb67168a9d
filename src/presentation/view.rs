use std::fmt::Write as _;

use crate::types::PreviewReference;
use crate::workflow::{Phase, PreviewRegistry, WorkflowState};

pub const TITLE: &str = "Student Payment Verification";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewView {
    pub src: String,
    pub caption: String,
}

/// Everything the screen needs, derived from the workflow state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub identifier: String,
    pub validate_enabled: bool,
    pub greeting: Option<String>,
    pub upload_visible: bool,
    pub choose_enabled: bool,
    pub preview: Option<PreviewView>,
    pub submit_enabled: bool,
    pub busy: Option<&'static str>,
}

impl ViewModel {
    pub fn from_state(state: &WorkflowState, previews: &PreviewRegistry) -> Self {
        let preview = state.preview().map(|preview| match preview {
            PreviewReference::Local { handle, file_name } => {
                let caption = match previews.describe(handle) {
                    Some(entry) => format!(
                        "{} ({}, {})",
                        entry.file_name,
                        entry.content_type,
                        format_size(entry.size)
                    ),
                    None => file_name.clone(),
                };
                PreviewView {
                    src: handle.url().to_string(),
                    caption,
                }
            }
            PreviewReference::Placeholder { url } => PreviewView {
                src: url.clone(),
                caption: "Slip uploaded".to_string(),
            },
        });

        let busy = match state.phase() {
            Phase::Resolving => Some("Validating student ID..."),
            Phase::Submitting => Some("Uploading slip..."),
            _ => None,
        };

        Self {
            identifier: state.identifier().to_string(),
            validate_enabled: state.can_resolve(),
            greeting: state.greeting(),
            upload_visible: state.upload_unlocked(),
            choose_enabled: state.can_choose_image(),
            preview,
            submit_enabled: state.can_submit(),
            busy,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "== {TITLE} ==");
        let _ = writeln!(out, "Student ID: [{}]", self.identifier);
        let _ = writeln!(out, "{}", button("Validate Student ID", self.validate_enabled));

        if let Some(greeting) = &self.greeting {
            let _ = writeln!(out, "{greeting}");
        }

        if self.upload_visible {
            let _ = writeln!(out, "-- Upload Payment Slip --");
            let _ = writeln!(out, "{}", button("Choose Slip Image", self.choose_enabled));
            if let Some(preview) = &self.preview {
                let _ = writeln!(out, "Preview: {} <{}>", preview.caption, preview.src);
            }
            let _ = writeln!(out, "{}", button("Upload Slip", self.submit_enabled));
        }

        if let Some(busy) = self.busy {
            let _ = writeln!(out, "{busy}");
        }
        out
    }
}

fn button(label: &str, enabled: bool) -> String {
    if enabled {
        format!("[ {label} ]")
    } else {
        format!("[ {label} ] (disabled)")
    }
}

fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::png;
    use crate::types::ResolvedStudent;
    use crate::workflow::WorkflowEvent;

    fn apply(state: WorkflowState, event: WorkflowEvent) -> WorkflowState {
        state.transition(event).unwrap().state
    }

    #[test]
    fn test_idle_view_hides_upload_section() {
        let view = ViewModel::from_state(&WorkflowState::default(), &PreviewRegistry::new());
        assert!(!view.validate_enabled);
        assert!(!view.upload_visible);
        assert_eq!(view.greeting, None);

        let text = view.render();
        assert!(text.contains(TITLE));
        assert!(text.contains("[ Validate Student ID ] (disabled)"));
        assert!(!text.contains("Upload Payment Slip"));
    }

    #[test]
    fn test_resolved_view_shows_greeting_and_upload() {
        let state = apply(WorkflowState::default(), WorkflowEvent::IdentifierChanged("6500".into()));
        let state = apply(state, WorkflowEvent::ResolveRequested);
        let resolving = ViewModel::from_state(&state, &PreviewRegistry::new());
        assert_eq!(resolving.busy, Some("Validating student ID..."));
        assert!(!resolving.validate_enabled);

        let state = apply(
            state,
            WorkflowEvent::ResolveSucceeded(ResolvedStudent::new("6500".into(), "Somchai")),
        );
        let view = ViewModel::from_state(&state, &PreviewRegistry::new());
        assert!(view.upload_visible);
        assert!(!view.submit_enabled);

        let text = view.render();
        assert!(text.contains("สวัสดี น้อง Somchai"));
        assert!(text.contains("-- Upload Payment Slip --"));
        assert!(text.contains("[ Upload Slip ] (disabled)"));
    }

    #[test]
    fn test_local_preview_caption_comes_from_registry() {
        let mut previews = PreviewRegistry::new();
        let image = png("slip.png");
        let preview = previews.create(&image);

        let state = apply(WorkflowState::default(), WorkflowEvent::IdentifierChanged("6500".into()));
        let state = apply(state, WorkflowEvent::ResolveRequested);
        let state = apply(
            state,
            WorkflowEvent::ResolveSucceeded(ResolvedStudent::new("6500".into(), "Somchai")),
        );
        let state = apply(state, WorkflowEvent::ImageChosen { image, preview });

        let view = ViewModel::from_state(&state, &previews);
        let preview = view.preview.unwrap();
        assert!(preview.src.starts_with("blob:slipcheck/"));
        assert_eq!(preview.caption, "slip.png (image/png, 20 B)");
        assert!(view.submit_enabled);
    }

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KiB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MiB");
    }
}
