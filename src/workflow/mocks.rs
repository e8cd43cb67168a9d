// Scripted backend for scenario tests - no network, records every call

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::client::{LookupError, SlipBackend, UploadError};
use crate::types::{Identifier, ResolvedStudent, SelectedImage, SlipAck};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    ResolveStudent { identifier: String },
    SubmitSlip { file_name: String, bytes: usize },
}

/// Backend whose answers are set up ahead of time.
///
/// Unknown identifiers resolve to `NotFound`; uploads are answered from a
/// queue and default to HTTP 200 once it runs dry.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    students: Mutex<HashMap<String, Result<String, LookupError>>>,
    uploads: Mutex<VecDeque<Result<SlipAck, UploadError>>>,
    calls: Mutex<Vec<BackendCall>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_student(self, identifier: &str, first_name: &str) -> Self {
        self.students
            .lock()
            .unwrap()
            .insert(identifier.to_string(), Ok(first_name.to_string()));
        self
    }

    pub fn with_lookup_failure(self, identifier: &str, error: LookupError) -> Self {
        self.students
            .lock()
            .unwrap()
            .insert(identifier.to_string(), Err(error));
        self
    }

    pub fn with_upload_status(self, status: u16) -> Self {
        let result = if (200..300).contains(&status) {
            Ok(SlipAck {
                status,
                body: String::new(),
            })
        } else {
            Err(UploadError::Rejected {
                status,
                body: String::new(),
            })
        };
        self.uploads.lock().unwrap().push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn upload_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, BackendCall::SubmitSlip { .. }))
            .count()
    }
}

#[async_trait]
impl SlipBackend for ScriptedBackend {
    async fn resolve_student(&self, identifier: &Identifier) -> Result<ResolvedStudent, LookupError> {
        self.calls.lock().unwrap().push(BackendCall::ResolveStudent {
            identifier: identifier.to_string(),
        });

        match self.students.lock().unwrap().get(identifier.as_str()) {
            Some(Ok(name)) => Ok(ResolvedStudent::new(identifier.clone(), name.clone())),
            Some(Err(e)) => Err(e.clone()),
            None => Err(LookupError::NotFound {
                identifier: identifier.to_string(),
            }),
        }
    }

    async fn submit_slip(&self, image: &SelectedImage) -> Result<SlipAck, UploadError> {
        self.calls.lock().unwrap().push(BackendCall::SubmitSlip {
            file_name: image.file_name().to_string(),
            bytes: image.len(),
        });

        self.uploads.lock().unwrap().pop_front().unwrap_or(Ok(SlipAck {
            status: 200,
            body: String::new(),
        }))
    }
}
