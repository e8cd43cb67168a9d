use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::client::backend::SlipBackend;
use crate::client::errors::{ClientError, LookupError, UploadError};
use crate::types::{Identifier, ResolvedStudent, SelectedImage, SlipAck};

/// Multipart field the backend reads the slip from
pub const SLIP_FIELD: &str = "file";

/// Shape of `GET /student/{id}`; only `firstName` is read
#[derive(Debug, Deserialize)]
struct StudentRecord {
    #[serde(rename = "firstName")]
    first_name: String,
}

/// HTTP implementation of [`SlipBackend`] rooted at a configurable base URL
#[derive(Debug, Clone)]
pub struct HttpSlipBackend {
    client: Client,
    base_url: Url,
}

impl HttpSlipBackend {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "URL cannot carry a path".to_string(),
            });
        }

        let client = Client::builder()
            .user_agent(concat!("slipcheck/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL, percent-encoding each one.
    /// Dot-only segments are dropped by URL normalization; see [`is_addressable`].
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Whether a value survives as its own path segment
pub fn is_addressable(segment: &str) -> bool {
    !matches!(segment, "." | "..")
}

#[async_trait]
impl SlipBackend for HttpSlipBackend {
    async fn resolve_student(&self, identifier: &Identifier) -> Result<ResolvedStudent, LookupError> {
        if !is_addressable(identifier.as_str()) {
            warn!(identifier = %identifier, "Student ID cannot be addressed; no request sent");
            return Err(LookupError::Unaddressable {
                identifier: identifier.to_string(),
            });
        }

        let url = self.endpoint(&["student", identifier.as_str()]);
        debug!(%url, "Looking up student");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound {
                identifier: identifier.to_string(),
            });
        }
        if !status.is_success() {
            warn!(status = %status, identifier = %identifier, "Student lookup rejected");
            return Err(LookupError::Rejected {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;
        let record: StudentRecord =
            serde_json::from_slice(&body).map_err(|e| LookupError::InvalidBody(e.to_string()))?;
        if record.first_name.is_empty() {
            return Err(LookupError::InvalidBody("empty firstName".to_string()));
        }

        info!(identifier = %identifier, "Student resolved");
        Ok(ResolvedStudent::new(identifier.clone(), record.first_name))
    }

    async fn submit_slip(&self, image: &SelectedImage) -> Result<SlipAck, UploadError> {
        let url = self.endpoint(&["checkslip"]);
        let part = Part::bytes(image.bytes().to_vec())
            .file_name(image.file_name().to_string())
            .mime_str(image.content_type())
            .map_err(|e| UploadError::Encoding(e.to_string()))?;
        let form = Form::new().part(SLIP_FIELD, part);

        debug!(
            %url,
            file_name = image.file_name(),
            bytes = image.len(),
            "Uploading slip"
        );

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            warn!(status = %status, "Slip upload rejected");
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(status = %status, file_name = image.file_name(), "Slip uploaded");
        Ok(SlipAck {
            status: status.as_u16(),
            body,
        })
    }
}
