/// Report delivery adapters
///
/// This module handles:
/// - Storing the rendered workbook somewhere the recipient can reach it
/// - Granting read access to the stored file
/// - Notifying the downstream workflow that a report is ready
///
/// Delivery is best-effort: there is no retry, and the pipeline logs any
/// failure instead of failing the request.
use crate::config::DeliverySettings;
use crate::error::DeliveryError;
use log::debug;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const USER_AGENT: &str = concat!("gem-report/", env!("CARGO_PKG_VERSION"));

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// A rendered report ready for handoff
#[derive(Debug, Clone)]
pub struct Artifact {
    pub name: String,
    pub bytes: Vec<u8>,
    /// Where the pipeline already wrote the artifact locally
    pub local_path: PathBuf,
}

/// Catalog metadata sent along with the artifact
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryMetadata {
    pub recipient: String,
    pub artifact_name: String,
}

/// Persists artifacts and announces them
pub trait DeliveryAdapter {
    /// Store the artifact and return an opaque locator for it
    fn store(&self, artifact: &Artifact) -> Result<String, DeliveryError>;

    /// Tell the downstream workflow about a stored artifact
    fn notify(&self, meta: &DeliveryMetadata, locator: &str) -> Result<(), DeliveryError>;
}

/// Leaves the artifact where the pipeline wrote it
#[derive(Debug, Clone, Default)]
pub struct LocalDelivery;

impl DeliveryAdapter for LocalDelivery {
    fn store(&self, artifact: &Artifact) -> Result<String, DeliveryError> {
        Ok(artifact.local_path.display().to_string())
    }

    fn notify(&self, meta: &DeliveryMetadata, locator: &str) -> Result<(), DeliveryError> {
        debug!("Local delivery of {} for {} at {}", meta.artifact_name, meta.recipient, locator);
        Ok(())
    }
}

/// Body returned by the upload endpoint
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UploadResponse {
    pub id: Option<String>,
    pub link: Option<String>,
}

/// Shareable link for an upload: the returned link, else the template filled with the id
pub fn resolve_link(resp: &UploadResponse, link_template: Option<&str>) -> Option<String> {
    if let Some(link) = &resp.link {
        return Some(link.clone());
    }
    match (&resp.id, link_template) {
        (Some(id), Some(template)) => Some(template.replace("{id}", id)),
        _ => None,
    }
}

/// Uploads to an HTTP storage endpoint and posts to a webhook
pub struct HttpDelivery {
    upload_url: String,
    settings: DeliverySettings,
    agent: ureq::Agent,
}

impl HttpDelivery {
    /// Returns None when no upload endpoint is configured
    pub fn from_settings(settings: &DeliverySettings) -> Option<Self> {
        let upload_url = settings.upload_url.clone()?;
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(USER_AGENT)
            .build();
        Some(Self { upload_url, settings: settings.clone(), agent })
    }

    fn share(&self, id: &str) -> Result<(), DeliveryError> {
        let Some(template) = &self.settings.share_url_template else {
            return Ok(());
        };
        let url = template.replace("{id}", id);
        debug!("Granting read access via {}", url);
        self.agent
            .post(&url)
            .send_json(serde_json::json!({ "role": "reader", "type": "anyone" }))
            .map_err(|e| DeliveryError::Share(e.to_string()))?;
        Ok(())
    }
}

impl DeliveryAdapter for HttpDelivery {
    fn store(&self, artifact: &Artifact) -> Result<String, DeliveryError> {
        debug!("Uploading {} ({} bytes) to {}", artifact.name, artifact.bytes.len(), self.upload_url);

        let mut req = self
            .agent
            .post(&self.upload_url)
            .set("Content-Type", XLSX_MIME)
            .set("X-Artifact-Name", &artifact.name);
        if let Some(folder) = &self.settings.folder {
            req = req.query("folder", folder);
        }

        let resp: UploadResponse = req
            .send_bytes(&artifact.bytes)
            .map_err(|e| DeliveryError::Upload(e.to_string()))?
            .into_json()
            .map_err(|e| DeliveryError::Upload(format!("unreadable upload response: {}", e)))?;

        if let Some(id) = &resp.id {
            self.share(id)?;
        }

        resolve_link(&resp, self.settings.link_template.as_deref())
            .ok_or_else(|| DeliveryError::Upload("upload response carried neither a link nor an id".to_string()))
    }

    fn notify(&self, meta: &DeliveryMetadata, locator: &str) -> Result<(), DeliveryError> {
        let Some(url) = &self.settings.webhook_url else {
            return Ok(());
        };
        debug!("Notifying {} about {}", url, meta.artifact_name);
        self.agent
            .post(url)
            .send_json(serde_json::json!({
                "timestamp": chrono::Local::now().to_rfc3339(),
                "recipient": meta.recipient,
                "artifact_name": meta.artifact_name,
                "link": locator,
                "status": "pending",
            }))
            .map_err(|e| DeliveryError::Notify(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "delivery_test.rs"]
mod delivery_test;
