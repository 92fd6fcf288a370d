use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub struct BuildEvent {
    pub repository_url: Option<String>,
    pub branch: Option<String>,
    pub commit_hash: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Ext,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MaterialType {
    Git,
}

/// Body of the webhook request. Fields are fixed at construction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    docker_image: String,
    digest: String,
    data_source: DataSource,
    material_type: MaterialType,
}

impl NotificationPayload {
    pub fn new(
        docker_image: &str,
        digest: &str,
        data_source: DataSource,
        material_type: MaterialType,
    ) -> NotificationPayload {
        NotificationPayload {
            docker_image: docker_image.to_string(),
            digest: digest.to_string(),
            data_source,
            material_type,
        }
    }

    /// Payload reporting the target's image as an externally built git artifact.
    pub fn for_target(target: &WebhookTarget, digest: &str) -> NotificationPayload {
        NotificationPayload::new(&target.image_tag, digest, DataSource::Ext, MaterialType::Git)
    }

    pub fn docker_image(&self) -> &str {
        &self.docker_image
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn data_source(&self) -> DataSource {
        self.data_source
    }

    pub fn material_type(&self) -> MaterialType {
        self.material_type
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct WebhookTarget {
    pub url: String,
    pub api_token: String,
    pub image_tag: String,
}

impl fmt::Debug for WebhookTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookTarget")
            .field("url", &self.url)
            .field("api_token", &"<redacted>")
            .field("image_tag", &self.image_tag)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Success,
    HttpError,
    TransportError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResult {
    pub status_code: Option<u16>,
    pub response_body: Option<String>,
    pub outcome: DeliveryOutcome,
}

pub enum TriggerKind {
    BuildCompleted { environment: HashMap<String, String> },
    BuildStep,
}

pub struct Trigger {
    pub id: String,
    pub kind: TriggerKind,
    pub target: WebhookTarget,
    pub payload: NotificationPayload,
}
