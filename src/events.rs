
use crate::config::Config;
use crate::entities::{BuildEvent, NotificationPayload, Trigger, TriggerKind, WebhookTarget};
use crate::{Request, RequestType};
use lambda_runtime::{Error, LambdaEvent};
use simple_error::simple_error;
use std::collections::HashMap;

pub const GIT_URL: &str = "GIT_URL";
pub const GIT_BRANCH: &str = "GIT_BRANCH";
pub const GIT_COMMIT: &str = "GIT_COMMIT";

#[derive(Debug)]
pub enum EventProcessingError {
    EventValidationError(String),
}

/// Reads the source-control details out of a build environment.
/// Keys that are missing stay `None`.
pub fn extract_build_event(environment: &HashMap<String, String>) -> BuildEvent {
    BuildEvent {
        repository_url: environment.get(GIT_URL).cloned(),
        branch: environment.get(GIT_BRANCH).cloned(),
        commit_hash: environment.get(GIT_COMMIT).cloned(),
    }
}

pub fn process_input_event(
    request: Request,
    config: &Config,
) -> Result<Trigger, EventProcessingError> {
    if request.build_id.trim().is_empty() {
        return Err(EventProcessingError::EventValidationError(String::from(
            "Build id must not be empty.",
        )));
    }
    let image_tag = request
        .image_tag
        .unwrap_or_else(|| config.image_tag.to_string());
    if image_tag.trim().is_empty() {
        return Err(EventProcessingError::EventValidationError(format!(
            "Image tag resolved to an empty value for build {}",
            &request.build_id
        )));
    }
    let digest = request
        .digest
        .unwrap_or_else(|| config.image_digest.to_string());
    if digest.trim().is_empty() {
        return Err(EventProcessingError::EventValidationError(format!(
            "Image digest resolved to an empty value for build {}",
            &request.build_id
        )));
    }
    let target = WebhookTarget {
        url: config.webhook_url.to_string(),
        api_token: config.api_token.to_string(),
        image_tag,
    };
    let payload = NotificationPayload::for_target(&target, &digest);
    let kind = match request.kind {
        RequestType::BuildCompleted => TriggerKind::BuildCompleted {
            environment: request.environment,
        },
        RequestType::BuildStep => TriggerKind::BuildStep,
    };
    Ok(Trigger {
        id: request.build_id,
        kind,
        target,
        payload,
    })
}

pub fn process_lambda_event(
    event: LambdaEvent<Request>,
    config: &Config,
) -> Result<Trigger, Error> {
    let trigger = process_input_event(event.payload, config)
        .map_err(|e| Box::new(simple_error!(&format!("{:?}", e))))?;
    Ok(trigger)
}
