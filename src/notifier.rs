pub mod dispatch;

use crate::entities::{
    BuildEvent, DeliveryOutcome, DeliveryResult, NotificationPayload, Trigger, TriggerKind,
    WebhookTarget,
};
use crate::events::extract_build_event;
use dispatch::remote::build_client;
use dispatch::{deliver, DispatchError};
use reqwest::Client;
use std::collections::HashMap;
use std::future::Future;
use std::io::Write;
use std::time::Duration;
use tracing::{event, Level};

const DELIMITER: &str = "------------------";
const DEPLOYMENT_MARKER: &str = "start-point-for-deployment";

fn log_line<W: Write>(console: &mut W, line: &str) {
    if let Err(e) = writeln!(console, "{}", line) {
        event!(Level::WARN, "Failed to write to build console: {:?}", e);
    }
}

fn or_null(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("null")
}

fn log_build_event<W: Write>(build_event: &BuildEvent, console: &mut W) {
    event!(
        Level::INFO,
        repository_url = or_null(&build_event.repository_url),
        branch = or_null(&build_event.branch),
        commit_hash = or_null(&build_event.commit_hash),
        "build completed"
    );
    log_line(console, DELIMITER);
    log_line(
        console,
        &format!("Git Repository URL: {}", or_null(&build_event.repository_url)),
    );
    log_line(console, DELIMITER);
    log_line(console, &format!("Branch: {}", or_null(&build_event.branch)));
    log_line(console, DELIMITER);
    log_line(
        console,
        &format!("Commit Hash: {}", or_null(&build_event.commit_hash)),
    );
    log_line(console, DELIMITER);
    log_line(console, DEPLOYMENT_MARKER);
}

// Every dispatch failure ends here; none of them reach the build.
fn report_delivery<W: Write>(result: Result<DeliveryResult, DispatchError>, console: &mut W) {
    match result {
        Ok(DeliveryResult {
            outcome: DeliveryOutcome::Success,
            status_code,
            response_body,
        }) => {
            let body = response_body.unwrap_or_default();
            event!(Level::INFO, "Webhook delivered. Response: {}", &body);
            if let Some(code) = status_code {
                log_line(console, &format!("Response code: {}", code));
            }
            log_line(console, &format!("Response: {}", body));
        }
        Ok(DeliveryResult {
            outcome: DeliveryOutcome::HttpError,
            status_code,
            ..
        }) => {
            let code = status_code.map_or(String::from("unknown"), |code| code.to_string());
            event!(Level::WARN, "Webhook rejected with response code {}", &code);
            log_line(
                console,
                &format!("Failed to send webhook request. Response code: {}", code),
            );
        }
        Ok(DeliveryResult {
            outcome: DeliveryOutcome::TransportError(reason),
            ..
        }) => {
            event!(Level::WARN, "Webhook delivery failed: {}", &reason);
            log_line(
                console,
                &format!("Failed to send webhook request: {}", reason),
            );
        }
        Err(error) => {
            event!(Level::ERROR, "Webhook configuration rejected: {:?}", &error);
            log_line(
                console,
                &format!("Invalid webhook configuration: {:?}", error),
            );
        }
    }
}

async fn notify_build_completed<W, F, FutF>(
    environment: &HashMap<String, String>,
    target: WebhookTarget,
    payload: NotificationPayload,
    console: &mut W,
    deliver_fn: F,
) where
    W: Write,
    F: FnOnce(WebhookTarget, NotificationPayload) -> FutF,
    FutF: Future<Output = Result<DeliveryResult, DispatchError>>,
{
    let build_event = extract_build_event(environment);
    log_build_event(&build_event, console);
    notify_build_step(target, payload, console, deliver_fn).await
}

async fn notify_build_step<W, F, FutF>(
    target: WebhookTarget,
    payload: NotificationPayload,
    console: &mut W,
    deliver_fn: F,
) where
    W: Write,
    F: FnOnce(WebhookTarget, NotificationPayload) -> FutF,
    FutF: Future<Output = Result<DeliveryResult, DispatchError>>,
{
    let result = deliver_fn(target, payload).await;
    report_delivery(result, console);
}

/// Entry point for the host build system once a build has finished.
///
/// Logs the source-control details found in `environment`, then sends one
/// notification. Delivery problems are logged and never returned.
pub async fn on_build_completed<W: Write>(
    environment: &HashMap<String, String>,
    target: WebhookTarget,
    payload: NotificationPayload,
    client: &Client,
    console: &mut W,
) {
    let deliver_fn = |target, payload| async move { deliver(target, payload, client).await };
    notify_build_completed(environment, target, payload, console, deliver_fn).await
}

/// Sends one notification from an explicit build step, without reading the
/// build environment.
pub async fn on_build_step<W: Write>(
    target: WebhookTarget,
    payload: NotificationPayload,
    client: &Client,
    console: &mut W,
) {
    let deliver_fn = |target, payload| async move { deliver(target, payload, client).await };
    notify_build_step(target, payload, console, deliver_fn).await
}

async fn route_trigger<W: Write>(
    trigger: Trigger,
    client: Result<Client, DispatchError>,
    console: &mut W,
) {
    match (trigger.kind, client) {
        (TriggerKind::BuildCompleted { environment }, Ok(client)) => {
            on_build_completed(&environment, trigger.target, trigger.payload, &client, console)
                .await
        }
        (TriggerKind::BuildStep, Ok(client)) => {
            on_build_step(trigger.target, trigger.payload, &client, console).await
        }
        (kind, Err(error)) => {
            if let TriggerKind::BuildCompleted { environment } = kind {
                log_build_event(&extract_build_event(&environment), console);
            }
            report_delivery(Err(error), console);
        }
    }
}

/// Builds the http client for this trigger and runs it. A client that cannot
/// be built is reported like any other dispatch failure.
pub async fn handle_trigger<W: Write>(
    trigger: Trigger,
    request_timeout: Option<Duration>,
    console: &mut W,
) {
    event!(
        Level::INFO,
        build_id = %trigger.id,
        docker_image = trigger.payload.docker_image(),
        digest = trigger.payload.digest(),
        data_source = ?trigger.payload.data_source(),
        material_type = ?trigger.payload.material_type(),
        "handling trigger"
    );
    route_trigger(trigger, build_client(request_timeout), console).await
}
