pub mod remote;

use crate::entities::{DeliveryOutcome, DeliveryResult, NotificationPayload, WebhookTarget};
use http::{HeaderValue, StatusCode};
use remote::RemoteConnection;
use reqwest::Client;
use std::future::Future;
use tracing::{event, info_span, Instrument, Level};
use url::Url;
use uuid::Uuid;

#[derive(Debug)]
pub enum DispatchError {
    UrlParseFailure(String),
    UnsupportedScheme(String),
    InvalidApiToken(String),
    PayloadSerializationFailure(String),
    ClientBuildFailure(String),
}

/// One exclusively owned HTTP exchange with the webhook endpoint.
///
/// Dropping the connection releases it, so every exit path of a dispatch
/// closes it.
pub trait WebhookConnection {
    /// Writes `body` once and waits for the response status.
    fn send(&mut self, body: String) -> impl Future<Output = Result<u16, String>>;
    fn read_body(&mut self) -> impl Future<Output = Result<String, String>>;
}

pub fn parse_webhook_url(raw_url: &str) -> Result<Url, DispatchError> {
    let url = Url::parse(raw_url).map_err(|e| {
        DispatchError::UrlParseFailure(format!("Webhook url may not be valid url:\n{:?}", e))
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(DispatchError::UnsupportedScheme(format!(
            "Webhook url must use http or https, found {}",
            scheme
        ))),
    }
}

fn is_success(status_code: u16) -> bool {
    StatusCode::from_u16(status_code)
        .map(|status| status.is_success())
        .unwrap_or(false)
}

// Line terminators are dropped, the lines are concatenated as read.
fn accumulate_lines(text: &str) -> String {
    text.lines().collect()
}

fn transport_error(status_code: Option<u16>, reason: String) -> DeliveryResult {
    DeliveryResult {
        status_code,
        response_body: None,
        outcome: DeliveryOutcome::TransportError(reason),
    }
}

async fn dispatch_payload<F, C>(
    target: &WebhookTarget,
    payload: &NotificationPayload,
    open_connection_fn: F,
) -> Result<DeliveryResult, DispatchError>
where
    F: FnOnce(Url, &str) -> C,
    C: WebhookConnection,
{
    let url = parse_webhook_url(&target.url)?;
    HeaderValue::from_str(&target.api_token).map_err(|e| {
        DispatchError::InvalidApiToken(format!("Api token is not a valid header value:\n{:?}", e))
    })?;
    let body = serde_json::to_string(payload).map_err(|e| {
        DispatchError::PayloadSerializationFailure(format!(
            "Failed to serialize notification payload:\n{:?}",
            e
        ))
    })?;
    event!(Level::INFO, url = %url, body = %body, "sending webhook request");
    let mut connection = open_connection_fn(url, &target.api_token);
    let status_code = match connection.send(body).await {
        Ok(status_code) => status_code,
        Err(reason) => {
            event!(Level::WARN, reason = %reason, "webhook request failed in transport");
            return Ok(transport_error(None, reason));
        }
    };
    event!(Level::INFO, status_code, "webhook responded");
    if !is_success(status_code) {
        return Ok(DeliveryResult {
            status_code: Some(status_code),
            response_body: None,
            outcome: DeliveryOutcome::HttpError,
        });
    }
    match connection.read_body().await {
        Ok(text) => Ok(DeliveryResult {
            status_code: Some(status_code),
            response_body: Some(accumulate_lines(&text)),
            outcome: DeliveryOutcome::Success,
        }),
        Err(reason) => {
            event!(Level::WARN, reason = %reason, "failed to read webhook response body");
            Ok(transport_error(Some(status_code), reason))
        }
    }
}

/// Sends `payload` to `target` in a single attempt.
///
/// Only configuration problems are returned as `Err`, before anything is
/// sent. Transport failures and non-2xx responses are reported through the
/// outcome of the returned `DeliveryResult`.
pub async fn deliver(
    target: WebhookTarget,
    payload: NotificationPayload,
    client: &Client,
) -> Result<DeliveryResult, DispatchError> {
    let span = info_span!("deliver", delivery_id = %Uuid::new_v4());
    dispatch_payload(&target, &payload, |url, api_token| {
        RemoteConnection::open(client, url, api_token)
    })
    .instrument(span)
    .await
}
