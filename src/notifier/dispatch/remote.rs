use super::{DispatchError, WebhookConnection};
use http::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{event, Level};
use url::Url;

pub const API_TOKEN_HEADER: &str = "api-token";

/// Client for webhook deliveries. Idle connections are not kept, so a
/// delivery never reuses the connection of an earlier one.
pub fn build_client(request_timeout: Option<Duration>) -> Result<Client, DispatchError> {
    let builder = Client::builder().pool_max_idle_per_host(0);
    let builder = match request_timeout {
        Some(timeout) => builder.timeout(timeout),
        None => builder,
    };
    builder.build().map_err(|e| {
        DispatchError::ClientBuildFailure(format!("Failed to build http client:\n{:?}", e))
    })
}

pub struct RemoteConnection {
    client: Client,
    url: Url,
    api_token: String,
    response: Option<Response>,
}

impl RemoteConnection {
    pub fn open(client: &Client, url: Url, api_token: &str) -> RemoteConnection {
        RemoteConnection {
            client: client.clone(),
            url,
            api_token: api_token.to_string(),
            response: None,
        }
    }
}

impl WebhookConnection for RemoteConnection {
    async fn send(&mut self, body: String) -> Result<u16, String> {
        let request = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(API_TOKEN_HEADER, &self.api_token)
            .body(body)
            .build()
            .map_err(|e| format!("Failed to construct http request:\n{:?}", e))?;
        let response = self.client.execute(request).await.map_err(|e| {
            format!("Failed to complete request to webhook endpoint:\n{:?}", e)
        })?;
        let status_code = response.status().as_u16();
        self.response = Some(response);
        Ok(status_code)
    }

    async fn read_body(&mut self) -> Result<String, String> {
        let response = self
            .response
            .take()
            .ok_or_else(|| String::from("No response to read; request was not sent."))?;
        response.text().await.map_err(|e| {
            format!("Failed to convert response from webhook endpoint to text:\n{:?}", e)
        })
    }
}

impl Drop for RemoteConnection {
    fn drop(&mut self) {
        event!(Level::DEBUG, url = %self.url, "webhook connection released");
    }
}
