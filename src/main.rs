pub mod config;
pub mod entities;
pub mod events;
pub mod notifier;

use config::Config;
use events::process_lambda_event;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use notifier::handle_trigger;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Deserialize, Debug, Clone, PartialEq)]
enum RequestType {
    BuildCompleted,
    BuildStep,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Request {
    build_id: String,
    kind: RequestType,
    #[serde(default)]
    environment: HashMap<String, String>,
    image_tag: Option<String>,
    digest: Option<String>,
}

pub async fn handler(event: LambdaEvent<Request>) -> Result<(), Error> {
    let config = Config::from_env()?;
    let trigger = process_lambda_event(event, &config)?;
    handle_trigger(trigger, config.request_timeout, &mut std::io::stdout()).await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        // disable printing the name of the module in every log line.
        .with_target(false)
        // disabling time is handy because CloudWatch will add the ingestion time.
        .without_time()
        .init();
    run(service_fn(handler)).await
}
