#[cfg(test)]
mod test_config;

use simple_error::{simple_error, SimpleError};
use std::env::var;
use std::time::Duration;

pub struct Config {
    pub webhook_url: String,
    pub api_token: String,
    pub image_tag: String,
    pub image_digest: String,
    pub request_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Config, SimpleError> {
        Config::from_lookup(|key| var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, SimpleError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| simple_error!("Env var {} undefined.", key))
        };
        let request_timeout = match lookup("ENV_WEBHOOK_TIMEOUT_SECS") {
            Some(secs) => match secs.trim().parse::<u64>() {
                Ok(0) => {
                    return Err(simple_error!(
                        "Env var ENV_WEBHOOK_TIMEOUT_SECS must be greater than zero."
                    ))
                }
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(e) => {
                    return Err(simple_error!(
                        "Env var ENV_WEBHOOK_TIMEOUT_SECS is not a number: {:?}",
                        e
                    ))
                }
            },
            None => None,
        };
        Ok(Config {
            webhook_url: required("ENV_WEBHOOK_URL")?,
            api_token: required("ENV_WEBHOOK_API_TOKEN")?,
            image_tag: required("ENV_IMAGE_TAG")?,
            image_digest: required("ENV_IMAGE_DIGEST")?,
            request_timeout,
        })
    }
}
