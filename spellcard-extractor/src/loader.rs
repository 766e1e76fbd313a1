//! Fetches rulebook pages over HTTP.

use std::thread::sleep;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use url::Url;

use crate::config::Config;
use crate::error::Error;

const BACKOFF_MULTIPLIER: u32 = 2;

pub struct Loader {
    client: Client,
    config: Config,
}

impl Loader {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| Error::InvalidInput(format!("cannot build HTTP client: {}", e).into()))?;
        Ok(Loader {
            client,
            config: config.clone(),
        })
    }

    /// Parses `url` and checks it against the allowed prefixes.
    pub fn check_url(&self, url: &str) -> Result<Url, Error> {
        check_url(url, &self.config.allowed_prefixes)
    }

    /// The page body. Connection failures, timeouts, 429 and 5xx responses
    /// are retried with exponential backoff.
    pub fn fetch(&self, url: &str) -> Result<String, Error> {
        let url = self.check_url(url)?;
        let fetch_error = |source: reqwest::Error| Error::Fetch {
            url: url.to_string(),
            source,
        };

        let mut delay = self.config.retry_delay();
        let mut attempt = 0;
        loop {
            tracing::debug!(url = %url, attempt, "fetching page");
            let sent = self
                .client
                .get(url.clone())
                .send()
                .and_then(Response::error_for_status);
            match sent {
                Ok(response) => {
                    let body = response.text().map_err(fetch_error)?;
                    tracing::info!(url = %url, bytes = body.len(), "fetched page");
                    return Ok(body);
                }
                Err(e) if attempt < self.config.max_retries && is_transient(&e) => {
                    tracing::warn!(url = %url, attempt, error = %e, "fetch failed, retrying");
                    attempt += 1;
                    sleep(delay);
                    delay *= BACKOFF_MULTIPLIER;
                }
                Err(e) => return Err(fetch_error(e)),
            }
        }
    }
}

pub fn check_url(url: &str, allowed_prefixes: &[String]) -> Result<Url, Error> {
    let parsed = Url::parse(url)
        .map_err(|e| Error::InvalidInput(format!("invalid URL `{}`: {}", url, e).into()))?;
    if !allowed_prefixes
        .iter()
        .any(|prefix| parsed.as_str().starts_with(prefix.as_str()))
    {
        return Err(Error::InvalidInput(
            format!(
                "URL `{}` is not on an allowed site ({})",
                url,
                allowed_prefixes.join(", ")
            )
            .into(),
        ));
    }
    Ok(parsed)
}

fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout()
        || e.is_connect()
        || e.status().map_or(false, |status| {
            status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
        })
}
