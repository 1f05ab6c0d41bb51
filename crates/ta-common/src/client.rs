//! Client for a running virtual TA server.
//!
//! `health` is a plain GET and always safe to repeat. `ask` is a POST, so whether it is
//! replayed after a timeout or a server error is a configuration choice (`retry_ask`).
//! A request that never connected is retried either way.
use std::str::FromStr;
use std::time::Duration;

use rand::Rng;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::api::{AskRequest, AskResponse, ErrorResponse, HealthResponse};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

const MAX_ERROR_BODY_CHARS: usize = 2_000;

#[derive(Clone, Debug)]
pub struct TaClientConfig {
    /// Server root, without a trailing slash.
    pub base_url: String,
    /// Whole-request timeout.
    pub timeout: Duration,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Replay `ask` after a timeout, 429 or 5xx.
    pub retry_ask: bool,
}

impl TaClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
            retry_ask: true,
        }
    }

    /// Defaults overridden by `TA_BASE_URL`, `TA_TIMEOUT_SECS`, `TA_MAX_RETRIES`,
    /// `TA_RETRY_INITIAL_MS`, `TA_RETRY_MAX_MS` and `TA_RETRY_ASK`. Unparsable values are
    /// logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::new(&env_or("TA_BASE_URL", DEFAULT_BASE_URL.to_string()));
        config.timeout = Duration::from_secs(env_or("TA_TIMEOUT_SECS", config.timeout.as_secs()));
        config.max_retries = env_or("TA_MAX_RETRIES", config.max_retries);
        config.initial_backoff = Duration::from_millis(env_or(
            "TA_RETRY_INITIAL_MS",
            config.initial_backoff.as_millis() as u64,
        ));
        config.max_backoff = Duration::from_millis(env_or(
            "TA_RETRY_MAX_MS",
            config.max_backoff.as_millis() as u64,
        ));
        config.retry_ask = env_or("TA_RETRY_ASK", config.retry_ask);
        config
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(var = name, value = %raw, "ignoring unparsable client setting");
            default
        }),
        Err(_) => default,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request to virtual TA failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with its JSON error envelope.
    #[error("virtual TA rejected the request ({status}): {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("virtual TA answered {status} with an unexpected body: {body}")]
    Unexpected { status: StatusCode, body: String },
}

/// How far a request may be replayed after a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Replay {
    /// Timeouts, 429 and 5xx as well as connect failures.
    Safe,
    ConnectOnly,
}

fn retryable(err: &ClientError, replay: Replay) -> bool {
    match err {
        ClientError::Http(e) if e.is_connect() => true,
        _ if replay == Replay::ConnectOnly => false,
        ClientError::Http(e) => e.is_timeout(),
        ClientError::Rejected { status, .. } | ClientError::Unexpected { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
        }
    }
}

/// Exponential in the retry number, capped, plus up to a quarter of random jitter.
fn backoff(config: &TaClientConfig, retry: u32) -> Duration {
    let base = config
        .initial_backoff
        .saturating_mul(2u32.saturating_pow(retry))
        .min(config.max_backoff);
    let jitter_ms = rand::thread_rng().gen_range(0..=base.as_millis() as u64 / 4);
    base + Duration::from_millis(jitter_ms)
}

#[derive(Clone)]
pub struct TaClient {
    http: reqwest::Client,
    config: TaClientConfig,
}

impl TaClient {
    pub fn new(config: TaClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("ta-common/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.send(Replay::Safe, || self.http.get(self.url("/health")))
            .await
    }

    pub async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ClientError> {
        let replay = if self.config.retry_ask {
            Replay::Safe
        } else {
            Replay::ConnectOnly
        };
        self.send(replay, || self.http.post(self.url("/api/")).json(request))
            .await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    async fn send<T, F>(&self, replay: Replay, build: F) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let mut retries = 0;
        loop {
            let err = match build().send().await {
                Ok(resp) => match decode(resp).await {
                    Ok(body) => return Ok(body),
                    Err(e) => e,
                },
                Err(e) => ClientError::Http(e),
            };
            if retries >= self.config.max_retries || !retryable(&err, replay) {
                return Err(err);
            }
            let delay = backoff(&self.config, retries);
            retries += 1;
            warn!(
                retry = retries,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "virtual TA request failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }

    let body = resp.text().await.unwrap_or_else(|e| {
        warn!(error = %e, %status, "failed to read error body");
        String::new()
    });
    Err(match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(envelope) => ClientError::Rejected {
            status,
            message: envelope.error,
        },
        Err(_) => ClientError::Unexpected {
            status,
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        },
    })
}
