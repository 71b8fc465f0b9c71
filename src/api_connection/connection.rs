use reqwest::{Client, ClientBuilder, RequestBuilder};
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt;
use tracing::debug;

use crate::config::AppConfig;

#[derive(Debug)]
pub enum ApiConnectionError {
    MissingApiKey(String),
    NetworkError(reqwest::Error),
    SerializationError(serde_json::Error),
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
    /// A lookup by id came back without the record it was asked for.
    MissingRecord(String),
    TimedOut,
}

impl fmt::Display for ApiConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiConnectionError::MissingApiKey(key_name) => {
                write!(f, "API key not found in environment: {}", key_name)
            }
            ApiConnectionError::NetworkError(err) => write!(f, "Network error: {}", err),
            ApiConnectionError::SerializationError(err) => {
                write!(f, "Serialization error: {}", err)
            }
            ApiConnectionError::ApiError { status, error_body } => {
                write!(f, "API error {}: {}", status, error_body)
            }
            ApiConnectionError::MissingRecord(id) => {
                write!(f, "Upstream returned no record for id {}", id)
            }
            ApiConnectionError::TimedOut => write!(f, "Upstream request timed out"),
        }
    }
}

impl Error for ApiConnectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ApiConnectionError::NetworkError(err) => Some(err),
            ApiConnectionError::SerializationError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiConnectionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiConnectionError::TimedOut
        } else {
            ApiConnectionError::NetworkError(err)
        }
    }
}

impl From<serde_json::Error> for ApiConnectionError {
    fn from(err: serde_json::Error) -> Self {
        ApiConnectionError::SerializationError(err)
    }
}

/// Builds the HTTP client shared by every upstream directory and the backend.
pub fn build_http_client(config: &AppConfig) -> Result<Client, ApiConnectionError> {
    let client = ClientBuilder::new()
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(concat!("recipe-planner/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Sends a request and decodes a JSON body, turning non-2xx statuses into
/// `ApiConnectionError::ApiError` with the upstream body attached.
pub async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
) -> Result<T, ApiConnectionError> {
    let response = send_checked(request).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(ApiConnectionError::SerializationError)
}

/// Like `send_json` but discards the body.
pub async fn send_empty(request: RequestBuilder) -> Result<(), ApiConnectionError> {
    send_checked(request).await.map(|_| ())
}

async fn send_checked(request: RequestBuilder) -> Result<reqwest::Response, ApiConnectionError> {
    let response = request.send().await?;
    debug!(url = %response.url(), status = %response.status(), "upstream response");

    if response.status().is_success() {
        Ok(response)
    } else {
        let status = response.status();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());
        Err(ApiConnectionError::ApiError { status, error_body })
    }
}

/// Convenience for the read-only directories: GET `url` with `query` and decode.
pub async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, ApiConnectionError> {
    debug!(url, ?query, "upstream request");
    send_json(client.get(url).query(query)).await
}
