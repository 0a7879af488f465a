use crate::utils::error::{ClientError, NetworkError, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            ClientError::malformed(format!("{} (status {})", e, self.status.as_u16()))
        })
    }

    pub fn into_api_error(self) -> ClientError {
        ClientError::Api {
            status_code: self.status.as_u16(),
            body: self.body,
        }
    }
}

pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(concat!("walkroute/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ClientError::Config {
            message: format!("Cannot build HTTP client: {}", e),
        })
}

pub fn classify(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        NetworkError::Timeout.into()
    } else {
        NetworkError::Unreachable(err.to_string()).into()
    }
}

/// Sends the request with an explicit timeout and reads the whole body.
pub async fn send(request: RequestBuilder, timeout: Duration) -> Result<ApiResponse> {
    let response = request.timeout(timeout).send().await.map_err(classify)?;
    let status = response.status();
    let body = response.text().await.map_err(classify)?;

    tracing::debug!("HTTP {} ({} bytes)", status, body.len());
    Ok(ApiResponse { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_decode_failure_is_malformed() {
        let response = ApiResponse {
            status: StatusCode::OK,
            body: "<html>".to_string(),
        };
        let result: Result<serde_json::Value> = response.json();
        assert!(matches!(result, Err(ClientError::MalformedResponse { .. })));
    }

    #[test]
    fn test_into_api_error_keeps_status_and_body() {
        let response = ApiResponse {
            status: StatusCode::BAD_GATEWAY,
            body: "upstream down".to_string(),
        };
        assert_eq!(
            response.into_api_error(),
            ClientError::Api {
                status_code: 502,
                body: "upstream down".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let client = build_client(Duration::from_secs(2)).unwrap();
        let result = send(client.get("http://127.0.0.1:1/"), Duration::from_secs(2)).await;
        assert!(matches!(
            result,
            Err(ClientError::Network(NetworkError::Unreachable(_)))
        ));
    }
}
