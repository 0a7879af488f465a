use crate::config::ClientConfig;
use crate::core::http::{self, ApiResponse};
use crate::core::session::Session;
use crate::utils::error::{AuthError, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

/// Executes authenticated requests with a single refresh-and-retry on token expiry.
///
/// The request is rebuilt from `build` for every attempt, so the closure must
/// be repeatable. At most two requests are sent per call.
#[derive(Clone)]
pub struct ResilientInvoker {
    session: Session,
}

impl ResilientInvoker {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &ClientConfig {
        self.session.config()
    }

    pub async fn execute<F>(&self, build: F) -> Result<ApiResponse>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let access = self
            .session
            .access_token()?
            .ok_or(AuthError::Unauthenticated)?;

        let response = self.send(&build, &access).await?;
        if !self.is_expiry(&response) {
            return Self::finish(response);
        }

        tracing::warn!("Access token expired, refreshing before retry");
        let refreshed = match self.session.refresh_after_expiry(&access).await {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!("Token refresh failed: {}", e);
                return Err(AuthError::SessionExpired.into());
            }
        };

        let retried = self.send(&build, &refreshed.access).await?;
        if self.is_expiry(&retried) {
            tracing::error!("Retried request still reports an expired token");
            return Err(AuthError::SessionExpired.into());
        }

        Self::finish(retried)
    }

    pub async fn execute_json<T, F>(&self, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder,
    {
        self.execute(build).await?.json()
    }

    async fn send<F>(&self, build: &F, access: &str) -> Result<ApiResponse>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let request = build(self.session.http()).bearer_auth(access);
        http::send(request, self.config().timeout()).await
    }

    fn is_expiry(&self, response: &ApiResponse) -> bool {
        response.status == StatusCode::UNAUTHORIZED
            && response
                .body
                .to_lowercase()
                .contains(&self.config().session.expiry_marker.to_lowercase())
    }

    fn finish(response: ApiResponse) -> Result<ApiResponse> {
        if response.is_success() {
            Ok(response)
        } else {
            tracing::debug!("Request failed with HTTP {}", response.status);
            Err(response.into_api_error())
        }
    }
}
