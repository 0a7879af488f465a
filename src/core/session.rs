use crate::config::ClientConfig;
use crate::core::http::{self, ApiResponse};
use crate::domain::model::TokenPair;
use crate::domain::ports::TokenStore;
use crate::utils::error::{AuthError, ClientError, Result};
use chrono::{Duration as ChronoDuration, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    Authenticating,
    Authenticated,
}

type RefreshFlight = Shared<BoxFuture<'static, Result<TokenPair>>>;

#[derive(Serialize)]
struct IdentityExchangeRequest<'a> {
    google_token: &'a str,
}

#[derive(Serialize)]
struct RefreshTokenRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct AuthTokensResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl AuthTokensResponse {
    fn parse(response: &ApiResponse) -> Result<Self> {
        let parsed: Self = response.json()?;
        if parsed.access_token.as_deref().filter(|t| !t.is_empty()).is_none() {
            return Err(ClientError::malformed("auth response has no access_token"));
        }
        Ok(parsed)
    }

    /// Builds the stored pair. A missing or empty refresh token keeps `fallback_refresh`.
    fn into_pair(self, fallback_refresh: Option<String>) -> TokenPair {
        let refresh = self
            .refresh_token
            .filter(|token| !token.is_empty())
            .or(fallback_refresh);
        let expires_at = self
            .expires_in
            .filter(|secs| *secs > 0)
            .map(|secs| Utc::now() + ChronoDuration::seconds(secs));

        TokenPair::new(self.access_token.unwrap_or_default(), refresh).with_expiry(expires_at)
    }
}

/// Owns the token pair: login, refresh and logout all go through here.
///
/// Cloning is cheap; clones share the same state, store and refresh slot.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: ClientConfig,
    http: Client,
    store: Arc<dyn TokenStore>,
    state: Mutex<SessionState>,
    // Serializes token writes with the epoch check below.
    writes: Mutex<()>,
    // Bumped whenever the stored pair is replaced by login or removed by logout,
    // so a refresh that started earlier cannot resurrect stale credentials.
    epoch: AtomicU64,
    flight_ids: AtomicU64,
    refresh_flight: tokio::sync::Mutex<Option<(u64, RefreshFlight)>>,
}

impl Session {
    pub fn new(config: ClientConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        let http = http::build_client(config.timeout())?;
        let state = match store.get()? {
            Some(pair) if pair.has_access() => SessionState::Authenticated,
            _ => SessionState::LoggedOut,
        };
        tracing::debug!("Session created in state {:?}", state);

        Ok(Self {
            inner: Arc::new(SessionInner {
                config,
                http,
                store,
                state: Mutex::new(state),
                writes: Mutex::new(()),
                epoch: AtomicU64::new(0),
                flight_ids: AtomicU64::new(0),
                refresh_flight: tokio::sync::Mutex::new(None),
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub(crate) fn http(&self) -> &Client {
        &self.inner.http
    }

    pub fn state(&self) -> SessionState {
        self.inner.state()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    pub fn tokens(&self) -> Result<Option<TokenPair>> {
        self.inner.store.get()
    }

    pub fn access_token(&self) -> Result<Option<String>> {
        Ok(self
            .tokens()?
            .filter(TokenPair::has_access)
            .map(|pair| pair.access))
    }

    /// Exchanges an identity-provider token for a backend token pair.
    pub async fn login(&self, identity_token: &str) -> Result<TokenPair> {
        if identity_token.trim().is_empty() {
            return Err(AuthError::InvalidIdentityToken.into());
        }

        let guard = AuthenticatingGuard::enter(&self.inner);
        let config = &self.inner.config;
        let request = self
            .inner
            .http
            .post(config.url(&config.endpoints.auth_google))
            .json(&IdentityExchangeRequest {
                google_token: identity_token,
            });

        let response = http::send(request, config.timeout()).await?;
        if !response.is_success() {
            tracing::error!("Identity exchange rejected with HTTP {}", response.status);
            return Err(AuthError::BackendRejected {
                status_code: response.status.as_u16(),
                body: response.body,
            }
            .into());
        }

        let pair = AuthTokensResponse::parse(&response)?.into_pair(None);
        {
            let _writes = self.inner.lock_writes();
            self.inner.epoch.fetch_add(1, Ordering::SeqCst);
            self.inner.store.set(pair.clone())?;
        }
        guard.complete(SessionState::Authenticated);

        tracing::info!("Logged in");
        Ok(pair)
    }

    /// Obtains a new access token. Concurrent callers share one backend call.
    pub async fn refresh(&self) -> Result<TokenPair> {
        self.join_refresh(None).await
    }

    /// Refresh triggered by a request that was rejected with `stale_access`.
    ///
    /// If the stored access token already moved past `stale_access`, the newer
    /// pair is returned without another backend call.
    pub async fn refresh_after_expiry(&self, stale_access: &str) -> Result<TokenPair> {
        self.join_refresh(Some(stale_access)).await
    }

    async fn join_refresh(&self, stale_access: Option<&str>) -> Result<TokenPair> {
        let flight = {
            let mut slot = self.inner.refresh_flight.lock().await;

            if let Some((_, flight)) = slot.as_ref() {
                tracing::debug!("Joining in-flight token refresh");
                flight.clone()
            } else {
                if let Some(stale) = stale_access {
                    if let Some(current) = self.inner.store.get()? {
                        if current.has_access() && current.access != stale {
                            tracing::debug!("Access token already refreshed by another caller");
                            return Ok(current);
                        }
                    }
                }

                let id = self.inner.flight_ids.fetch_add(1, Ordering::Relaxed);
                let inner = Arc::clone(&self.inner);
                // Spawned so that dropping one waiter never aborts the shared refresh.
                let task = tokio::spawn(async move {
                    let result = inner.perform_refresh().await;
                    let mut slot = inner.refresh_flight.lock().await;
                    if slot.as_ref().is_some_and(|(flight_id, _)| *flight_id == id) {
                        *slot = None;
                    }
                    result
                });

                let flight: RefreshFlight = async move {
                    task.await.unwrap_or_else(|e| {
                        Err(ClientError::Internal {
                            message: format!("refresh task failed: {}", e),
                        })
                    })
                }
                .boxed()
                .shared();

                *slot = Some((id, flight.clone()));
                flight
            }
        };

        flight.await
    }

    /// Notifies the backend (best effort) and always clears local credentials.
    pub async fn logout(&self) {
        let refresh_token = match self.inner.store.get() {
            Ok(pair) => pair.and_then(|p| p.refresh_token().map(str::to_string)),
            Err(e) => {
                tracing::warn!("Cannot read tokens before logout: {}", e);
                None
            }
        };

        match refresh_token {
            Some(refresh_token) => {
                let config = &self.inner.config;
                let request = self
                    .inner
                    .http
                    .post(config.url(&config.endpoints.auth_logout))
                    .json(&RefreshTokenRequest {
                        refresh_token: &refresh_token,
                    });

                match http::send(request, config.timeout()).await {
                    Ok(response) if response.is_success() => {
                        tracing::debug!("Backend acknowledged logout")
                    }
                    Ok(response) => tracing::warn!(
                        "Backend logout returned HTTP {}, clearing locally anyway",
                        response.status
                    ),
                    Err(e) => tracing::warn!("Backend logout failed: {}, clearing locally anyway", e),
                }
            }
            None => tracing::debug!("No refresh token stored, skipping backend logout"),
        }

        self.inner.clear_local();
        tracing::info!("Logged out");
    }
}

impl SessionInner {
    fn state(&self) -> SessionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: SessionState) {
        let mut current = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *current != state {
            tracing::debug!("Session state {:?} -> {:?}", *current, state);
            *current = state;
        }
    }

    fn lock_writes(&self) -> std::sync::MutexGuard<'_, ()> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn clear_local(&self) {
        let _writes = self.lock_writes();
        self.clear_while_locked();
    }

    /// Caller holds `writes`.
    fn clear_while_locked(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Err(e) = self.store.clear() {
            tracing::error!("Failed to clear token store: {}", e);
        }
        self.set_state(SessionState::LoggedOut);
    }

    /// Pair stored by a login that completed while a refresh was in flight.
    fn superseding_pair(&self, started_with: &str) -> Result<TokenPair> {
        match self.store.get()? {
            Some(current) if current.has_access() && current.access != started_with => {
                tracing::debug!("Handing waiters the pair from the newer login");
                Ok(current)
            }
            _ => Err(AuthError::SessionExpired.into()),
        }
    }

    async fn perform_refresh(&self) -> Result<TokenPair> {
        let epoch = self.epoch.load(Ordering::SeqCst);
        let stored = self.store.get()?;
        let started_with = stored
            .as_ref()
            .map(|pair| pair.access.clone())
            .unwrap_or_default();
        let refresh_token = stored
            .as_ref()
            .and_then(|pair| pair.refresh_token().map(str::to_string))
            .ok_or(AuthError::NoRefreshToken)?;

        tracing::info!("Refreshing access token");
        let request = self
            .http
            .post(self.config.url(&self.config.endpoints.auth_refresh))
            .json(&RefreshTokenRequest {
                refresh_token: &refresh_token,
            });
        let response = http::send(request, self.config.timeout()).await?;

        if response.status.is_client_error() {
            let _writes = self.lock_writes();
            if self.epoch.load(Ordering::SeqCst) != epoch {
                return self.superseding_pair(&started_with);
            }
            tracing::warn!(
                "Refresh token rejected with HTTP {}, ending session",
                response.status
            );
            self.clear_while_locked();
            return Err(AuthError::BackendRejected {
                status_code: response.status.as_u16(),
                body: response.body,
            }
            .into());
        }
        if !response.is_success() {
            tracing::error!("Refresh failed with HTTP {}", response.status);
            return Err(response.into_api_error());
        }

        let pair = AuthTokensResponse::parse(&response)?.into_pair(Some(refresh_token));

        let _writes = self.lock_writes();
        if self.epoch.load(Ordering::SeqCst) != epoch {
            tracing::warn!("Session changed while refreshing, discarding refreshed tokens");
            return self.superseding_pair(&started_with);
        }
        self.store.set(pair.clone())?;
        self.set_state(SessionState::Authenticated);

        tracing::info!("Access token refreshed");
        Ok(pair)
    }
}

/// Holds the session in `Authenticating` for the duration of a login and
/// restores the previous state if the login does not complete.
struct AuthenticatingGuard<'a> {
    inner: &'a SessionInner,
    previous: SessionState,
    done: bool,
}

impl<'a> AuthenticatingGuard<'a> {
    fn enter(inner: &'a SessionInner) -> Self {
        let previous = inner.state();
        inner.set_state(SessionState::Authenticating);
        Self {
            inner,
            previous,
            done: false,
        }
    }

    fn complete(mut self, state: SessionState) {
        self.inner.set_state(state);
        self.done = true;
    }
}

impl Drop for AuthenticatingGuard<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.inner.set_state(self.previous);
        }
    }
}
