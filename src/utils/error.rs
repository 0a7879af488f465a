use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Identity token is empty or invalid")]
    InvalidIdentityToken,

    #[error("No refresh token stored, login required")]
    NoRefreshToken,

    #[error("Session expired, login required")]
    SessionExpired,

    #[error("Backend rejected credentials (HTTP {status_code}): {body}")]
    BackendRejected { status_code: u16, body: String },

    #[error("Not authenticated")]
    Unauthenticated,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    #[error("Request timed out")]
    Timeout,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("Route start point is not set")]
    NoStartPoint,

    #[error("At least 2 route points are required, got {found}")]
    InsufficientPoints { found: usize },
}

/// Crate-wide error. Every variant is `Clone` so a single refresh outcome can be
/// handed to all callers waiting on it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("API request failed with status {status_code}: {body}")]
    Api { status_code: u16, body: String },

    #[error("Malformed backend response: {message}")]
    MalformedResponse { message: String },

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid configuration value for {field}: {value} ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Token storage error: {message}")]
    Storage { message: String },

    #[error("Internal client error: {message}")]
    Internal { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ClientError {
    pub fn malformed(message: impl Into<String>) -> Self {
        ClientError::MalformedResponse {
            message: message.into(),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ClientError::Route(_) => ErrorSeverity::Low,
            ClientError::Network(_) => ErrorSeverity::Medium,
            ClientError::Auth(_) | ClientError::Api { .. } | ClientError::MalformedResponse { .. } => {
                ErrorSeverity::High
            }
            ClientError::Config { .. }
            | ClientError::InvalidConfigValue { .. }
            | ClientError::Storage { .. }
            | ClientError::Internal { .. } => ErrorSeverity::Critical,
        }
    }

    /// True when the caller has to sign in again before retrying.
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            ClientError::Auth(
                AuthError::NoRefreshToken | AuthError::SessionExpired | AuthError::Unauthenticated
            )
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ClientError::Auth(AuthError::InvalidIdentityToken) => {
                "Sign in with the identity provider again to obtain a fresh identity token"
            }
            ClientError::Auth(AuthError::BackendRejected { .. }) => {
                "Check that the identity token belongs to this backend and try again"
            }
            ClientError::Auth(_) => "The stored session can no longer be used",
            ClientError::Network(NetworkError::Timeout) => {
                "The backend is slow to answer; retry or raise backend.timeout_seconds"
            }
            ClientError::Network(NetworkError::Unreachable(_)) => {
                "Check network connectivity and backend.base_url"
            }
            ClientError::Api { .. } => "Inspect the response body for details from the backend",
            ClientError::MalformedResponse { .. } => {
                "Backend and client versions may be out of sync"
            }
            ClientError::Route(RouteError::NoStartPoint) => "Select a start point first",
            ClientError::Route(RouteError::InsufficientPoints { .. }) => {
                "Select more points or widen the search radius"
            }
            ClientError::Config { .. } | ClientError::InvalidConfigValue { .. } => {
                "Fix the configuration file and run again"
            }
            ClientError::Storage { .. } => "Check permissions of the token file location",
            ClientError::Internal { .. } => "Retry the operation; report it if it keeps happening",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ClientError::Auth(AuthError::SessionExpired | AuthError::NoRefreshToken) => {
                "Your session has expired, please sign in again".to_string()
            }
            ClientError::Auth(AuthError::Unauthenticated) => "You are not signed in".to_string(),
            ClientError::Network(NetworkError::Timeout) => "The server did not respond in time".to_string(),
            ClientError::Network(NetworkError::Unreachable(_)) => "The server is unreachable".to_string(),
            ClientError::Route(RouteError::InsufficientPoints { found }) => {
                format!("Not enough points for a route ({} selected)", found)
            }
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::malformed(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_required_classification() {
        assert!(ClientError::from(AuthError::SessionExpired).requires_login());
        assert!(ClientError::from(AuthError::NoRefreshToken).requires_login());
        assert!(!ClientError::from(NetworkError::Timeout).requires_login());
        assert!(!ClientError::Api {
            status_code: 401,
            body: "forbidden".to_string()
        }
        .requires_login());
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(ClientError::from(RouteError::NoStartPoint).severity(), ErrorSeverity::Low);
        assert_eq!(ClientError::from(NetworkError::Timeout).severity(), ErrorSeverity::Medium);
        assert_eq!(
            ClientError::Config { message: "x".into() }.severity(),
            ErrorSeverity::Critical
        );
    }

    #[test]
    fn test_json_error_maps_to_malformed_response() {
        let err: ClientError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, ClientError::MalformedResponse { .. }));
    }
}
