use crate::domain::model::{RoutePreference, RouteProfile};
use crate::utils::error::{ClientError, Result};
use crate::utils::validation::{
    validate_endpoint_path, validate_non_empty_string, validate_positive_f64, validate_range,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub backend: BackendConfig,
    pub endpoints: EndpointsConfig,
    pub session: SessionConfig,
    pub route: RouteConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://10.0.2.2:8080".to_string(),
            timeout_seconds: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub auth_google: String,
    pub auth_refresh: String,
    pub auth_logout: String,
    pub users_me: String,
    pub users_me_picture: String,
    pub places_search: String,
    pub routes_calculate: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            auth_google: "/auth/google".to_string(),
            auth_refresh: "/auth/refresh".to_string(),
            auth_logout: "/auth/logout".to_string(),
            users_me: "/api/users/me".to_string(),
            users_me_picture: "/api/users/me/picture".to_string(),
            places_search: "/places/search".to_string(),
            routes_calculate: "/routes/calculate".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Case-insensitive marker that turns a 401 body into an expiry signal.
    pub expiry_marker: String,
    pub token_file: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            expiry_marker: "expired".to_string(),
            token_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    pub radius_meters: f64,
    pub profile: RouteProfile,
    pub preference: RoutePreference,
    pub optimize_order: bool,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            radius_meters: 5000.0,
            profile: RouteProfile::FootWalking,
            preference: RoutePreference::Fastest,
            optimize_order: false,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.backend.base_url = base_url.into();
        config
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| ClientError::Config {
            message: format!("Cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ClientError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ClientError::Config {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.backend.base_url.trim_end_matches('/'), path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_seconds)
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        validate_url("backend.base_url", &self.backend.base_url)?;
        validate_range("backend.timeout_seconds", self.backend.timeout_seconds, 1, 300)?;

        let endpoints = [
            ("endpoints.auth_google", &self.endpoints.auth_google),
            ("endpoints.auth_refresh", &self.endpoints.auth_refresh),
            ("endpoints.auth_logout", &self.endpoints.auth_logout),
            ("endpoints.users_me", &self.endpoints.users_me),
            ("endpoints.users_me_picture", &self.endpoints.users_me_picture),
            ("endpoints.places_search", &self.endpoints.places_search),
            ("endpoints.routes_calculate", &self.endpoints.routes_calculate),
        ];
        for (field, path) in endpoints {
            validate_endpoint_path(field, path)?;
        }

        validate_non_empty_string("session.expiry_marker", &self.session.expiry_marker)?;
        if let Some(token_file) = &self.session.token_file {
            validate_non_empty_string("session.token_file", token_file)?;
        }
        validate_positive_f64("route.radius_meters", self.route.radius_meters)?;

        Ok(())
    }
}
