use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Access/refresh credentials issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: Option<String>) -> Self {
        Self {
            access: access.into(),
            refresh,
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    pub fn has_access(&self) -> bool {
        !self.access.is_empty()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh.as_deref().filter(|token| !token.is_empty())
    }
}

/// A geographic point in degrees. Sequences of points are ordered by visit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub lat: f64,
    pub lon: f64,
}

impl RoutePoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Backend wire order is `[lon, lat]`.
    pub fn to_lon_lat(self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    pub fn from_lon_lat(pair: &[f64]) -> Option<Self> {
        match pair {
            [lon, lat] => Some(Self::new(*lat, *lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub address: String,
    pub categories: BTreeSet<String>,
    pub coordinates: RoutePoint,
}

impl Place {
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && self.coordinates.lat != 0.0 && self.coordinates.lon != 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceQuery {
    pub center: RoutePoint,
    pub radius_meters: u32,
    pub categories: BTreeSet<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteProfile {
    #[default]
    #[serde(rename = "foot-walking")]
    FootWalking,
}

impl RouteProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteProfile::FootWalking => "foot-walking",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutePreference {
    #[default]
    Fastest,
}

impl RoutePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutePreference::Fastest => "fastest",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub points: Vec<RoutePoint>,
    pub profile: RouteProfile,
    pub preference: RoutePreference,
    pub optimize_order: bool,
}

impl RouteRequest {
    pub fn walking(points: Vec<RoutePoint>) -> Self {
        Self {
            points,
            profile: RouteProfile::FootWalking,
            preference: RoutePreference::Fastest,
            optimize_order: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    pub points: Vec<RoutePoint>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub locale: Option<String>,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        if let Some(full_name) = self.full_name.as_deref().filter(|n| !n.is_empty()) {
            return full_name.to_string();
        }
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|p| !p.is_empty())
            .collect();
        if parts.is_empty() {
            self.email.clone()
        } else {
            parts.join(" ")
        }
    }
}

/// Partial profile update; only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.full_name.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
    }
}
