use crate::config::toml_config::RouteConfig;
use crate::domain::model::{RoutePoint, RouteRequest, RouteResult};
use crate::domain::ports::RouteService;
use crate::domain::services::{optimize, path_length, within_radius};
use crate::utils::error::{Result, RouteError};

/// Builds walking routes from a start point and the user's selected points.
pub struct RoutePlanner<R: RouteService> {
    routes: R,
    settings: RouteConfig,
}

impl<R: RouteService> RoutePlanner<R> {
    pub fn new(routes: R, settings: RouteConfig) -> Self {
        Self { routes, settings }
    }

    pub fn settings(&self) -> &RouteConfig {
        &self.settings
    }

    /// Filters, orders and validates the points without touching the network.
    ///
    /// Candidates are treated as a set: exact duplicates and copies of the
    /// start point are ignored. The point count includes the start point.
    pub fn plan(
        &self,
        start: Option<RoutePoint>,
        candidates: &[RoutePoint],
        radius_meters: f64,
    ) -> Result<RouteRequest> {
        let start = start.ok_or(RouteError::NoStartPoint)?;

        let mut points = vec![start];
        for candidate in candidates {
            if points.contains(candidate) {
                continue;
            }
            if within_radius(start, *candidate, radius_meters) {
                points.push(*candidate);
            } else {
                tracing::debug!(
                    "Skipping ({}, {}): outside {} m radius",
                    candidate.lat,
                    candidate.lon,
                    radius_meters
                );
            }
        }

        if points.len() < 2 {
            return Err(RouteError::InsufficientPoints {
                found: points.len(),
            }
            .into());
        }

        let ordered = optimize(&points);
        tracing::debug!(
            "Path length {:.5}° as selected, {:.5}° after ordering",
            path_length(&points),
            path_length(&ordered)
        );

        Ok(RouteRequest {
            points: ordered,
            profile: self.settings.profile,
            preference: self.settings.preference,
            optimize_order: self.settings.optimize_order,
        })
    }

    pub async fn build_route(
        &self,
        start: Option<RoutePoint>,
        candidates: &[RoutePoint],
        radius_meters: f64,
    ) -> Result<RouteResult> {
        let request = self.plan(start, candidates, radius_meters)?;
        tracing::info!(
            "Requesting route through {} of {} selected points",
            request.points.len() - 1,
            candidates.len()
        );
        self.routes.calculate(request).await
    }

    /// Same as [`build_route`](Self::build_route) with the configured radius.
    pub async fn build_route_default(
        &self,
        start: Option<RoutePoint>,
        candidates: &[RoutePoint],
    ) -> Result<RouteResult> {
        self.build_route(start, candidates, self.settings.radius_meters)
            .await
    }
}
