use crate::core::ResilientInvoker;
use crate::domain::model::{RoutePoint, RouteRequest, RouteResult};
use crate::domain::ports::RouteService;
use crate::utils::error::{ClientError, Result, RouteError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct CalculateRouteRequest {
    coordinates: Vec<[f64; 2]>,
    profile: &'static str,
    preference: &'static str,
    optimize_order: bool,
}

impl From<&RouteRequest> for CalculateRouteRequest {
    fn from(request: &RouteRequest) -> Self {
        Self {
            coordinates: request.points.iter().map(|p| p.to_lon_lat()).collect(),
            profile: request.profile.as_str(),
            preference: request.preference.as_str(),
            optimize_order: request.optimize_order,
        }
    }
}

#[derive(Deserialize)]
struct CalculateRouteResponse {
    points: Vec<Vec<f64>>,
    distance: f64,
    duration: f64,
}

impl TryFrom<CalculateRouteResponse> for RouteResult {
    type Error = ClientError;

    fn try_from(response: CalculateRouteResponse) -> Result<Self> {
        let points = response
            .points
            .iter()
            .map(|pair| {
                RoutePoint::from_lon_lat(pair).ok_or_else(|| {
                    ClientError::malformed(format!("route point {:?} is not a [lon, lat] pair", pair))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RouteResult {
            points,
            distance_meters: response.distance,
            duration_seconds: response.duration,
        })
    }
}

#[derive(Clone)]
pub struct RouteClient {
    invoker: ResilientInvoker,
}

impl RouteClient {
    pub fn new(invoker: ResilientInvoker) -> Self {
        Self { invoker }
    }

    pub async fn calculate(&self, request: &RouteRequest) -> Result<RouteResult> {
        if request.points.len() < 2 {
            return Err(RouteError::InsufficientPoints {
                found: request.points.len(),
            }
            .into());
        }

        let config = self.invoker.config();
        let url = config.url(&config.endpoints.routes_calculate);
        let body = CalculateRouteRequest::from(request);

        tracing::debug!("Calculating route through {} points", request.points.len());
        let response: CalculateRouteResponse = self
            .invoker
            .execute_json(|client| client.post(&url).json(&body))
            .await?;

        let result = RouteResult::try_from(response)?;
        tracing::info!(
            "Route ready: {:.0} m, {:.0} s",
            result.distance_meters,
            result.duration_seconds
        );
        Ok(result)
    }
}

#[async_trait]
impl RouteService for RouteClient {
    async fn calculate(&self, request: RouteRequest) -> Result<RouteResult> {
        RouteClient::calculate(self, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_lon_lat_and_wire_names() {
        let request = RouteRequest::walking(vec![RoutePoint::new(55.0, 37.0), RoutePoint::new(55.01, 37.02)]);
        let json = serde_json::to_value(CalculateRouteRequest::from(&request)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "coordinates": [[37.0, 55.0], [37.02, 55.01]],
                "profile": "foot-walking",
                "preference": "fastest",
                "optimize_order": false
            })
        );
    }

    #[test]
    fn test_response_points_are_flipped() {
        let response: CalculateRouteResponse = serde_json::from_str(
            r#"{"points":[[37.0,55.0],[37.01,55.005]],"distance":812.5,"duration":640.0}"#,
        )
        .unwrap();
        let result = RouteResult::try_from(response).unwrap();
        assert_eq!(result.points[1], RoutePoint::new(55.005, 37.01));
        assert_eq!(result.distance_meters, 812.5);
    }

    #[test]
    fn test_short_point_pair_is_malformed() {
        let response: CalculateRouteResponse =
            serde_json::from_str(r#"{"points":[[37.0]],"distance":1,"duration":1}"#).unwrap();
        assert!(matches!(
            RouteResult::try_from(response),
            Err(ClientError::MalformedResponse { .. })
        ));
    }
}
