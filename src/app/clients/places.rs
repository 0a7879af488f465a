use crate::core::ResilientInvoker;
use crate::domain::model::{Place, PlaceQuery, RoutePoint};
use crate::utils::error::Result;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Serialize)]
struct SearchPlacesRequest<'a> {
    lat: f64,
    lon: f64,
    radius: u32,
    categories: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
}

#[derive(Deserialize)]
struct SearchPlacesResponse {
    places: Vec<PlaceDto>,
}

#[derive(Deserialize)]
struct PlaceDto {
    #[serde(default)]
    name: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    place_id: String,
    /// `[lon, lat]`
    #[serde(default, deserialize_with = "null_as_empty")]
    coordinates: Vec<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    categories: Vec<String>,
}

/// The backend serializes empty lists as `null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<PlaceDto> for Place {
    fn from(dto: PlaceDto) -> Self {
        Place {
            id: dto.place_id,
            name: dto.name,
            address: dto.address,
            categories: dto.categories.into_iter().collect(),
            coordinates: RoutePoint::from_lon_lat(&dto.coordinates)
                .unwrap_or(RoutePoint::new(0.0, 0.0)),
        }
    }
}

#[derive(Clone)]
pub struct PlacesClient {
    invoker: ResilientInvoker,
}

impl PlacesClient {
    pub fn new(invoker: ResilientInvoker) -> Self {
        Self { invoker }
    }

    /// Points of interest around `query.center`. Places without a name or with
    /// zero coordinates are dropped.
    pub async fn search(&self, query: &PlaceQuery) -> Result<Vec<Place>> {
        let config = self.invoker.config();
        let url = config.url(&config.endpoints.places_search);
        let body = SearchPlacesRequest {
            lat: query.center.lat,
            lon: query.center.lon,
            radius: query.radius_meters,
            categories: query.categories.iter().map(String::as_str).collect(),
            limit: query.limit.filter(|limit| *limit > 0),
        };

        let response: SearchPlacesResponse = self
            .invoker
            .execute_json(|client| client.post(&url).json(&body))
            .await?;

        Ok(Self::collect_valid(response))
    }

    fn collect_valid(response: SearchPlacesResponse) -> Vec<Place> {
        let total = response.places.len();
        let places: Vec<Place> = response
            .places
            .into_iter()
            .map(Place::from)
            .filter(Place::is_valid)
            .collect();

        if places.len() < total {
            tracing::debug!("Dropped {} invalid places", total - places.len());
        }
        tracing::debug!("Places search returned {} places", places.len());
        places
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_are_flipped_to_lat_lon() {
        let dto: PlaceDto = serde_json::from_str(
            r#"{"name":"Opera","place_id":"p1","coordinates":[82.92,55.03],"categories":["tourism"]}"#,
        )
        .unwrap();
        let place = Place::from(dto);
        assert_eq!(place.coordinates, RoutePoint::new(55.03, 82.92));
        assert!(place.categories.contains("tourism"));
        assert!(place.address.is_empty());
    }

    #[test]
    fn test_invalid_places_are_dropped() {
        let response: SearchPlacesResponse = serde_json::from_str(
            r#"{"places":[
                {"name":"","coordinates":[0,0]},
                {"name":"No coords"},
                {"name":"Half zero","coordinates":[82.9,0]},
                {"name":"Park","coordinates":[82.9,55.0]}
            ]}"#,
        )
        .unwrap();
        let places = PlacesClient::collect_valid(response);
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Park");
    }

    #[test]
    fn test_null_lists_drop_only_the_affected_place() {
        let response: SearchPlacesResponse = serde_json::from_str(
            r#"{"places":[
                {"name":"Park","coordinates":[82.9,55.0],"categories":null},
                {"name":"Opera","place_id":"p2","coordinates":[82.92,55.03],"categories":["entertainment"]},
                {"name":"Ghost","coordinates":null,"categories":[]}
            ]}"#,
        )
        .unwrap();
        let places = PlacesClient::collect_valid(response);
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].name, "Park");
        assert!(places[0].categories.is_empty());
        assert_eq!(places[1].name, "Opera");
    }

    #[test]
    fn test_request_omits_missing_limit() {
        let body = SearchPlacesRequest {
            lat: 55.0,
            lon: 37.0,
            radius: 1000,
            categories: vec!["catering"],
            limit: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"lat": 55.0, "lon": 37.0, "radius": 1000, "categories": ["catering"]})
        );
    }
}
