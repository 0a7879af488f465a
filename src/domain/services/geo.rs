use crate::domain::model::RoutePoint;

pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance in meters.
pub fn haversine_meters(a: RoutePoint, b: RoutePoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Planar distance on raw degrees. Only meaningful for comparing candidates
/// against the same origin.
pub fn degree_distance(a: RoutePoint, b: RoutePoint) -> f64 {
    let d_lat = a.lat - b.lat;
    let d_lon = a.lon - b.lon;
    (d_lat * d_lat + d_lon * d_lon).sqrt()
}

pub fn within_radius(origin: RoutePoint, point: RoutePoint, radius_meters: f64) -> bool {
    haversine_meters(origin, point) <= radius_meters
}
