pub mod geo;
pub mod optimizer;

pub use geo::{degree_distance, haversine_meters, within_radius};
pub use optimizer::{optimize, path_length};
