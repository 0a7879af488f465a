pub mod places;
pub mod profile;
pub mod route;

pub use places::PlacesClient;
pub use profile::ProfileClient;
pub use route::RouteClient;
