pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{FileTokenStore, MemoryTokenStore};
pub use app::clients::{PlacesClient, ProfileClient, RouteClient};
pub use app::route_planner::RoutePlanner;
pub use app::ApiClient;
pub use config::ClientConfig;
pub use crate::core::{ApiResponse, ResilientInvoker, Session, SessionState};
pub use domain::model::{
    Place, PlaceQuery, RoutePoint, RouteRequest, RouteResult, TokenPair, UserProfile, UserUpdate,
};
pub use domain::ports::{RouteService, TokenStore};
pub use domain::services::optimize;
pub use utils::error::{AuthError, ClientError, NetworkError, Result, RouteError};
