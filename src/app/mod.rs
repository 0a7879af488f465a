pub mod clients;
pub mod route_planner;

use crate::config::ClientConfig;
use crate::core::{ResilientInvoker, Session};
use crate::domain::ports::TokenStore;
use crate::utils::error::Result;
use clients::{PlacesClient, ProfileClient, RouteClient};
use route_planner::RoutePlanner;
use std::sync::Arc;

/// One session plus the domain clients bound to it.
#[derive(Clone)]
pub struct ApiClient {
    session: Session,
    profile: ProfileClient,
    places: PlacesClient,
    routes: RouteClient,
}

impl ApiClient {
    pub fn new(config: ClientConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        Ok(Self::from_session(Session::new(config, store)?))
    }

    pub fn from_session(session: Session) -> Self {
        let invoker = ResilientInvoker::new(session.clone());
        Self {
            profile: ProfileClient::new(invoker.clone()),
            places: PlacesClient::new(invoker.clone()),
            routes: RouteClient::new(invoker),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn profile(&self) -> &ProfileClient {
        &self.profile
    }

    pub fn places(&self) -> &PlacesClient {
        &self.places
    }

    pub fn routes(&self) -> &RouteClient {
        &self.routes
    }

    pub fn route_planner(&self) -> RoutePlanner<RouteClient> {
        RoutePlanner::new(self.routes.clone(), self.session.config().route.clone())
    }
}
