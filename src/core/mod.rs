pub mod http;
pub mod invoker;
pub mod session;

pub use crate::domain::model::{RoutePoint, RouteRequest, RouteResult, TokenPair};
pub use crate::domain::ports::{RouteService, TokenStore};
pub use crate::utils::error::Result;
pub use http::ApiResponse;
pub use invoker::ResilientInvoker;
pub use session::{Session, SessionState};
