use crate::domain::model::{RouteRequest, RouteResult, TokenPair};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Persistent holder of the session credentials.
///
/// Implementations must be callable from any thread, and a reader must never
/// observe a partially written pair.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Result<Option<TokenPair>>;
    fn set(&self, tokens: TokenPair) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Anything that can turn an ordered point list into a walking route.
#[async_trait]
pub trait RouteService: Send + Sync {
    async fn calculate(&self, request: RouteRequest) -> Result<RouteResult>;
}
