#![allow(dead_code)]

use httpmock::MockServer;
use std::sync::Arc;
use walkroute::{ApiClient, ClientConfig, MemoryTokenStore, TokenPair, TokenStore};

pub const OLD_ACCESS: &str = "access-old";
pub const NEW_ACCESS: &str = "access-new";
pub const REFRESH: &str = "refresh-1";
pub const EXPIRED_BODY: &str = r#"{"error":"token is expired"}"#;

pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::with_base_url(server.base_url())
}

pub fn stored_pair() -> TokenPair {
    TokenPair::new(OLD_ACCESS, Some(REFRESH.to_string()))
}

pub fn client_with(config: ClientConfig, tokens: Option<TokenPair>) -> (ApiClient, Arc<MemoryTokenStore>) {
    let store = Arc::new(match tokens {
        Some(pair) => MemoryTokenStore::with_tokens(pair),
        None => MemoryTokenStore::new(),
    });
    let client = ApiClient::new(config, store.clone() as Arc<dyn TokenStore>)
        .expect("client should build");
    (client, store)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
