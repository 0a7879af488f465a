use crate::core::ResilientInvoker;
use crate::domain::model::{UserProfile, UserUpdate};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};

/// The backend wraps users as `{"user": {...}}`; older builds return it bare.
#[derive(Deserialize)]
#[serde(untagged)]
enum UserEnvelope {
    Wrapped { user: UserProfile },
    Bare(UserProfile),
}

impl UserEnvelope {
    fn into_user(self) -> UserProfile {
        match self {
            UserEnvelope::Wrapped { user } | UserEnvelope::Bare(user) => user,
        }
    }
}

#[derive(Serialize)]
struct PictureUpdate<'a> {
    picture: &'a str,
}

#[derive(Clone)]
pub struct ProfileClient {
    invoker: ResilientInvoker,
}

impl ProfileClient {
    pub fn new(invoker: ResilientInvoker) -> Self {
        Self { invoker }
    }

    pub async fn fetch_me(&self) -> Result<UserProfile> {
        let config = self.invoker.config();
        let url = config.url(&config.endpoints.users_me);

        let envelope: UserEnvelope = self.invoker.execute_json(|client| client.get(&url)).await?;
        let user = envelope.into_user();
        tracing::debug!("Fetched profile for {}", user.email);
        Ok(user)
    }

    pub async fn update_me(&self, update: &UserUpdate) -> Result<UserProfile> {
        let config = self.invoker.config();
        let url = config.url(&config.endpoints.users_me);

        let envelope: UserEnvelope = self
            .invoker
            .execute_json(|client| client.post(&url).json(update))
            .await?;
        tracing::info!("Profile updated");
        Ok(envelope.into_user())
    }

    /// Sets the avatar URL; `None` clears it.
    pub async fn update_picture(&self, picture_url: Option<&str>) -> Result<UserProfile> {
        let config = self.invoker.config();
        let url = config.url(&config.endpoints.users_me_picture);
        let body = PictureUpdate {
            picture: picture_url.unwrap_or_default(),
        };

        let envelope: UserEnvelope = self
            .invoker
            .execute_json(|client| client.post(&url).json(&body))
            .await?;
        Ok(envelope.into_user())
    }
}
