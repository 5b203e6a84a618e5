//! A bot with a fixed identity and no API connection.
//!
//! `OfflineBot` is what the update loop hands to handlers when updates come
//! from a file, a test, or any other source that has no platform behind it.
//! Every API call fails with [`ApiError::Offline`].

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use switchyard_core::{ApiError, ApiResult, Bot, BoxedBot, User};
use tracing::debug;

use crate::config::BotIdentityConfig;

#[derive(Debug, Clone)]
pub struct OfflineBot {
    me: User,
}

impl OfflineBot {
    pub fn new(me: User) -> Self {
        Self { me }
    }

    pub fn from_config(config: &BotIdentityConfig) -> Self {
        Self::new(config.to_user())
    }

    pub fn boxed(self) -> BoxedBot {
        Arc::new(self)
    }
}

#[async_trait]
impl Bot for OfflineBot {
    fn me(&self) -> &User {
        &self.me
    }

    async fn call_api(&self, method: &str, _params: Value) -> ApiResult<Value> {
        debug!(method, "offline bot dropped API call");
        Err(ApiError::Offline)
    }

    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use switchyard_core::downcast_bot;

    #[tokio::test]
    async fn test_offline_bot() {
        let bot = OfflineBot::from_config(&BotIdentityConfig::default()).boxed();
        assert_eq!(bot.me().username(), "switchyard_bot");

        let err = tokio_test::assert_err!(bot.call_api("sendMessage", json!({})).await);
        assert!(matches!(err, ApiError::Offline));

        assert!(downcast_bot::<OfflineBot>(bot.clone()).is_some());
    }
}
