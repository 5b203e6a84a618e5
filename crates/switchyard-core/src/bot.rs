//! The bot identity and raw API hook seen by handlers.

use std::any::Any;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiResult;
use crate::model::User;

/// An active bot account.
///
/// The dispatcher only needs [`me`](Bot::me): the bot's own identity, used
/// for `@botname` command matching and self-join detection. It is resolved
/// once and assumed stable for the lifetime of the process.
///
/// [`call_api`](Bot::call_api) is the hook handlers use to issue further
/// actions; typed method wrappers belong to the implementation.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Returns the bot's own user.
    fn me(&self) -> &User;

    /// Calls a raw API method with JSON parameters.
    async fn call_api(&self, method: &str, params: Value) -> ApiResult<Value>;

    /// Returns self as an `Arc<dyn Any>` for downcasting.
    ///
    /// ```rust,ignore
    /// fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
    ///     self
    /// }
    /// ```
    fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// A shared bot trait object.
pub type BoxedBot = Arc<dyn Bot>;

/// Attempts to downcast a [`BoxedBot`] to a concrete bot type.
pub fn downcast_bot<T: Bot + 'static>(bot: BoxedBot) -> Option<Arc<T>> {
    Arc::downcast::<T>(bot.as_any()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    struct NamedBot(User);

    #[async_trait]
    impl Bot for NamedBot {
        fn me(&self) -> &User {
            &self.0
        }

        async fn call_api(&self, _method: &str, _params: Value) -> ApiResult<Value> {
            Err(ApiError::Offline)
        }

        fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    struct OtherBot;

    #[async_trait]
    impl Bot for OtherBot {
        fn me(&self) -> &User {
            unreachable!()
        }

        async fn call_api(&self, _method: &str, _params: Value) -> ApiResult<Value> {
            Ok(Value::Null)
        }

        fn as_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    #[test]
    fn test_downcast_bot() {
        let bot: BoxedBot = Arc::new(NamedBot(User {
            id: 1,
            username: Some("yard_bot".into()),
            ..Default::default()
        }));
        assert_eq!(bot.me().username(), "yard_bot");
        let concrete = downcast_bot::<NamedBot>(bot.clone()).unwrap();
        assert_eq!(concrete.0.id, 1);
        assert!(downcast_bot::<OtherBot>(bot).is_none());
    }

    #[tokio::test]
    async fn test_call_api_error() {
        let bot = NamedBot(User::default());
        let err = bot.call_api("sendMessage", Value::Null).await.unwrap_err();
        assert!(matches!(err, ApiError::Offline));
    }
}
