//! Default identity resolution.
//!
//! When no authenticated user is present, operations act on behalf of a
//! default identity. It is resolved once at startup and passed explicitly to
//! every call that needs an owner.

use super::settings::Settings;
use crate::{core::user, entities::user::Model as UserModel, errors::Result};
use sea_orm::DatabaseConnection;

/// Environment variable overriding the configured default username
pub const USER_ENV_VAR: &str = "MEAL_PLANNER_USER";

/// The username operations fall back to when no user is supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultIdentity {
    /// Username of the fallback user
    pub username: String,
}

impl DefaultIdentity {
    /// Creates an identity for the given username.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    /// Reads `MEAL_PLANNER_USER`, falling back to `planner.default_username`.
    #[must_use]
    pub fn from_env(settings: &Settings) -> Self {
        Self::resolve_name(std::env::var(USER_ENV_VAR).ok(), settings)
    }

    fn resolve_name(override_name: Option<String>, settings: &Settings) -> Self {
        let username = override_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| settings.planner.default_username.clone());
        Self::new(username)
    }

    /// Loads the user row for this identity, creating it with the configured
    /// preferences on first use.
    pub async fn resolve(
        &self,
        db: &DatabaseConnection,
        settings: &Settings,
    ) -> Result<UserModel> {
        user::get_or_create_user(db, &self.username, &settings.planner).await
    }
}
