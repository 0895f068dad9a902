use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::{
    auth::{
        errors::AuthError,
        jwt::JwtKeys,
        password,
        repo_types::{User, UserId},
    },
    state::AppState,
};

/// Register/login/authenticate over the credential store and token keys.
/// Holds no per-session state; cloning is cheap.
#[derive(Clone)]
pub struct AuthService {
    db: SqlitePool,
    keys: JwtKeys,
    /// Digest of a throwaway password, verified against on unknown usernames
    /// so both login failures cost one Argon2 run.
    dummy_digest: Arc<str>,
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(
            state.db.clone(),
            state.keys.clone(),
            state.dummy_digest.clone(),
        )
    }
}

impl AuthService {
    pub fn new(db: SqlitePool, keys: JwtKeys, dummy_digest: Arc<str>) -> Self {
        Self {
            db,
            keys,
            dummy_digest,
        }
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserId, AuthError> {
        if User::find_by_username(&self.db, username).await?.is_some() {
            warn!(%username, "username already registered");
            return Err(AuthError::UsernameTaken);
        }

        let digest = password::hash_blocking(password.to_owned()).await?;
        // A racing register with the same name surfaces here as UsernameTaken.
        let id = User::create(&self.db, username, email, &digest).await?;

        info!(user_id = id, %username, "user registered");
        Ok(id)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let Some(user) = User::find_by_username(&self.db, username).await? else {
            let _ = password::verify_blocking(password.to_owned(), self.dummy_digest.to_string())
                .await;
            warn!(%username, "login unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        if !password::verify_blocking(password.to_owned(), user.password_hash).await? {
            warn!(%username, user_id = user.id, "login invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.keys.issue(&user.username)?;
        info!(%username, user_id = user.id, "user logged in");
        Ok(token)
    }

    pub fn authenticate(&self, token: &str) -> Result<String, AuthError> {
        self.keys.verify(token)
    }
}
