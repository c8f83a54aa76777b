//! Mock authentication
//!
//! Sign-in accepts any non-blank credentials after a simulated round trip.
//! The signed-in user is persisted so it survives restarts.

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

use crate::storage::{KeyValueStore, StorageError, USER_KEY, load_json, save_json};

/// Default simulated auth latency.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(1000);

const MOCK_USER_ID: &str = "1";
const MOCK_USER_NAME: &str = "Demo User";
const AVATAR_BASE: &str = "https://ui-avatars.com/api/?name=";

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required credential was blank.
    #[error("{0} is required")]
    MissingCredentials(&'static str),

    /// The session could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Avatar image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    fn mock(name: &str, email: &str) -> Self {
        Self {
            id: MOCK_USER_ID.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            avatar: Some(format!("{AVATAR_BASE}{}", name.replace(' ', "+"))),
        }
    }
}

/// Current authentication state.
#[derive(Debug)]
pub struct Session {
    storage: Arc<dyn KeyValueStore>,
    latency: Duration,
    user: Option<User>,
}

impl Session {
    /// Restore the session from storage. Unreadable data signs the user out.
    pub fn restore(storage: Arc<dyn KeyValueStore>) -> Self {
        let user = load_json::<User>(storage.as_ref(), USER_KEY).unwrap_or_else(|err| {
            warn!(error = %err, "discarding unreadable session");
            None
        });

        Self {
            storage,
            latency: DEFAULT_LATENCY,
            user,
        }
    }

    /// Override the simulated latency.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Whether a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingCredentials`] for blank input, or
    /// [`AuthError::Storage`] if the user cannot be persisted.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<&User, AuthError> {
        sleep(self.latency).await;

        required("email", email)?;
        required("password", password)?;

        self.establish(User::mock(MOCK_USER_NAME, email.trim()))
    }

    /// Register a new account and sign in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingCredentials`] for blank input, or
    /// [`AuthError::Storage`] if the user cannot be persisted.
    #[instrument(skip(self, password))]
    pub async fn sign_up(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<&User, AuthError> {
        sleep(self.latency).await;

        required("name", name)?;
        required("email", email)?;
        required("password", password)?;

        self.establish(User::mock(name.trim(), email.trim()))
    }

    /// Sign out and forget the persisted user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Storage`] if the stored user cannot be removed.
    #[instrument(skip(self))]
    pub fn sign_out(&mut self) -> Result<(), AuthError> {
        self.user = None;
        self.storage.remove(USER_KEY)?;

        info!("signed out");

        Ok(())
    }

    fn establish(&mut self, user: User) -> Result<&User, AuthError> {
        save_json(self.storage.as_ref(), USER_KEY, &user)?;

        info!(email = %user.email, "signed in");

        Ok(&*self.user.insert(user))
    }
}

fn required(field: &'static str, value: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::MissingCredentials(field));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::storage::MemoryStore;

    fn session(storage: &Arc<dyn KeyValueStore>) -> Session {
        Session::restore(Arc::clone(storage)).with_latency(Duration::ZERO)
    }

    #[tokio::test]
    async fn sign_in_persists_user_across_restore() -> TestResult {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

        let mut first = session(&storage);
        let user = first.sign_in("ada@example.com", "hunter2").await?.clone();

        assert_eq!(user.id, "1");
        assert_eq!(user.name, "Demo User");

        let restored = session(&storage);

        assert_eq!(restored.user(), Some(&user));

        Ok(())
    }

    #[tokio::test]
    async fn sign_up_uses_given_name() -> TestResult {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut session = session(&storage);

        let user = session.sign_up("Ada Lovelace", "ada@example.com", "pw").await?;

        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(
            user.avatar.as_deref(),
            Some("https://ui-avatars.com/api/?name=Ada+Lovelace")
        );

        Ok(())
    }

    #[tokio::test]
    async fn blank_credentials_are_rejected() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut session = session(&storage);

        assert!(matches!(
            session.sign_in("  ", "pw").await,
            Err(AuthError::MissingCredentials("email"))
        ));
        assert!(matches!(
            session.sign_up("", "a@b.c", "pw").await,
            Err(AuthError::MissingCredentials("name"))
        ));
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn sign_out_clears_storage() -> TestResult {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut session = session(&storage);
        session.sign_in("ada@example.com", "pw").await?;

        session.sign_out()?;

        assert!(!session.is_authenticated());
        assert_eq!(storage.get(USER_KEY)?, None);

        Ok(())
    }
}
