use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;

use crate::error::ClientError;
use crate::models::{AuthResponse, User};
use crate::navigation::{AuthStatus, Navigator, Route};
use crate::storage::{keys, DurableStorage};

/// Snapshot of the signed-in session
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    /// Only known for sessions created in this process
    pub expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct TokenMeta {
    token_type: String,
    expires_in: i64,
}

/// Owner of the authenticated identity.
///
/// Tokens and the serialized user live in durable storage under three separate
/// keys; the current user is mirrored in memory as a watch signal. Both sides
/// are either all set or all cleared.
pub struct SessionStore {
    storage: Arc<dyn DurableStorage>,
    navigator: Arc<dyn Navigator>,
    current_user: watch::Sender<Option<User>>,
    token_meta: Mutex<Option<TokenMeta>>,
}

impl SessionStore {
    /// Build the store and hydrate it from storage
    pub fn new(storage: Arc<dyn DurableStorage>, navigator: Arc<dyn Navigator>) -> Self {
        let (current_user, _) = watch::channel(None);
        let store = Self {
            storage,
            navigator,
            current_user,
            token_meta: Mutex::new(None),
        };
        store.hydrate();
        store
    }

    fn hydrate(&self) {
        match self.storage.get(keys::USER) {
            Some(_) if !self.storage.contains(keys::ACCESS_TOKEN) || !self.storage.contains(keys::REFRESH_TOKEN) => {
                tracing::warn!("Stored user has no tokens, logging out");
                self.logout();
            }
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => {
                    tracing::info!("Restored session for {}", user.email);
                    self.current_user.send_replace(Some(user));
                }
                Err(e) => {
                    tracing::warn!("Stored user is unreadable, logging out: {}", e);
                    self.logout();
                }
            },
            None => {
                // Tokens without a user cannot be used; drop them quietly
                if self.storage.contains(keys::ACCESS_TOKEN) || self.storage.contains(keys::REFRESH_TOKEN) {
                    tracing::debug!("Clearing tokens left without a stored user");
                    self.clear_keys();
                }
            }
        }
    }

    /// Persist a fresh login, registration or refresh result
    pub fn store_auth(&self, auth: &AuthResponse) -> Result<(), ClientError> {
        let user_json = serde_json::to_string(&auth.user)?;

        self.storage.set(keys::ACCESS_TOKEN, &auth.access_token)?;
        self.storage.set(keys::REFRESH_TOKEN, &auth.refresh_token)?;
        self.storage.set(keys::USER, &user_json)?;

        *self.token_meta.lock().unwrap_or_else(PoisonError::into_inner) = Some(TokenMeta {
            token_type: auth.token_type.clone(),
            expires_in: auth.expires_in,
        });
        self.current_user.send_replace(Some(auth.user.clone()));

        tracing::info!("Signed in as {}", auth.user.email);
        Ok(())
    }

    /// Replace the stored user after a profile update
    pub fn update_current_user(&self, user: User) -> Result<(), ClientError> {
        self.storage.set(keys::USER, &serde_json::to_string(&user)?)?;
        self.current_user.send_replace(Some(user));
        Ok(())
    }

    /// Drop tokens and identity, then go to the login page. Safe to call repeatedly.
    pub fn logout(&self) {
        self.clear_keys();
        *self.token_meta.lock().unwrap_or_else(PoisonError::into_inner) = None;

        if self.current_user.send_replace(None).is_some() {
            tracing::info!("Signed out");
        }
        self.navigator.navigate(Route::Login);
    }

    fn clear_keys(&self) {
        for key in [keys::ACCESS_TOKEN, keys::REFRESH_TOKEN, keys::USER] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!("Failed to remove {}: {}", key, e);
            }
        }
    }

    pub fn get_token(&self) -> Option<String> {
        self.storage.get(keys::ACCESS_TOKEN)
    }

    pub fn get_refresh_token(&self) -> Option<String> {
        self.storage.get(keys::REFRESH_TOKEN)
    }

    /// Optimistic: a present user counts as signed in, token expiry is not checked
    pub fn is_authenticated(&self) -> bool {
        self.current_user.borrow().is_some()
    }

    pub fn current_user(&self) -> Option<User> {
        self.current_user.borrow().clone()
    }

    pub fn watch_current_user(&self) -> watch::Receiver<Option<User>> {
        self.current_user.subscribe()
    }

    pub fn session(&self) -> Option<Session> {
        let user = self.current_user()?;
        let access_token = self.get_token()?;
        let meta = self
            .token_meta
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        Some(Session {
            user,
            access_token,
            refresh_token: self.get_refresh_token(),
            token_type: meta
                .as_ref()
                .map(|m| m.token_type.clone())
                .unwrap_or_else(|| "Bearer".to_string()),
            expires_in: meta.map(|m| m.expires_in),
        })
    }
}

impl AuthStatus for SessionStore {
    fn is_authenticated(&self) -> bool {
        SessionStore::is_authenticated(self)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("user", &self.current_user.borrow().as_ref().map(|u| u.email.clone()))
            .finish()
    }
}
