//! Identity collaborator: resolves a client credential to a stable user id.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

pub type UserId = String;

/// Black-box identity verification. The core only requires a stable user id
/// before permitting intents; how the credential is checked is not its
/// concern.
#[async_trait::async_trait]
pub trait Identity: Send + Sync {
    /// Resolve a credential blob to a user id, or `None` when the credential
    /// is invalid or expired.
    async fn authenticate(&self, credential: &str) -> anyhow::Result<Option<UserId>>;
}

/// Token-based identity backend. Strict mode only accepts pre-registered
/// tokens; permissive mode (development) derives a stable id from any
/// non-empty credential.
pub struct TokenRegistry {
    tokens: Mutex<HashMap<String, UserId>>,
    permissive: bool,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
            permissive: false,
        }
    }

    pub fn permissive() -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
            permissive: true,
        }
    }

    pub fn register(&self, token: impl Into<String>, user_id: impl Into<UserId>) {
        let mut tokens = self.tokens.lock().expect("token lock poisoned");
        tokens.insert(token.into(), user_id.into());
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Identity for TokenRegistry {
    async fn authenticate(&self, credential: &str) -> anyhow::Result<Option<UserId>> {
        if credential.is_empty() {
            return Ok(None);
        }
        {
            let tokens = self.tokens.lock().expect("token lock poisoned");
            if let Some(user_id) = tokens.get(credential) {
                return Ok(Some(user_id.clone()));
            }
        }
        if self.permissive {
            let mut hasher = DefaultHasher::new();
            credential.hash(&mut hasher);
            return Ok(Some(format!("user-{:016x}", hasher.finish())));
        }
        Ok(None)
    }
}
