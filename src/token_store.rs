use crate::models::{StoredSession, TokenPair, User};
use keyring::Entry;

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Durable key-value persistence for the token pair and the cached user.
///
/// All operations are best-effort: if the persistence medium is unavailable
/// the methods degrade to no-ops (reads return `None`) rather than erroring,
/// since losing the cache only costs the user a re-login. Implementations log
/// failures instead of surfacing them.
pub trait TokenStore: Send + Sync {
    /// Returns the stored pair, or `None` if either token is missing.
    fn tokens(&self) -> Option<TokenPair>;

    /// Unconditionally overwrites the stored pair. The cached user is kept.
    fn set_tokens(&self, tokens: TokenPair);

    fn cached_user(&self) -> Option<User>;

    fn cache_user(&self, user: &User);

    /// Removes the tokens and the cached user in one write, so no state
    /// exists where tokens are absent but a user record remains.
    fn clear(&self);
}

/// In-memory store, used in tests and for ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    session: Mutex<StoredSession>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn tokens(&self) -> Option<TokenPair> {
        self.session.lock().unwrap().tokens.clone()
    }

    fn set_tokens(&self, tokens: TokenPair) {
        self.session.lock().unwrap().tokens = Some(tokens);
    }

    fn cached_user(&self) -> Option<User> {
        self.session.lock().unwrap().user.clone()
    }

    fn cache_user(&self, user: &User) {
        self.session.lock().unwrap().user = Some(user.clone());
    }

    fn clear(&self) {
        *self.session.lock().unwrap() = StoredSession::default();
    }
}

/// Durable store backed by the OS keyring, with a JSON file fallback under
/// the user config directory for systems without a usable keyring.
///
/// The whole session (tokens plus cached user) is one serialized record, so
/// `clear` is a single delete and the tokens/user invariant cannot be split
/// by a partial write.
#[derive(Debug)]
pub struct KeyringTokenStore {
    keyring_entry: Option<Arc<Entry>>,
    session_file_path: PathBuf,
}

const KEYRING_SERVICE: &str = "cv-desk";
const KEYRING_USER: &str = "api_session";

impl KeyringTokenStore {
    pub fn new() -> Self {
        let keyring_entry = match Entry::new(KEYRING_SERVICE, KEYRING_USER) {
            Ok(entry) => Some(Arc::new(entry)),
            Err(e) => {
                tracing::warn!(
                    "Keyring is not available on this system ({}), will use file-based storage.",
                    e
                );
                None
            }
        };

        let mut session_file_path = dirs::config_dir()
            .unwrap_or_else(|| std::env::current_dir().expect("Current directory not accessible"));
        session_file_path.push("cv-desk");
        session_file_path.push("session.json");

        KeyringTokenStore {
            keyring_entry,
            session_file_path,
        }
    }

    /// File-only store at an explicit path. Used in tests, where the keyring
    /// is usually unavailable anyway.
    pub fn with_file_path(path: PathBuf) -> Self {
        KeyringTokenStore {
            keyring_entry: None,
            session_file_path: path,
        }
    }

    fn load(&self) -> StoredSession {
        // Keyring first, file second
        if let Some(ref entry) = self.keyring_entry {
            match entry.get_password() {
                Ok(json) if !json.is_empty() => match serde_json::from_str(&json) {
                    Ok(session) => return session,
                    Err(e) => {
                        tracing::warn!("Stored session in keyring is unreadable: {}", e);
                    }
                },
                Ok(_) | Err(keyring::Error::NoEntry) => {}
                Err(e) => {
                    tracing::warn!("Failed to read session from keyring: {}", e);
                }
            }
        }

        if !self.session_file_path.exists() {
            return StoredSession::default();
        }
        match fs::read_to_string(&self.session_file_path) {
            Ok(json) if !json.trim().is_empty() => {
                serde_json::from_str(&json).unwrap_or_else(|e| {
                    tracing::warn!("Stored session file is unreadable: {}", e);
                    StoredSession::default()
                })
            }
            Ok(_) => StoredSession::default(),
            Err(e) => {
                tracing::warn!("Failed to read session file: {}", e);
                StoredSession::default()
            }
        }
    }

    fn save(&self, session: &StoredSession) {
        let json = match serde_json::to_string(session) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize session: {}", e);
                return;
            }
        };

        if let Some(ref entry) = self.keyring_entry {
            match entry.set_password(&json) {
                Ok(()) => {
                    tracing::debug!("Session saved to keyring");
                    return;
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to save session to keyring: {}. Trying file storage.",
                        e
                    );
                }
            }
        }

        if let Some(parent) = self.session_file_path.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            tracing::warn!("Failed to create session directory: {}", e);
            return;
        }
        match fs::write(&self.session_file_path, json) {
            Ok(()) => tracing::debug!("Session saved to {:?}", self.session_file_path),
            Err(e) => tracing::warn!("Failed to write session file: {}", e),
        }
    }

    fn delete(&self) {
        if let Some(ref entry) = self.keyring_entry {
            match entry.delete_password() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => tracing::warn!("Failed to delete session from keyring: {}", e),
            }
        }

        if self.session_file_path.exists()
            && let Err(e) = fs::remove_file(&self.session_file_path)
        {
            tracing::warn!("Failed to delete session file: {}", e);
        }
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn tokens(&self) -> Option<TokenPair> {
        self.load().tokens
    }

    fn set_tokens(&self, tokens: TokenPair) {
        let mut session = self.load();
        session.tokens = Some(tokens);
        self.save(&session);
    }

    fn cached_user(&self) -> Option<User> {
        self.load().user
    }

    fn cache_user(&self, user: &User) {
        let mut session = self.load();
        session.user = Some(user.clone());
        self.save(&session);
    }

    fn clear(&self) {
        self.delete();
    }
}
