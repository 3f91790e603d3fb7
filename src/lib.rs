pub mod api_client;
pub mod cli;
pub mod config;
pub mod errors;
pub mod logger;
pub mod models;
pub mod resources;
pub mod session;
pub mod token_store;
pub mod traits;

pub use api_client::ApiClient;
pub use config::Config;
pub use errors::{ApiError, AppError, AuthError, ConfigError};
pub use models::{RegisterRequest, TokenPair, TokenResponse, User, UserPatch};
pub use resources::Resources;
pub use session::{SessionManager, SessionState};
pub use token_store::{KeyringTokenStore, MemoryTokenStore, TokenStore};
pub use traits::{LogSessionExpiryHandler, SessionExpiryHandler};
