use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    /// API transport/protocol errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Session-level errors
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generic error
    #[error("{message}")]
    Generic { message: String },
}

/// Errors surfaced by the HTTP client core
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, timeout, ...)
    #[error("Network error: {source}")]
    Network {
        #[source]
        source: reqwest::Error,
    },

    /// A response arrived but its body could not be decoded
    #[error("Response parsing failed: {source}")]
    Parse {
        #[source]
        source: reqwest::Error,
    },

    /// The request body could not be serialized
    #[error("Request encoding failed: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },

    /// Non-2xx response; `detail` is the server's message when it sent one
    #[error("{detail}")]
    Server { status: u16, detail: String },

    /// The access token expired and could not be refreshed. The token store
    /// has already been cleared and the expiry handler notified.
    #[error("Session expired")]
    SessionExpired,
}

impl ApiError {
    /// Status code of a `Server` error, if that is what this is.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Session manager errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Underlying API call failed
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Operation requires an authenticated session
    #[error("No authenticated session")]
    NotAuthenticated,
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file
    #[error("Failed to load config file: {source}")]
    LoadError {
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the config file
    #[error("Failed to parse config file: {source}")]
    ParseError {
        #[source]
        source: toml::de::Error,
    },

    /// Config file parsed but holds an invalid value
    #[error("Configuration validation failed: {reason}")]
    ValidationError { reason: String },
}

impl From<std::io::Error> for ConfigError {
    fn from(error: std::io::Error) -> Self {
        ConfigError::LoadError { source: error }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(error: toml::de::Error) -> Self {
        ConfigError::ParseError { source: error }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ApiError::Parse { source: error }
        } else {
            ApiError::Network { source: error }
        }
    }
}
