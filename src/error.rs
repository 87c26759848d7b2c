use std::fmt;

#[derive(Debug)]
pub enum OrbError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Config(String),
    InvalidUrl(url::ParseError),
    /// An injected collaborator refused or does not support the call.
    Hub(String),
    Enhancement(String),
}

impl fmt::Display for OrbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrbError::Io(e) => write!(f, "I/O error: {e}"),
            OrbError::Json(e) => write!(f, "JSON error: {e}"),
            OrbError::Config(msg) => write!(f, "invalid config: {msg}"),
            OrbError::InvalidUrl(e) => write!(f, "invalid URL: {e}"),
            OrbError::Hub(msg) => write!(f, "profile hub: {msg}"),
            OrbError::Enhancement(msg) => write!(f, "sphere enhancement: {msg}"),
        }
    }
}

impl std::error::Error for OrbError {}

impl From<std::io::Error> for OrbError {
    fn from(e: std::io::Error) -> Self {
        OrbError::Io(e)
    }
}

impl From<serde_json::Error> for OrbError {
    fn from(e: serde_json::Error) -> Self {
        OrbError::Json(e)
    }
}

impl From<toml::de::Error> for OrbError {
    fn from(e: toml::de::Error) -> Self {
        OrbError::Config(e.to_string())
    }
}

impl From<url::ParseError> for OrbError {
    fn from(e: url::ParseError) -> Self {
        OrbError::InvalidUrl(e)
    }
}

pub type Result<T> = std::result::Result<T, OrbError>;
