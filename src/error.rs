use thiserror::Error;

#[derive(Debug, Error)]
pub enum HfError {
    #[error("{name} environment variable not set. Add it to the environment or a .env file.")]
    MissingCredential { name: &'static str },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Client error: {0}")]
    ClientError(String),

    #[error("Server error: {0}")]
    ServerError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HfError>;
