use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load dashboard configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Rejected dashboard configuration: {0}")]
    ValidationError(String),
}
