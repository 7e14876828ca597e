//! Error types for the skill.

use mass_client::ClientError;
use thiserror::Error;

/// Skill errors
#[derive(Debug, Error)]
pub enum SkillError {
    /// Music Assistant client error
    #[error("Music Assistant error: {0}")]
    Client(#[from] ClientError),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing or malformed locale resources
    #[error("Locale error: {0}")]
    Locale(String),

    /// skill.json could not be generated
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for skill operations
pub type Result<T> = std::result::Result<T, SkillError>;
