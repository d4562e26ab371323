use crate::registry::RegistryType;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Registry type already registered: {0}")]
    AlreadyRegistered(RegistryType),

    #[error("No registry configuration for type: {0}")]
    ConfigNotFound(RegistryType),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
