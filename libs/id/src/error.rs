//! Error types for identifier parsing, registration and generation.

use thiserror::Error;

/// Errors that can occur when registering types or handling identifiers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The discriminator does not fit the registry's discriminator width.
    #[error("discriminator {value} is out of range (maximum is {max})")]
    DiscriminatorOutOfRange { value: u32, max: u16 },

    /// The discriminator is already bound to a different type.
    #[error("discriminator {discriminator:#x} is already bound to '{existing}', cannot bind '{attempted}'")]
    DuplicateDiscriminator {
        discriminator: u16,
        existing: String,
        attempted: String,
    },

    /// The type name is already bound to a different discriminator.
    #[error("type '{type_name}' is already registered with discriminator {existing:#x}, cannot rebind to {attempted:#x}")]
    TypeAlreadyRegistered {
        type_name: String,
        existing: u16,
        attempted: u16,
    },

    /// The input cannot be read as an identifier.
    #[error("invalid identifier format: {message}")]
    InvalidIdentifierFormat { message: String },

    /// Strict decode found a discriminator with no registered type.
    #[error("no type registered for discriminator {discriminator:#x} of identifier {identifier}")]
    UnknownDiscriminator {
        discriminator: u16,
        identifier: String,
    },

    /// Collision-checked generation hit the configured retry cap.
    #[error("no unused identifier for '{type_name}' after {attempts} attempts")]
    UniqueIdentifierExhausted { type_name: String, attempts: u32 },

    /// The registry manifest could not be read.
    #[error("invalid registry manifest: {0}")]
    InvalidManifest(String),
}

impl IdError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        IdError::InvalidIdentifierFormat {
            message: message.into(),
        }
    }

    /// Returns true if this error was raised while building a registry.
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            IdError::DiscriminatorOutOfRange { .. }
                | IdError::DuplicateDiscriminator { .. }
                | IdError::TypeAlreadyRegistered { .. }
                | IdError::InvalidManifest(_)
        )
    }

    /// Returns true if this error indicates malformed identifier input.
    pub fn is_format_error(&self) -> bool {
        matches!(self, IdError::InvalidIdentifierFormat { .. })
    }

    /// Stable reason code, suitable for logs and metrics labels.
    pub fn reason_code(&self) -> &'static str {
        match self {
            IdError::DiscriminatorOutOfRange { .. } => "discriminator_out_of_range",
            IdError::DuplicateDiscriminator { .. } => "duplicate_discriminator",
            IdError::TypeAlreadyRegistered { .. } => "type_already_registered",
            IdError::InvalidIdentifierFormat { .. } => "invalid_identifier_format",
            IdError::UnknownDiscriminator { .. } => "unknown_discriminator",
            IdError::UniqueIdentifierExhausted { .. } => "unique_identifier_exhausted",
            IdError::InvalidManifest(_) => "invalid_manifest",
        }
    }
}
