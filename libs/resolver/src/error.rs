//! Resolution errors.

use tagid_id::{IdError, Identifier};
use thiserror::Error;

/// Errors returned by the batch resolver.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Parsing, decoding or generation failed.
    #[error(transparent)]
    Id(#[from] IdError),

    /// Strict resolution could not map these identifiers to a type.
    #[error("cannot determine the type of identifiers [{}]", join_ids(.identifiers))]
    UnresolvableIdentifier { identifiers: Vec<Identifier> },

    /// Strict resolution found fewer records than distinct identifiers.
    #[error(
        "expected {} records for [{}], found {found}",
        .requested.len(),
        join_ids(.requested)
    )]
    IncompleteResolution {
        requested: Vec<Identifier>,
        found: usize,
    },

    /// The type decoded fine but no backing collection was attached for it.
    #[error("no backing collection attached for type '{type_name}'")]
    MissingCollection { type_name: String },

    /// The backing collection reported a failure.
    #[error("lookup in '{type_name}' failed: {source}")]
    Collection {
        type_name: String,
        source: anyhow::Error,
    },
}

impl ResolveError {
    /// Number of requested identifiers, for errors that carry them.
    pub fn requested(&self) -> Option<usize> {
        match self {
            ResolveError::IncompleteResolution { requested, .. } => Some(requested.len()),
            _ => None,
        }
    }

    /// Stable reason code, suitable for logs and metrics labels.
    pub fn reason_code(&self) -> &'static str {
        match self {
            ResolveError::Id(e) => e.reason_code(),
            ResolveError::UnresolvableIdentifier { .. } => "unresolvable_identifier",
            ResolveError::IncompleteResolution { .. } => "incomplete_resolution",
            ResolveError::MissingCollection { .. } => "missing_collection",
            ResolveError::Collection { .. } => "collection_error",
        }
    }
}

fn join_ids(ids: &[Identifier]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
