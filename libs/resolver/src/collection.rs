//! Backing-collection interface.
//!
//! A backing collection is the external store holding one record type. The
//! resolver needs exactly two calls from it:
//! - `exists` for collision-checked generation
//! - `lookup_by_ids` for batch resolution, one call per type group

use anyhow::Result;
use async_trait::async_trait;
use tagid_id::{IdGenerator, Identifier};
use tracing::debug;

use crate::ResolveError;

/// A record returned by a backing collection.
pub trait Record: Clone + Send + Sync + 'static {
    /// The record's identifier.
    fn id(&self) -> Identifier;

    /// Copy of this record limited to `projection`.
    ///
    /// Defaults to a full clone for record types that do not support
    /// partial reads.
    fn project(&self, projection: &Projection) -> Self {
        let _ = projection;
        self.clone()
    }
}

/// Field projection passed through to the backing collection unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Projection(Vec<String>);

impl Projection {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(fields.into_iter().map(Into::into).collect())
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|f| f == field)
    }
}

impl<S: Into<String>> FromIterator<S> for Projection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Store holding the records of one type.
#[async_trait]
pub trait BackingCollection<R: Record>: Send + Sync {
    /// Whether `id` is already in use.
    async fn exists(&self, id: &Identifier) -> Result<bool>;

    /// Fetches the records for `ids`. Unknown identifiers are omitted.
    async fn lookup_by_ids(
        &self,
        ids: &[Identifier],
        projection: Option<&Projection>,
    ) -> Result<Vec<R>>;
}

/// Mints an identifier for `type_name` that `collection` reports as unused.
///
/// Candidates are probed one at a time and the generator's retry cap
/// applies.
pub async fn generate_unique_in<R: Record>(
    generator: &IdGenerator,
    type_name: &str,
    collection: &dyn BackingCollection<R>,
) -> Result<Identifier, ResolveError> {
    for (attempt, candidate) in generator.candidates(type_name).enumerate() {
        let in_use = collection
            .exists(&candidate)
            .await
            .map_err(|source| ResolveError::Collection {
                type_name: type_name.to_string(),
                source,
            })?;

        if !in_use {
            return Ok(candidate);
        }

        debug!(
            type_name = %type_name,
            identifier = %candidate,
            attempt = attempt + 1,
            "Identifier already in use, retrying"
        );
    }

    Err(generator.exhausted(type_name).into())
}
