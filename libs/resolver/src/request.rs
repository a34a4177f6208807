//! Resolution inputs, options and results.

use tagid_id::{Identifier, IdentifierInput, Uuid};

use crate::collection::Projection;

/// Identifiers handed to a resolve call.
///
/// The shape is preserved: a bare identifier resolves to at most one record,
/// a list (even of one) resolves to a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveInput {
    One(IdentifierInput),
    Many(Vec<IdentifierInput>),
}

impl ResolveInput {
    pub fn one(input: impl Into<IdentifierInput>) -> Self {
        ResolveInput::One(input.into())
    }

    pub fn many<I, T>(inputs: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<IdentifierInput>,
    {
        ResolveInput::Many(inputs.into_iter().map(Into::into).collect())
    }

    pub fn is_single(&self) -> bool {
        matches!(self, ResolveInput::One(_))
    }

    pub(crate) fn into_inputs(self) -> Vec<IdentifierInput> {
        match self {
            ResolveInput::One(input) => vec![input],
            ResolveInput::Many(inputs) => inputs,
        }
    }
}

impl From<Identifier> for ResolveInput {
    fn from(id: Identifier) -> Self {
        ResolveInput::one(id)
    }
}

impl From<&Identifier> for ResolveInput {
    fn from(id: &Identifier) -> Self {
        ResolveInput::one(id)
    }
}

impl From<Uuid> for ResolveInput {
    fn from(uuid: Uuid) -> Self {
        ResolveInput::one(uuid)
    }
}

impl From<&str> for ResolveInput {
    fn from(s: &str) -> Self {
        ResolveInput::one(s)
    }
}

impl From<String> for ResolveInput {
    fn from(s: String) -> Self {
        ResolveInput::one(s)
    }
}

impl<T: Into<IdentifierInput>> From<Vec<T>> for ResolveInput {
    fn from(inputs: Vec<T>) -> Self {
        ResolveInput::many(inputs)
    }
}

impl<T: Into<IdentifierInput> + Clone> From<&[T]> for ResolveInput {
    fn from(inputs: &[T]) -> Self {
        ResolveInput::many(inputs.iter().cloned())
    }
}

impl<T: Into<IdentifierInput>, const N: usize> From<[T; N]> for ResolveInput {
    fn from(inputs: [T; N]) -> Self {
        ResolveInput::many(inputs)
    }
}

/// Per-call resolution options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Fields to fetch. Passed to every backing collection unchanged.
    pub projection: Option<Projection>,

    /// Fail on identifiers whose discriminator has no registered type
    /// instead of skipping them.
    pub strict: bool,
}

impl ResolveOptions {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }
}

/// Result of a resolve call, shaped like its input.
///
/// Records from different types come back grouped by type; no order across
/// types is guaranteed.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<R> {
    /// The input was a bare identifier.
    One(Option<R>),
    /// The input was a list.
    Many(Vec<R>),
}

impl<R> Resolved<R> {
    pub fn is_single(&self) -> bool {
        matches!(self, Resolved::One(_))
    }

    /// Number of records found.
    pub fn len(&self) -> usize {
        match self {
            Resolved::One(record) => usize::from(record.is_some()),
            Resolved::Many(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The single record, or the first of a list.
    pub fn into_one(self) -> Option<R> {
        match self {
            Resolved::One(record) => record,
            Resolved::Many(records) => records.into_iter().next(),
        }
    }

    pub fn into_many(self) -> Vec<R> {
        match self {
            Resolved::One(record) => record.into_iter().collect(),
            Resolved::Many(records) => records,
        }
    }
}
