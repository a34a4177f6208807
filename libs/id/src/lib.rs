//! # tagid-id
//!
//! Self-describing binary identifiers for records spread over several
//! backing collections.
//!
//! ## Design Principles
//!
//! - Identifiers are opaque 16-byte values compared by value
//! - The trailing byte(s) carry a discriminator naming the owning type, so an
//!   identifier can be routed to its collection without a side lookup
//! - Every other byte is random, preserving collision resistance
//! - The discriminator registry is built once at setup and read lock-free
//!
//! ## Identifier Format
//!
//! The canonical string form is 32 lowercase hex characters with no
//! separators. With a one-byte discriminator the last two characters are the
//! discriminator:
//!
//! - `9f0c2d1e5a7b4c3d8e6f1a2b3c4d5e00` belongs to the type at `0x00`
//! - `4d2a9e7c1b3f4a6e9d8c7b6a5f4e3d0f` belongs to the type at `0x0f`

mod codec;
mod error;
mod generator;
mod identifier;
mod macros;
mod manifest;
mod registry;

pub use codec::{CandidateSource, IdentifierCodec, RandomSource, ScriptedSource};
pub use error::IdError;
pub use generator::{Candidates, GeneratorConfig, IdGenerator, MAX_UNIQUE_ATTEMPTS_ENV};
pub use identifier::{
    DiscriminatorWidth, IdKind, Identifier, IdentifierInput, ID_HEX_LEN, ID_LEN,
};
pub use manifest::{ManifestEntry, RegistryManifest};
pub use registry::{RecordType, Registration, RegistryBuilder, TypeRegistry};

/// Re-export uuid for consumers converting to and from [`uuid::Uuid`].
pub use uuid::Uuid;
