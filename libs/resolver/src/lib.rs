//! # tagid-resolver
//!
//! Resolves sets of [`tagid_id::Identifier`]s that may belong to different
//! record types. Each identifier's discriminator names its type; the
//! resolver groups identifiers by type, issues one lookup per type against
//! that type's [`BackingCollection`], and merges the results.
//!
//! Two entry points choose the failure semantics:
//! - [`BatchResolver::resolve`] is best-effort and omits what it cannot find
//! - [`BatchResolver::resolve_strict`] fails unless every identifier resolves
//!
//! Per-type lookups can be polled concurrently on the caller's executor and
//! fetched records can be kept in a bounded [`IdentityCache`]; see
//! [`ResolverConfig`].

mod cache;
mod collection;
mod config;
mod error;
mod memory;
mod request;
mod resolver;

pub use cache::{CacheStats, IdentityCache};
pub use collection::{generate_unique_in, BackingCollection, Projection, Record};
pub use config::{
    ResolverConfig, DEFAULT_CACHE_CAPACITY, IDENTITY_CACHE_CAPACITY_ENV, IDENTITY_CACHE_ENV,
    RESOLVE_CONCURRENT_ENV,
};
pub use error::ResolveError;
pub use memory::{LookupCall, MemoryCollection};
pub use request::{ResolveInput, ResolveOptions, Resolved};
pub use resolver::{BatchResolver, BatchResolverBuilder};
