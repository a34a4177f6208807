//! Batch resolution of mixed-type identifiers.
//!
//! A resolve call normalizes its input, deduplicates it, groups the
//! identifiers by the type their discriminator names and sends one
//! `lookup_by_ids` per group to that type's backing collection. Group results
//! are concatenated in type-name order, so the caller's ordering is not
//! preserved.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use futures_util::future::join_all;
use tagid_id::{IdGenerator, Identifier, IdentifierCodec, RecordType, TypeRegistry};
use tracing::{debug, warn};

use crate::cache::IdentityCache;
use crate::collection::{generate_unique_in, BackingCollection, Projection, Record};
use crate::config::ResolverConfig;
use crate::request::{ResolveInput, ResolveOptions, Resolved};
use crate::ResolveError;

/// Builder for [`BatchResolver`].
pub struct BatchResolverBuilder<R: Record> {
    codec: IdentifierCodec,
    collections: HashMap<String, Arc<dyn BackingCollection<R>>>,
    config: ResolverConfig,
}

impl<R: Record> BatchResolverBuilder<R> {
    /// Attaches the backing collection for `type_name`.
    #[must_use]
    pub fn collection(
        mut self,
        type_name: impl Into<String>,
        collection: Arc<dyn BackingCollection<R>>,
    ) -> Self {
        self.collections.insert(type_name.into(), collection);
        self
    }

    /// Attaches the backing collection for a [`RecordType`].
    #[must_use]
    pub fn collection_for<T: RecordType>(self, collection: Arc<dyn BackingCollection<R>>) -> Self {
        self.collection(T::TYPE_NAME, collection)
    }

    #[must_use]
    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> BatchResolver<R> {
        let cache = self
            .config
            .identity_cache
            .then(|| IdentityCache::with_capacity(self.config.cache_capacity));
        BatchResolver {
            codec: self.codec,
            collections: self.collections,
            cache,
            config: self.config,
        }
    }
}

/// Resolves identifiers of any registered type against their collections.
pub struct BatchResolver<R: Record> {
    codec: IdentifierCodec,
    collections: HashMap<String, Arc<dyn BackingCollection<R>>>,
    cache: Option<IdentityCache<R>>,
    config: ResolverConfig,
}

/// One pending `lookup_by_ids` call.
struct GroupLookup<R: Record> {
    type_name: String,
    collection: Arc<dyn BackingCollection<R>>,
    ids: Vec<Identifier>,
}

impl<R: Record> GroupLookup<R> {
    async fn run(&self, projection: Option<&Projection>) -> Result<Vec<R>, ResolveError> {
        debug!(
            type_name = %self.type_name,
            count = self.ids.len(),
            projected = projection.is_some(),
            "Dispatching lookup"
        );

        self.collection
            .lookup_by_ids(&self.ids, projection)
            .await
            .map_err(|source| ResolveError::Collection {
                type_name: self.type_name.clone(),
                source,
            })
    }
}

impl<R: Record> BatchResolver<R> {
    pub fn builder(registry: Arc<TypeRegistry>) -> BatchResolverBuilder<R> {
        BatchResolverBuilder {
            codec: IdentifierCodec::new(registry),
            collections: HashMap::new(),
            config: ResolverConfig::default(),
        }
    }

    pub fn codec(&self) -> &IdentifierCodec {
        &self.codec
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The identity cache, when enabled.
    pub fn cache(&self) -> Option<&IdentityCache<R>> {
        self.cache.as_ref()
    }

    /// The backing collection attached for `type_name`.
    pub fn collection(
        &self,
        type_name: &str,
    ) -> Result<&Arc<dyn BackingCollection<R>>, ResolveError> {
        self.collections
            .get(type_name)
            .ok_or_else(|| ResolveError::MissingCollection {
                type_name: type_name.to_string(),
            })
    }

    /// Best-effort resolution.
    ///
    /// Identifiers that map to no type (unless `options.strict`) or to no
    /// record are left out of the result. A bare identifier input yields
    /// [`Resolved::One`]; a list input always yields [`Resolved::Many`].
    pub async fn resolve(
        &self,
        input: impl Into<ResolveInput>,
        options: &ResolveOptions,
    ) -> Result<Resolved<R>, ResolveError> {
        let input = input.into();
        let single = input.is_single();
        let ids = normalize(input)?;

        let records = self.fetch(&ids, options).await?;
        Ok(shape(single, &ids, records))
    }

    /// Resolution that requires a record for every distinct identifier.
    ///
    /// Type decoding is always strict here. Fails with
    /// [`ResolveError::IncompleteResolution`] when any record is missing.
    pub async fn resolve_strict(
        &self,
        input: impl Into<ResolveInput>,
        options: &ResolveOptions,
    ) -> Result<Resolved<R>, ResolveError> {
        let input = input.into();
        let single = input.is_single();
        let ids = normalize(input)?;

        let options = ResolveOptions {
            strict: true,
            ..options.clone()
        };
        let records = self.fetch(&ids, &options).await?;

        let requested: HashSet<Identifier> = ids.iter().copied().collect();
        let found = records
            .iter()
            .map(Record::id)
            .filter(|id| requested.contains(id))
            .collect::<HashSet<_>>()
            .len();

        if found != ids.len() {
            return Err(ResolveError::IncompleteResolution {
                requested: ids,
                found,
            });
        }

        Ok(shape(single, &ids, records))
    }

    /// Mints an identifier for `type_name` unused in its backing collection.
    pub async fn generate_unique(
        &self,
        generator: &IdGenerator,
        type_name: &str,
    ) -> Result<Identifier, ResolveError> {
        let collection = self.collection(type_name)?;
        generate_unique_in(generator, type_name, collection.as_ref()).await
    }

    async fn fetch(
        &self,
        ids: &[Identifier],
        options: &ResolveOptions,
    ) -> Result<Vec<R>, ResolveError> {
        let groups = self.group_by_type(ids, options.strict)?;
        let projection = options.projection.as_ref();
        let cache = self.cache.as_ref().filter(|_| projection.is_none());

        let mut records = Vec::new();
        let mut pending = Vec::with_capacity(groups.len());

        for (type_name, group) in groups {
            let collection = Arc::clone(self.collection(type_name)?);

            let group = match cache {
                Some(cache) => {
                    let (hits, misses) = cache.partition(group).await;
                    if !hits.is_empty() {
                        debug!(
                            type_name = %type_name,
                            count = hits.len(),
                            "Served from identity cache"
                        );
                    }
                    records.extend(hits);
                    misses
                }
                None => group,
            };

            if group.is_empty() {
                continue;
            }

            pending.push(GroupLookup {
                type_name: type_name.to_string(),
                collection,
                ids: group,
            });
        }

        let fetched = if self.config.concurrent && pending.len() > 1 {
            run_concurrent(&pending, projection).await?
        } else {
            let mut fetched = Vec::new();
            for lookup in &pending {
                fetched.extend(lookup.run(projection).await?);
            }
            fetched
        };

        if let Some(cache) = cache {
            cache.insert_many(&fetched).await;
        }

        records.extend(fetched);
        Ok(records)
    }

    /// Buckets identifiers by owning type name.
    fn group_by_type<'a>(
        &'a self,
        ids: &[Identifier],
        strict: bool,
    ) -> Result<BTreeMap<&'a str, Vec<Identifier>>, ResolveError> {
        let mut groups: BTreeMap<&str, Vec<Identifier>> = BTreeMap::new();
        let mut unresolvable = Vec::new();

        for id in ids {
            match self.codec.decode_type(id, false)? {
                Some(type_name) => groups.entry(type_name).or_default().push(*id),
                None => unresolvable.push(*id),
            }
        }

        if !unresolvable.is_empty() {
            if strict {
                return Err(ResolveError::UnresolvableIdentifier {
                    identifiers: unresolvable,
                });
            }
            warn!(
                count = unresolvable.len(),
                "Skipping identifiers with unregistered discriminators"
            );
        }

        Ok(groups)
    }
}

/// Parses every input and drops repeats, keeping first-seen order.
fn normalize(input: ResolveInput) -> Result<Vec<Identifier>, ResolveError> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    for raw in input.into_inputs() {
        let id = raw.parse()?;
        if seen.insert(id) {
            ids.push(id);
        }
    }

    Ok(ids)
}

/// Polls every group lookup together and waits for all of them before
/// merging. Runs on whatever executor drives the resolve call.
async fn run_concurrent<R: Record>(
    pending: &[GroupLookup<R>],
    projection: Option<&Projection>,
) -> Result<Vec<R>, ResolveError> {
    let results = join_all(pending.iter().map(|lookup| lookup.run(projection))).await;

    let mut fetched = Vec::new();
    for result in results {
        fetched.extend(result?);
    }

    Ok(fetched)
}

fn shape<R: Record>(single: bool, ids: &[Identifier], records: Vec<R>) -> Resolved<R> {
    if !single {
        return Resolved::Many(records);
    }

    let record = ids
        .first()
        .and_then(|wanted| records.into_iter().find(|r| r.id() == *wanted));
    Resolved::One(record)
}
