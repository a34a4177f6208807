//! In-memory backing collection.
//!
//! Used by tests and during development in place of a real store. It counts
//! every call so tests can assert on the fan-out.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use anyhow::Result;
use async_trait::async_trait;
use tagid_id::Identifier;
use tracing::debug;

use crate::collection::{BackingCollection, Projection, Record};

/// A backing collection over a map.
#[derive(Debug)]
pub struct MemoryCollection<R> {
    name: String,
    records: RwLock<HashMap<Identifier, R>>,
    exists_calls: AtomicUsize,
    lookups: Mutex<Vec<LookupCall>>,
    fail_lookups: AtomicBool,
}

/// One recorded `lookup_by_ids` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupCall {
    pub ids: Vec<Identifier>,
    pub projection: Option<Projection>,
}

impl<R: Record> MemoryCollection<R> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: RwLock::new(HashMap::new()),
            exists_calls: AtomicUsize::new(0),
            lookups: Mutex::new(Vec::new()),
            fail_lookups: AtomicBool::new(false),
        }
    }

    pub fn with_records(name: impl Into<String>, records: impl IntoIterator<Item = R>) -> Self {
        let collection = Self::new(name);
        for record in records {
            collection.insert(record);
        }
        collection
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn insert(&self, record: R) {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(record.id(), record);
    }

    pub fn remove(&self, id: &Identifier) -> Option<R> {
        self.records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Makes subsequent lookups fail.
    pub fn fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    pub fn exists_count(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }

    pub fn lookup_count(&self) -> usize {
        self.lookup_calls().len()
    }

    /// Every lookup received so far, oldest first.
    pub fn lookup_calls(&self) -> Vec<LookupCall> {
        self.lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl<R: Record> BackingCollection<R> for MemoryCollection<R> {
    async fn exists(&self, id: &Identifier) -> Result<bool> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id))
    }

    async fn lookup_by_ids(
        &self,
        ids: &[Identifier],
        projection: Option<&Projection>,
    ) -> Result<Vec<R>> {
        self.lookups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LookupCall {
                ids: ids.to_vec(),
                projection: projection.cloned(),
            });

        if self.fail_lookups.load(Ordering::SeqCst) {
            anyhow::bail!("collection '{}' is unavailable", self.name);
        }

        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let found: Vec<R> = ids
            .iter()
            .filter_map(|id| records.get(id))
            .map(|record| match projection {
                Some(projection) => record.project(projection),
                None => record.clone(),
            })
            .collect();

        debug!(
            collection = %self.name,
            requested = ids.len(),
            found = found.len(),
            "Memory lookup"
        );

        Ok(found)
    }
}
