//! Service catalog.
//!
//! Maps a service identifier to its [`ServiceDescriptor`] and to the
//! [`ResponseTranslator`] that normalizes the service's enumeration response.
//! Discovery, reconciliation and generation are written against these two
//! pieces only, so adding a service means registering one more entry.

mod builtin;
mod translate;

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use cloudsentry_protocols::{CloudError, Listing, MetricDescriptor, ResourceRecord, ServiceDescriptor};

use crate::error::CatalogError;

pub use translate::{
    CacheClusterTranslator, DbInstanceTranslator, FunctionTranslator, InstanceTranslator,
    NameSource, NamedResourceTranslator,
};

/// Turns a service-shaped listing into normalized records.
pub trait ResponseTranslator: Send + Sync {
    fn translate(&self, listing: Listing, region: &str) -> Result<Vec<ResourceRecord>, CloudError>;
}

/// One registered service.
pub struct CatalogEntry {
    pub descriptor: ServiceDescriptor,
    pub translator: Arc<dyn ResponseTranslator>,
}

impl std::fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Registration-ordered, case-insensitive service registry.
#[derive(Debug, Default)]
pub struct ServiceCatalog {
    entries: Vec<Arc<CatalogEntry>>,
    index: HashMap<String, usize>,
}

impl ServiceCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every built-in service.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for (descriptor, translator) in builtin::entries() {
            let added = catalog.insert(descriptor, translator);
            debug_assert!(added, "built-in service identifiers are distinct");
        }
        catalog
    }

    /// Register a service.
    ///
    /// Returns an error if a service with the same identifier (ignoring case)
    /// is already registered.
    pub fn register(
        &mut self,
        descriptor: ServiceDescriptor,
        translator: Arc<dyn ResponseTranslator>,
    ) -> Result<(), CatalogError> {
        if self.index.contains_key(&descriptor.id.to_lowercase()) {
            return Err(CatalogError::AlreadyRegistered(descriptor.id));
        }
        self.insert(descriptor, translator);
        Ok(())
    }

    /// Add an entry unless its identifier is taken; returns whether it was added.
    fn insert(
        &mut self,
        descriptor: ServiceDescriptor,
        translator: Arc<dyn ResponseTranslator>,
    ) -> bool {
        match self.index.entry(descriptor.id.to_lowercase()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(self.entries.len());
                self.entries.push(Arc::new(CatalogEntry {
                    descriptor,
                    translator,
                }));
                true
            }
        }
    }

    /// Case-insensitive entry lookup.
    pub fn entry(&self, service: &str) -> Result<Arc<CatalogEntry>, CatalogError> {
        self.index
            .get(&service.trim().to_lowercase())
            .map(|&i| self.entries[i].clone())
            .ok_or_else(|| CatalogError::NotFound(service.to_string()))
    }

    /// Case-insensitive descriptor lookup.
    pub fn lookup(&self, service: &str) -> Result<&ServiceDescriptor, CatalogError> {
        self.index
            .get(&service.trim().to_lowercase())
            .map(|&i| &self.entries[i].descriptor)
            .ok_or_else(|| CatalogError::NotFound(service.to_string()))
    }

    /// Service identifiers in registration order.
    pub fn services(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.descriptor.id.clone()).collect()
    }

    /// Monitorable metrics of a service.
    pub fn metrics(&self, service: &str) -> Result<Vec<MetricDescriptor>, CatalogError> {
        self.lookup(service).map(|d| d.metrics.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
