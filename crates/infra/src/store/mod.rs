//! Record storage abstractions for items and packing slips.
//!
//! Stores are plain key-based storage with no concurrency control of their
//! own; the engine serializes quantity updates and never relies on a store to
//! keep stock non-negative.

pub mod in_memory;

use std::sync::Arc;

use thiserror::Error;

use stockroom_core::{ItemId, SlipId};
use stockroom_fulfillment::{PackingSlip, SlipNumber};
use stockroom_inventory::Item;

pub use in_memory::InMemoryStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store conflict: {0}")]
    Conflict(String),
}

/// Item records keyed by id.
pub trait ItemStore: Send + Sync {
    fn get(&self, id: &ItemId) -> Result<Option<Item>, StoreError>;
    fn save(&self, item: Item) -> Result<(), StoreError>;
    /// Returns whether a record was removed.
    fn delete(&self, id: &ItemId) -> Result<bool, StoreError>;
    fn list(&self) -> Result<Vec<Item>, StoreError>;
}

/// Packing slip records keyed by id.
pub trait SlipStore: Send + Sync {
    fn get(&self, id: &SlipId) -> Result<Option<PackingSlip>, StoreError>;
    /// Insert or replace. Must reject a slip number already used by another slip.
    fn save(&self, slip: PackingSlip) -> Result<(), StoreError>;
    /// Returns whether a record was removed.
    fn delete(&self, id: &SlipId) -> Result<bool, StoreError>;
    fn list(&self) -> Result<Vec<PackingSlip>, StoreError>;
    /// Lexicographically greatest stored slip number starting with `prefix`.
    fn last_number_with_prefix(&self, prefix: &str) -> Result<Option<SlipNumber>, StoreError>;
}

impl<S> ItemStore for Arc<S>
where
    S: ItemStore + ?Sized,
{
    fn get(&self, id: &ItemId) -> Result<Option<Item>, StoreError> {
        (**self).get(id)
    }

    fn save(&self, item: Item) -> Result<(), StoreError> {
        (**self).save(item)
    }

    fn delete(&self, id: &ItemId) -> Result<bool, StoreError> {
        (**self).delete(id)
    }

    fn list(&self) -> Result<Vec<Item>, StoreError> {
        (**self).list()
    }
}

impl<S> SlipStore for Arc<S>
where
    S: SlipStore + ?Sized,
{
    fn get(&self, id: &SlipId) -> Result<Option<PackingSlip>, StoreError> {
        (**self).get(id)
    }

    fn save(&self, slip: PackingSlip) -> Result<(), StoreError> {
        (**self).save(slip)
    }

    fn delete(&self, id: &SlipId) -> Result<bool, StoreError> {
        (**self).delete(id)
    }

    fn list(&self) -> Result<Vec<PackingSlip>, StoreError> {
        (**self).list()
    }

    fn last_number_with_prefix(&self, prefix: &str) -> Result<Option<SlipNumber>, StoreError> {
        (**self).last_number_with_prefix(prefix)
    }
}
