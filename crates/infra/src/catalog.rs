use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::info;

use stockroom_core::ItemId;
use stockroom_inventory::{Item, ItemEdit, NewItem, ReceiveStock};

use crate::error::{ServiceError, ServiceResult};
use crate::locks::KeyedLocks;
use crate::store::ItemStore;

/// Item registration, edits and stock intake.
///
/// Quantity changes go through the same per-item locks as the fulfillment
/// engine. `intake` serializes operations that look items up by name so two
/// concurrent intakes of a new name cannot create two items.
pub struct ItemCatalog<I>
where
    I: ItemStore,
{
    items: I,
    locks: Arc<KeyedLocks<ItemId>>,
    intake: Mutex<()>,
}

impl<I> ItemCatalog<I>
where
    I: ItemStore,
{
    pub fn new(items: I, locks: Arc<KeyedLocks<ItemId>>) -> Self {
        Self {
            items,
            locks,
            intake: Mutex::new(()),
        }
    }

    /// All items sorted by name, optionally filtered by a case-insensitive
    /// substring of the name.
    pub fn list(&self, search: Option<&str>) -> ServiceResult<Vec<Item>> {
        let needle = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut items: Vec<Item> = self
            .items
            .list()?
            .into_iter()
            .filter(|item| match &needle {
                Some(needle) => item.name().to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .collect();
        items.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(items)
    }

    /// Items at or below their reorder level.
    pub fn low_stock(&self) -> ServiceResult<Vec<Item>> {
        let mut items = self.list(None)?;
        items.retain(Item::is_low_stock);
        Ok(items)
    }

    pub fn get(&self, id: ItemId) -> ServiceResult<Item> {
        self.items.get(&id)?.ok_or(ServiceError::ItemNotFound(id))
    }

    fn find_by_name(&self, name: &str) -> ServiceResult<Option<Item>> {
        Ok(self.items.list()?.into_iter().find(|item| item.name() == name))
    }

    /// Register a new item, or merge the intake into the item with the same
    /// name. The flag is `true` when a new item was created.
    pub async fn create_or_restock(
        &self,
        new: NewItem,
        now: DateTime<Utc>,
    ) -> ServiceResult<(Item, bool)> {
        let _intake = self.intake.lock().await;

        let Some(existing) = self.find_by_name(new.name.trim())? else {
            let item = Item::create(ItemId::new(), new, now)?;
            self.items.save(item.clone())?;
            info!(item_id = %item.id_typed(), name = item.name(), quantity = item.quantity(), "item created");
            return Ok((item, true));
        };

        let id = existing.id_typed();
        let _guard = self.locks.acquire(id).await;
        let mut item = self.get(id)?;
        let added = new.quantity;
        item.restock(new, now)?;
        self.items.save(item.clone())?;

        info!(item_id = %id, name = item.name(), added, quantity = item.quantity(), "item restocked");
        Ok((item, false))
    }

    /// Edit descriptive fields and prices. Quantity is left untouched.
    pub async fn update(&self, id: ItemId, edit: ItemEdit, now: DateTime<Utc>) -> ServiceResult<Item> {
        let _intake = self.intake.lock().await;
        let _guard = self.locks.acquire(id).await;

        let mut item = self.get(id)?;
        let renamed = edit.name.trim();
        if renamed != item.name() {
            if let Some(other) = self.find_by_name(renamed)? {
                return Err(ServiceError::Conflict(format!(
                    "an item named {:?} already exists ({})",
                    other.name(),
                    other.id_typed()
                )));
            }
        }

        item.apply_edit(edit, now)?;
        self.items.save(item.clone())?;
        Ok(item)
    }

    pub async fn delete(&self, id: ItemId) -> ServiceResult<()> {
        let _intake = self.intake.lock().await;
        let _guard = self.locks.acquire(id).await;

        if !self.items.delete(&id)? {
            return Err(ServiceError::ItemNotFound(id));
        }
        info!(item_id = %id, "item deleted");
        Ok(())
    }

    /// Receive stock from a vendor.
    pub async fn add_stock(
        &self,
        id: ItemId,
        intake: ReceiveStock,
        now: DateTime<Utc>,
    ) -> ServiceResult<Item> {
        let _guard = self.locks.acquire(id).await;

        let mut item = self.get(id)?;
        let added = intake.quantity;
        item.receive(intake, now)?;
        self.items.save(item.clone())?;

        info!(item_id = %id, added, quantity = item.quantity(), "stock received");
        Ok(item)
    }
}
