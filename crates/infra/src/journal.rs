//! Staged stock movements for a single engine operation.
//!
//! Every withdraw and restore is applied to an in-memory copy first. Nothing
//! reaches the item store until [`StockJournal::commit`], and a failed commit
//! puts back whatever it already wrote. The caller must hold the item locks for
//! every item the journal touches.

use std::collections::HashMap;

use tracing::{error, warn};

use stockroom_core::ItemId;
use stockroom_fulfillment::{LineRequest, SlipLine};
use stockroom_inventory::{Allocation, Item};

use crate::error::{ServiceError, ServiceResult};
use crate::store::ItemStore;

pub struct StockJournal<'a, I>
where
    I: ItemStore + ?Sized,
{
    store: &'a I,
    staged: HashMap<ItemId, Item>,
    originals: HashMap<ItemId, Item>,
    order: Vec<ItemId>,
    written: Vec<ItemId>,
}

impl<'a, I> StockJournal<'a, I>
where
    I: ItemStore + ?Sized,
{
    pub fn new(store: &'a I) -> Self {
        Self {
            store,
            staged: HashMap::new(),
            originals: HashMap::new(),
            order: Vec::new(),
            written: Vec::new(),
        }
    }

    fn load(&mut self, id: ItemId) -> ServiceResult<Option<&mut Item>> {
        if !self.staged.contains_key(&id) {
            let Some(item) = self.store.get(&id)? else {
                return Ok(None);
            };
            self.originals.insert(id, item.clone());
            self.staged.insert(id, item);
            self.order.push(id);
        }
        Ok(self.staged.get_mut(&id))
    }

    /// Allocate one requested line against the staged stock level.
    pub fn allocate(&mut self, request: &LineRequest) -> ServiceResult<SlipLine> {
        let item = self
            .load(request.item_id)?
            .ok_or(ServiceError::ItemNotFound(request.item_id))?;

        let allocation = Allocation::compute(request.quantity, item.quantity());
        item.withdraw(allocation.allocated)?;

        Ok(SlipLine {
            item_id: request.item_id,
            name: item.name().to_string(),
            quantity: allocation.allocated,
            price: request.price,
            backorder_quantity: allocation.backorder,
        })
    }

    /// Give a line's allocated quantity back. Returns `false` when the item no
    /// longer exists.
    pub fn restore(&mut self, line: &SlipLine) -> ServiceResult<bool> {
        match self.load(line.item_id)? {
            Some(item) => {
                item.restore(line.quantity)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Write every changed item. On failure the items already written are put
    /// back before the error is returned.
    pub fn commit(&mut self) -> ServiceResult<()> {
        for id in self.order.clone() {
            let (Some(staged), Some(original)) = (self.staged.get(&id), self.originals.get(&id))
            else {
                continue;
            };
            if staged == original {
                continue;
            }
            if let Err(err) = self.store.save(staged.clone()) {
                warn!(item_id = %id, error = %err, "stock commit failed; reverting");
                self.revert();
                return Err(err.into());
            }
            self.written.push(id);
        }
        Ok(())
    }

    /// Put back the pre-operation state of every item written by `commit`.
    pub fn revert(&mut self) {
        while let Some(id) = self.written.pop() {
            let Some(original) = self.originals.get(&id) else {
                continue;
            };
            if let Err(err) = self.store.save(original.clone()) {
                error!(item_id = %id, error = %err, "failed to revert stock; manual repair needed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryStore, StoreError};
    use chrono::Utc;
    use stockroom_inventory::NewItem;

    fn stocked(name: &str, quantity: u64) -> Item {
        Item::create(
            ItemId::new(),
            NewItem {
                name: name.to_string(),
                quantity,
                cost_price: 100,
                selling_price: 200,
                latest_price: 100,
                reorder_level: 0,
                purchase_history: Vec::new(),
                vendor: None,
                image_url: None,
            },
            Utc::now(),
        )
        .unwrap()
    }

    /// Rejects every save of one particular item.
    struct FailsOn {
        inner: InMemoryStore<Item>,
        broken: ItemId,
    }

    impl ItemStore for FailsOn {
        fn get(&self, id: &ItemId) -> Result<Option<Item>, StoreError> {
            self.inner.get(id)
        }

        fn save(&self, item: Item) -> Result<(), StoreError> {
            if item.id_typed() == self.broken {
                return Err(StoreError::Unavailable("disk full".to_string()));
            }
            self.inner.save(item)
        }

        fn delete(&self, id: &ItemId) -> Result<bool, StoreError> {
            self.inner.delete(id)
        }

        fn list(&self) -> Result<Vec<Item>, StoreError> {
            self.inner.list()
        }
    }

    #[test]
    fn staged_changes_are_invisible_until_commit() {
        let store: InMemoryStore<Item> = InMemoryStore::new();
        let item = stocked("Widget", 10);
        let id = item.id_typed();
        store.save(item).unwrap();

        let mut journal = StockJournal::new(&store);
        let line = journal
            .allocate(&LineRequest { item_id: id, quantity: 4, price: 250 })
            .unwrap();
        assert_eq!(line.quantity, 4);
        assert_eq!(line.name, "Widget");
        assert_eq!(store.get(&id).unwrap().unwrap().quantity(), 10);

        journal.commit().unwrap();
        assert_eq!(store.get(&id).unwrap().unwrap().quantity(), 6);
    }

    #[test]
    fn restore_then_allocate_uses_restored_stock() {
        let store: InMemoryStore<Item> = InMemoryStore::new();
        let item = stocked("Widget", 0);
        let id = item.id_typed();
        store.save(item).unwrap();

        let mut journal = StockJournal::new(&store);
        let old = SlipLine {
            item_id: id,
            name: "Widget".to_string(),
            quantity: 10,
            price: 100,
            backorder_quantity: 0,
        };
        assert!(journal.restore(&old).unwrap());
        let line = journal
            .allocate(&LineRequest { item_id: id, quantity: 5, price: 100 })
            .unwrap();
        assert_eq!((line.quantity, line.backorder_quantity), (5, 0));

        journal.commit().unwrap();
        assert_eq!(store.get(&id).unwrap().unwrap().quantity(), 5);
    }

    #[test]
    fn missing_item_is_reported() {
        let store: InMemoryStore<Item> = InMemoryStore::new();
        let mut journal = StockJournal::new(&store);
        let missing = ItemId::new();

        let err = journal
            .allocate(&LineRequest { item_id: missing, quantity: 1, price: 1 })
            .unwrap_err();
        assert_eq!(err, ServiceError::ItemNotFound(missing));

        let line = SlipLine {
            item_id: missing,
            name: "Gone".to_string(),
            quantity: 1,
            price: 1,
            backorder_quantity: 0,
        };
        assert!(!journal.restore(&line).unwrap());
    }

    #[test]
    fn failed_commit_reverts_earlier_writes() {
        let a = stocked("A", 10);
        let b = stocked("B", 10);
        let (a_id, b_id) = (a.id_typed(), b.id_typed());
        let store = FailsOn {
            inner: InMemoryStore::new(),
            broken: b_id,
        };
        store.inner.save(a).unwrap();
        store.inner.save(b).unwrap();

        let mut journal = StockJournal::new(&store);
        journal
            .allocate(&LineRequest { item_id: a_id, quantity: 3, price: 1 })
            .unwrap();
        journal
            .allocate(&LineRequest { item_id: b_id, quantity: 3, price: 1 })
            .unwrap();

        let err = journal.commit().unwrap_err();
        assert!(matches!(err, ServiceError::Store(_)));
        assert_eq!(store.inner.get(&a_id).unwrap().unwrap().quantity(), 10);
        assert_eq!(store.inner.get(&b_id).unwrap().unwrap().quantity(), 10);
    }

    #[test]
    fn revert_restores_committed_items() {
        let store: InMemoryStore<Item> = InMemoryStore::new();
        let item = stocked("Widget", 10);
        let id = item.id_typed();
        store.save(item).unwrap();

        let mut journal = StockJournal::new(&store);
        journal
            .allocate(&LineRequest { item_id: id, quantity: 10, price: 1 })
            .unwrap();
        journal.commit().unwrap();
        assert_eq!(store.get(&id).unwrap().unwrap().quantity(), 0);

        journal.revert();
        assert_eq!(store.get(&id).unwrap().unwrap().quantity(), 10);
    }
}
