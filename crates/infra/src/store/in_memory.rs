use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use stockroom_core::{Entity, ItemId, SlipId};
use stockroom_fulfillment::{PackingSlip, SlipNumber};
use stockroom_inventory::Item;

use super::{ItemStore, SlipStore, StoreError};

/// In-memory record store for tests/dev.
pub struct InMemoryStore<E>
where
    E: Entity,
{
    inner: RwLock<HashMap<E::Id, E>>,
}

impl<E> InMemoryStore<E>
where
    E: Entity + Clone,
{
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<E::Id, E>>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<E::Id, E>>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    fn get_record(&self, id: &E::Id) -> Result<Option<E>, StoreError> {
        Ok(self.read()?.get(id).cloned())
    }

    fn delete_record(&self, id: &E::Id) -> Result<bool, StoreError> {
        Ok(self.write()?.remove(id).is_some())
    }

    fn list_records(&self) -> Result<Vec<E>, StoreError> {
        Ok(self.read()?.values().cloned().collect())
    }
}

impl<E> Default for InMemoryStore<E>
where
    E: Entity + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl ItemStore for InMemoryStore<Item> {
    fn get(&self, id: &ItemId) -> Result<Option<Item>, StoreError> {
        self.get_record(id)
    }

    fn save(&self, item: Item) -> Result<(), StoreError> {
        self.write()?.insert(item.id_typed(), item);
        Ok(())
    }

    fn delete(&self, id: &ItemId) -> Result<bool, StoreError> {
        self.delete_record(id)
    }

    fn list(&self) -> Result<Vec<Item>, StoreError> {
        self.list_records()
    }
}

impl SlipStore for InMemoryStore<PackingSlip> {
    fn get(&self, id: &SlipId) -> Result<Option<PackingSlip>, StoreError> {
        self.get_record(id)
    }

    fn save(&self, slip: PackingSlip) -> Result<(), StoreError> {
        let mut map = self.write()?;
        let taken = map
            .values()
            .any(|s| s.slip_number() == slip.slip_number() && s.id_typed() != slip.id_typed());
        if taken {
            return Err(StoreError::Conflict(format!(
                "slip number {} already exists",
                slip.slip_number()
            )));
        }
        map.insert(slip.id_typed(), slip);
        Ok(())
    }

    fn delete(&self, id: &SlipId) -> Result<bool, StoreError> {
        self.delete_record(id)
    }

    fn list(&self) -> Result<Vec<PackingSlip>, StoreError> {
        self.list_records()
    }

    fn last_number_with_prefix(&self, prefix: &str) -> Result<Option<SlipNumber>, StoreError> {
        Ok(self
            .read()?
            .values()
            .map(|s| s.slip_number())
            .filter(|n| n.as_str().starts_with(prefix))
            .max()
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use stockroom_fulfillment::CustomerInfo;

    fn slip_numbered(number: &str) -> PackingSlip {
        PackingSlip::open(
            SlipId::new(),
            number.parse().unwrap(),
            Utc.with_ymd_and_hms(2026, 10, 17, 9, 0, 0).unwrap(),
            CustomerInfo {
                name: "Bob's Hardware".to_string(),
                ..CustomerInfo::default()
            },
            Vec::new(),
            None,
        )
        .unwrap()
    }

    #[test]
    fn last_number_is_scoped_to_prefix() {
        let store: InMemoryStore<PackingSlip> = InMemoryStore::new();
        store.save(slip_numbered("PS20261016009")).unwrap();
        store.save(slip_numbered("PS20261017002")).unwrap();
        store.save(slip_numbered("PS20261017011")).unwrap();

        let day = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let last = store
            .last_number_with_prefix(&SlipNumber::date_prefix(day))
            .unwrap()
            .unwrap();
        assert_eq!(last.as_str(), "PS20261017011");

        let other = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert!(store
            .last_number_with_prefix(&SlipNumber::date_prefix(other))
            .unwrap()
            .is_none());
    }

    #[test]
    fn duplicate_slip_number_is_rejected() {
        let store: InMemoryStore<PackingSlip> = InMemoryStore::new();
        let first = slip_numbered("PS20261017001");
        store.save(first.clone()).unwrap();
        // re-saving the same record is fine
        store.save(first).unwrap();

        let err = store.save(slip_numbered("PS20261017001")).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn delete_reports_whether_record_existed() {
        let store: InMemoryStore<PackingSlip> = InMemoryStore::new();
        let slip = slip_numbered("PS20261017001");
        let id = slip.id_typed();
        store.save(slip).unwrap();
        assert!(store.delete(&id).unwrap());
        assert!(!store.delete(&id).unwrap());
        assert!(store.get(&id).unwrap().is_none());
    }
}
