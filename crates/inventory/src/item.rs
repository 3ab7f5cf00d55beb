use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, ItemId};

/// Vendor details copied onto an item at intake time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorSnapshot {
    pub name: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// One stock intake: what was bought, for how much, from whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    /// Unit price in smallest currency unit (e.g., cents).
    pub price: u64,
    pub quantity: u64,
    pub date: DateTime<Utc>,
    pub vendor_id: Option<String>,
    pub vendor_name: Option<String>,
}

/// Input: register a new item, or restock an existing item with the same name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub quantity: u64,
    pub cost_price: u64,
    pub selling_price: u64,
    pub latest_price: u64,
    pub reorder_level: u64,
    /// Intake records to append. When empty, one record is synthesized from
    /// `cost_price`/`quantity` and the vendor snapshot.
    pub purchase_history: Vec<PurchaseRecord>,
    pub vendor: Option<VendorSnapshot>,
    pub image_url: Option<String>,
}

/// Input: edit descriptive fields and prices. Stock quantity is not editable here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEdit {
    pub name: String,
    pub cost_price: u64,
    pub selling_price: u64,
    pub latest_price: u64,
    pub reorder_level: u64,
    /// Replaces the whole history when present.
    pub purchase_history: Option<Vec<PurchaseRecord>>,
    pub vendor: Option<VendorSnapshot>,
    pub image_url: Option<String>,
}

/// Input: receive stock from a vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveStock {
    pub quantity: u64,
    pub price: u64,
    pub vendor_id: Option<String>,
    pub vendor_name: Option<String>,
}

/// A stocked item.
///
/// `quantity` is the authoritative stock level. It only moves through
/// [`Item::withdraw`] / [`Item::restore`] (packing-slip fulfillment) and the
/// explicit intake operations ([`Item::restock`], [`Item::receive`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    name: String,
    quantity: u64,
    cost_price: u64,
    selling_price: u64,
    latest_price: u64,
    reorder_level: u64,
    purchase_history: Vec<PurchaseRecord>,
    vendor: Option<VendorSnapshot>,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Item {
    pub fn create(id: ItemId, new: NewItem, now: DateTime<Utc>) -> DomainResult<Self> {
        let name = validate_name(&new.name)?;
        let purchase_history = intake_records(&new, now);

        Ok(Self {
            id,
            name,
            quantity: new.quantity,
            cost_price: new.cost_price,
            selling_price: new.selling_price,
            latest_price: new.latest_price,
            reorder_level: new.reorder_level,
            purchase_history,
            vendor: new.vendor,
            image_url: new.image_url,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id_typed(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn cost_price(&self) -> u64 {
        self.cost_price
    }

    pub fn selling_price(&self) -> u64 {
        self.selling_price
    }

    pub fn latest_price(&self) -> u64 {
        self.latest_price
    }

    pub fn reorder_level(&self) -> u64 {
        self.reorder_level
    }

    pub fn purchase_history(&self) -> &[PurchaseRecord] {
        &self.purchase_history
    }

    pub fn vendor(&self) -> Option<&VendorSnapshot> {
        self.vendor.as_ref()
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Low-stock signal: stock at or below the reorder level.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.reorder_level
    }

    /// Quantity-weighted mean purchase price, rounded down.
    pub fn average_cost(&self) -> Option<u64> {
        let (cost, qty) = self
            .purchase_history
            .iter()
            .fold((0u128, 0u128), |(cost, qty), p| {
                (
                    cost + u128::from(p.price) * u128::from(p.quantity),
                    qty + u128::from(p.quantity),
                )
            });
        if qty == 0 {
            return None;
        }
        u64::try_from(cost / qty).ok()
    }

    /// Merge another intake of the same item into this one.
    pub fn restock(&mut self, new: NewItem, now: DateTime<Utc>) -> DomainResult<()> {
        if new.name.trim() != self.name {
            return Err(DomainError::invariant("restock name does not match item"));
        }
        let quantity = self
            .quantity
            .checked_add(new.quantity)
            .ok_or_else(|| DomainError::invariant("stock quantity overflow"))?;

        let records = intake_records(&new, now);

        self.quantity = quantity;
        self.cost_price = new.cost_price;
        self.selling_price = new.selling_price;
        self.latest_price = new.latest_price;
        if new.reorder_level > 0 {
            self.reorder_level = new.reorder_level;
        }
        self.purchase_history.extend(records);
        if new.vendor.is_some() {
            self.vendor = new.vendor;
        }
        if new.image_url.is_some() {
            self.image_url = new.image_url;
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn apply_edit(&mut self, edit: ItemEdit, now: DateTime<Utc>) -> DomainResult<()> {
        self.name = validate_name(&edit.name)?;
        self.cost_price = edit.cost_price;
        self.selling_price = edit.selling_price;
        self.latest_price = edit.latest_price;
        self.reorder_level = edit.reorder_level;
        if let Some(history) = edit.purchase_history {
            self.purchase_history = history;
        }
        self.vendor = edit.vendor;
        self.image_url = edit.image_url;
        self.updated_at = now;
        Ok(())
    }

    /// Receive stock from a vendor: adds quantity, records the purchase price.
    pub fn receive(&mut self, intake: ReceiveStock, now: DateTime<Utc>) -> DomainResult<()> {
        if intake.quantity == 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        self.quantity = self
            .quantity
            .checked_add(intake.quantity)
            .ok_or_else(|| DomainError::invariant("stock quantity overflow"))?;
        self.latest_price = intake.price;
        self.purchase_history.push(PurchaseRecord {
            price: intake.price,
            quantity: intake.quantity,
            date: now,
            vendor_id: intake.vendor_id,
            vendor_name: intake.vendor_name,
        });
        self.updated_at = now;
        Ok(())
    }

    /// Deduct allocated stock. Stock movements do not touch `updated_at`.
    pub fn withdraw(&mut self, quantity: u64) -> DomainResult<()> {
        self.quantity = self.quantity.checked_sub(quantity).ok_or_else(|| {
            DomainError::invariant(format!(
                "cannot withdraw {quantity} from item {} with stock {}",
                self.id, self.quantity
            ))
        })?;
        Ok(())
    }

    /// Return previously allocated stock.
    pub fn restore(&mut self, quantity: u64) -> DomainResult<()> {
        self.quantity = self
            .quantity
            .checked_add(quantity)
            .ok_or_else(|| DomainError::invariant("stock quantity overflow"))?;
        Ok(())
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn validate_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    Ok(name.to_string())
}

fn intake_records(new: &NewItem, now: DateTime<Utc>) -> Vec<PurchaseRecord> {
    if !new.purchase_history.is_empty() {
        return new.purchase_history.clone();
    }
    if new.quantity == 0 {
        return Vec::new();
    }
    vec![PurchaseRecord {
        price: new.cost_price,
        quantity: new.quantity,
        date: now,
        vendor_id: None,
        vendor_name: new.vendor.as_ref().map(|v| v.name.clone()),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn widget(quantity: u64) -> NewItem {
        NewItem {
            name: "Widget".to_string(),
            quantity,
            cost_price: 120,
            selling_price: 200,
            latest_price: 120,
            reorder_level: 3,
            purchase_history: Vec::new(),
            vendor: Some(VendorSnapshot {
                name: "Acme".to_string(),
                ..VendorSnapshot::default()
            }),
            image_url: None,
        }
    }

    #[test]
    fn create_synthesizes_intake_record() {
        let item = Item::create(ItemId::new(), widget(10), test_time()).unwrap();
        assert_eq!(item.quantity(), 10);
        assert_eq!(item.purchase_history().len(), 1);
        let record = &item.purchase_history()[0];
        assert_eq!(record.price, 120);
        assert_eq!(record.quantity, 10);
        assert_eq!(record.vendor_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn create_rejects_blank_name() {
        let mut new = widget(1);
        new.name = "   ".to_string();
        let err = Item::create(ItemId::new(), new, test_time()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn withdraw_cannot_go_negative() {
        let mut item = Item::create(ItemId::new(), widget(2), test_time()).unwrap();
        let err = item.withdraw(3).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(item.quantity(), 2);

        item.withdraw(2).unwrap();
        assert_eq!(item.quantity(), 0);
        item.restore(2).unwrap();
        assert_eq!(item.quantity(), 2);
    }

    #[test]
    fn restock_merges_quantity_prices_and_history() {
        let mut item = Item::create(ItemId::new(), widget(10), test_time()).unwrap();
        let mut again = widget(5);
        again.cost_price = 150;
        again.reorder_level = 0;
        item.restock(again, test_time()).unwrap();

        assert_eq!(item.quantity(), 15);
        assert_eq!(item.cost_price(), 150);
        // zero reorder level keeps the existing one
        assert_eq!(item.reorder_level(), 3);
        assert_eq!(item.purchase_history().len(), 2);
    }

    #[test]
    fn receive_updates_latest_price_and_history() {
        let mut item = Item::create(ItemId::new(), widget(0), test_time()).unwrap();
        assert!(item.purchase_history().is_empty());

        item.receive(
            ReceiveStock {
                quantity: 4,
                price: 99,
                vendor_id: Some("v-1".to_string()),
                vendor_name: Some("Acme".to_string()),
            },
            test_time(),
        )
        .unwrap();

        assert_eq!(item.quantity(), 4);
        assert_eq!(item.latest_price(), 99);
        assert_eq!(item.purchase_history()[0].vendor_id.as_deref(), Some("v-1"));
    }

    #[test]
    fn receive_rejects_zero_quantity() {
        let mut item = Item::create(ItemId::new(), widget(1), test_time()).unwrap();
        let err = item
            .receive(
                ReceiveStock {
                    quantity: 0,
                    price: 1,
                    vendor_id: None,
                    vendor_name: None,
                },
                test_time(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn edit_never_touches_quantity() {
        let mut item = Item::create(ItemId::new(), widget(7), test_time()).unwrap();
        item.apply_edit(
            ItemEdit {
                name: "Widget XL".to_string(),
                cost_price: 1,
                selling_price: 2,
                latest_price: 3,
                reorder_level: 10,
                purchase_history: None,
                vendor: None,
                image_url: Some("/uploads/items/1.png".to_string()),
            },
            test_time(),
        )
        .unwrap();

        assert_eq!(item.quantity(), 7);
        assert_eq!(item.name(), "Widget XL");
        assert_eq!(item.purchase_history().len(), 1);
        assert!(item.is_low_stock());
    }

    #[test]
    fn low_stock_is_inclusive_of_reorder_level() {
        let item = Item::create(ItemId::new(), widget(3), test_time()).unwrap();
        assert!(item.is_low_stock());
        let item = Item::create(ItemId::new(), widget(4), test_time()).unwrap();
        assert!(!item.is_low_stock());
    }

    #[test]
    fn average_cost_is_quantity_weighted() {
        let now = test_time();
        let mut new = widget(0);
        new.purchase_history = vec![
            PurchaseRecord {
                price: 100,
                quantity: 1,
                date: now,
                vendor_id: None,
                vendor_name: None,
            },
            PurchaseRecord {
                price: 200,
                quantity: 3,
                date: now,
                vendor_id: None,
                vendor_name: None,
            },
        ];
        let item = Item::create(ItemId::new(), new, now).unwrap();
        assert_eq!(item.average_cost(), Some(175));

        let empty = Item::create(ItemId::new(), widget(0), now).unwrap();
        assert_eq!(empty.average_cost(), None);
    }
}
