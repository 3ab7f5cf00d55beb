//! Incoming slip requests and their validation.

use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, ItemId};

/// Customer contact details copied onto a slip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
}

/// One requested line: how many of which item, at what unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRequest {
    pub item_id: ItemId,
    pub quantity: u64,
    /// Unit price in smallest currency unit (e.g., cents).
    pub price: u64,
}

/// Customer, requested lines and notes for a create or a full update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlipDraft {
    pub customer: CustomerInfo,
    pub lines: Vec<LineRequest>,
    pub notes: Option<String>,
}

impl SlipDraft {
    /// Validate and normalize.
    ///
    /// Lines referencing the same item are merged into one (quantities summed,
    /// the last price wins), keeping first-seen order.
    pub fn validated(self) -> DomainResult<Self> {
        let customer_name = self.customer.name.trim();
        if customer_name.is_empty() {
            return Err(DomainError::validation("customer name is required"));
        }
        if self.lines.is_empty() {
            return Err(DomainError::validation("at least one line item is required"));
        }

        let mut merged: Vec<LineRequest> = Vec::with_capacity(self.lines.len());
        for line in self.lines {
            if line.quantity == 0 {
                return Err(DomainError::validation(format!(
                    "quantity for item {} must be positive",
                    line.item_id
                )));
            }
            match merged.iter_mut().find(|l| l.item_id == line.item_id) {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .checked_add(line.quantity)
                        .ok_or_else(|| DomainError::validation("requested quantity overflow"))?;
                    existing.price = line.price;
                }
                None => merged.push(line),
            }
        }

        Ok(Self {
            customer: CustomerInfo {
                name: customer_name.to_string(),
                ..self.customer
            },
            lines: merged,
            notes: self.notes,
        })
    }

    /// Item ids referenced by this draft.
    pub fn item_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.lines.iter().map(|l| l.item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(name: &str) -> CustomerInfo {
        CustomerInfo {
            name: name.to_string(),
            ..CustomerInfo::default()
        }
    }

    #[test]
    fn requires_customer_name() {
        let draft = SlipDraft {
            customer: customer("  "),
            lines: vec![LineRequest {
                item_id: ItemId::new(),
                quantity: 1,
                price: 100,
            }],
            notes: None,
        };
        let err = draft.validated().unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("customer name") => {}
            other => panic!("expected customer validation error, got {other:?}"),
        }
    }

    #[test]
    fn requires_at_least_one_line() {
        let draft = SlipDraft {
            customer: customer("Bob's Hardware"),
            lines: vec![],
            notes: None,
        };
        assert!(matches!(draft.validated(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn rejects_zero_quantity() {
        let draft = SlipDraft {
            customer: customer("Bob's Hardware"),
            lines: vec![LineRequest {
                item_id: ItemId::new(),
                quantity: 0,
                price: 100,
            }],
            notes: None,
        };
        assert!(matches!(draft.validated(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn merges_duplicate_items_keeping_order() {
        let a = ItemId::new();
        let b = ItemId::new();
        let draft = SlipDraft {
            customer: customer(" Bob's Hardware "),
            lines: vec![
                LineRequest { item_id: a, quantity: 2, price: 100 },
                LineRequest { item_id: b, quantity: 1, price: 50 },
                LineRequest { item_id: a, quantity: 3, price: 90 },
            ],
            notes: Some("leave at door".to_string()),
        }
        .validated()
        .unwrap();

        assert_eq!(draft.customer.name, "Bob's Hardware");
        assert_eq!(draft.lines.len(), 2);
        assert_eq!(draft.lines[0], LineRequest { item_id: a, quantity: 5, price: 90 });
        assert_eq!(draft.lines[1].item_id, b);
        assert_eq!(draft.item_ids().collect::<Vec<_>>(), vec![a, b]);
    }
}
