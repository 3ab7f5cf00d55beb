use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, ItemId, SlipId};

use crate::draft::CustomerInfo;
use crate::number::SlipNumber;

/// Packing slip status lifecycle (deletion removes the record entirely).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlipStatus {
    Open,
    Completed,
}

/// Which slips a listing should return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlipFilter {
    #[default]
    All,
    Open,
    Completed,
}

impl SlipFilter {
    pub fn matches(self, slip: &PackingSlip) -> bool {
        match self {
            SlipFilter::All => true,
            SlipFilter::Open => slip.status() == SlipStatus::Open,
            SlipFilter::Completed => slip.status() == SlipStatus::Completed,
        }
    }
}

/// Slip line as allocated: `quantity` was deducted from stock, `backorder_quantity` was not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlipLine {
    pub item_id: ItemId,
    /// Item name at allocation time.
    pub name: String,
    pub quantity: u64,
    /// Unit price in smallest currency unit (e.g., cents).
    pub price: u64,
    pub backorder_quantity: u64,
}

impl SlipLine {
    /// Demand at the time the line was set.
    pub fn requested(&self) -> u64 {
        self.quantity + self.backorder_quantity
    }

    /// Billed amount: shipped quantity only.
    pub fn amount(&self) -> DomainResult<u64> {
        self.price
            .checked_mul(self.quantity)
            .ok_or_else(|| DomainError::validation("line amount overflow"))
    }
}

/// Σ price × allocated quantity.
pub fn total_amount(lines: &[SlipLine]) -> DomainResult<u64> {
    lines.iter().try_fold(0u64, |acc, line| {
        acc.checked_add(line.amount()?)
            .ok_or_else(|| DomainError::validation("slip total overflow"))
    })
}

/// Outbound order record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackingSlip {
    id: SlipId,
    slip_number: SlipNumber,
    date: DateTime<Utc>,
    lines: Vec<SlipLine>,
    total_amount: u64,
    customer: CustomerInfo,
    notes: Option<String>,
    is_completed: bool,
    updated_at: DateTime<Utc>,
}

impl PackingSlip {
    /// A new, open slip over already-allocated lines.
    pub fn open(
        id: SlipId,
        slip_number: SlipNumber,
        date: DateTime<Utc>,
        customer: CustomerInfo,
        lines: Vec<SlipLine>,
        notes: Option<String>,
    ) -> DomainResult<Self> {
        let total_amount = total_amount(&lines)?;
        Ok(Self {
            id,
            slip_number,
            date,
            lines,
            total_amount,
            customer,
            notes,
            is_completed: false,
            updated_at: date,
        })
    }

    pub fn id_typed(&self) -> SlipId {
        self.id
    }

    pub fn slip_number(&self) -> &SlipNumber {
        &self.slip_number
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn lines(&self) -> &[SlipLine] {
        &self.lines
    }

    pub fn total_amount(&self) -> u64 {
        self.total_amount
    }

    pub fn customer(&self) -> &CustomerInfo {
        &self.customer
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn status(&self) -> SlipStatus {
        if self.is_completed {
            SlipStatus::Completed
        } else {
            SlipStatus::Open
        }
    }

    /// Full replace of the line list and header fields; recomputes the total.
    ///
    /// Slip number, creation date and completion flag are preserved.
    pub fn replace_lines(
        &mut self,
        customer: CustomerInfo,
        lines: Vec<SlipLine>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.total_amount = total_amount(&lines)?;
        self.lines = lines;
        self.customer = customer;
        self.notes = notes;
        self.updated_at = now;
        Ok(())
    }

    /// Mark completed. Returns `false` when the slip already was (no-op).
    pub fn complete(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_completed {
            return false;
        }
        self.is_completed = true;
        self.updated_at = now;
        true
    }
}

impl Entity for PackingSlip {
    type Id = SlipId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
