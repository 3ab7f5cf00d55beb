//! Packing-slip fulfillment: allocation against stock, slip numbering, and the
//! create/update/complete/cancel lifecycle.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use stockroom_core::{ItemId, SlipId};
use stockroom_fulfillment::{LineRequest, PackingSlip, SlipDraft, SlipFilter};
use stockroom_inventory::Allocation;

use crate::error::{ServiceError, ServiceResult};
use crate::journal::StockJournal;
use crate::locks::KeyedLocks;
use crate::sequence::DailySequence;
use crate::store::{ItemStore, SlipStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    /// Reject updates to slips that were already completed.
    pub lock_completed_slips: bool,
}

#[derive(Debug, Clone)]
pub struct CreateSlip {
    pub draft: SlipDraft,
    pub occurred_at: DateTime<Utc>,
}

/// Full replace of a slip's customer, lines and notes.
#[derive(Debug, Clone)]
pub struct UpdateSlip {
    pub slip_id: SlipId,
    pub draft: SlipDraft,
    /// `Some(true)` also completes the slip. A slip is never reopened.
    pub is_completed: Option<bool>,
    pub occurred_at: DateTime<Utc>,
}

/// What allocating a line would do right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationPreview {
    pub item_id: ItemId,
    pub name: String,
    pub available: u64,
    pub requested: u64,
    pub allocated: u64,
    pub backorder: u64,
    pub fully_allocated: bool,
}

/// Orchestrates slip operations against the item and slip stores.
///
/// Item quantity read-modify-writes happen under per-item locks shared with
/// the item catalog; operations on an existing slip also hold that slip's lock
/// (always taken before any item lock).
pub struct FulfillmentEngine<I, S>
where
    I: ItemStore,
    S: SlipStore,
{
    items: I,
    slips: S,
    item_locks: Arc<KeyedLocks<ItemId>>,
    slip_locks: KeyedLocks<SlipId>,
    sequence: DailySequence,
    options: EngineOptions,
}

impl<I, S> FulfillmentEngine<I, S>
where
    I: ItemStore,
    S: SlipStore,
{
    pub fn new(items: I, slips: S) -> Self {
        Self::with_options(items, slips, EngineOptions::default())
    }

    pub fn with_options(items: I, slips: S, options: EngineOptions) -> Self {
        Self {
            items,
            slips,
            item_locks: Arc::new(KeyedLocks::new()),
            slip_locks: KeyedLocks::new(),
            sequence: DailySequence::new(),
            options,
        }
    }

    /// Item locks, to be shared with any other writer of item quantity.
    pub fn item_locks(&self) -> Arc<KeyedLocks<ItemId>> {
        Arc::clone(&self.item_locks)
    }

    pub async fn create_slip(&self, cmd: CreateSlip) -> ServiceResult<PackingSlip> {
        let draft = cmd.draft.validated()?;
        let _item_guards = self.item_locks.acquire_many(draft.item_ids()).await;

        let mut journal = StockJournal::new(&self.items);
        let mut lines = Vec::with_capacity(draft.lines.len());
        for request in &draft.lines {
            lines.push(journal.allocate(request)?);
        }

        let number = self
            .sequence
            .next(cmd.occurred_at.date_naive(), &self.slips)?;
        let slip = PackingSlip::open(
            SlipId::new(),
            number,
            cmd.occurred_at,
            draft.customer,
            lines,
            draft.notes,
        )?;

        journal.commit()?;
        if let Err(err) = self.slips.save(slip.clone()) {
            warn!(slip_number = %slip.slip_number(), error = %err, "slip save failed; reverting stock");
            journal.revert();
            return Err(err.into());
        }

        info!(
            slip_id = %slip.id_typed(),
            slip_number = %slip.slip_number(),
            lines = slip.lines().len(),
            total_amount = slip.total_amount(),
            "packing slip created"
        );
        Ok(slip)
    }

    pub async fn update_slip(&self, cmd: UpdateSlip) -> ServiceResult<PackingSlip> {
        let draft = cmd.draft.validated()?;
        let _slip_guard = self.slip_locks.acquire(cmd.slip_id).await;

        let mut slip = self
            .slips
            .get(&cmd.slip_id)?
            .ok_or(ServiceError::SlipNotFound(cmd.slip_id))?;
        if self.options.lock_completed_slips && slip.is_completed() {
            return Err(ServiceError::InvariantViolation(format!(
                "packing slip {} is completed and cannot be edited",
                slip.slip_number()
            )));
        }

        let touched: Vec<ItemId> = slip
            .lines()
            .iter()
            .map(|line| line.item_id)
            .chain(draft.item_ids())
            .collect();
        let _item_guards = self.item_locks.acquire_many(touched).await;

        let mut journal = StockJournal::new(&self.items);
        for line in slip.lines() {
            if !journal.restore(line)? {
                return Err(ServiceError::ItemNotFound(line.item_id));
            }
        }
        let mut lines = Vec::with_capacity(draft.lines.len());
        for request in &draft.lines {
            lines.push(journal.allocate(request)?);
        }

        slip.replace_lines(draft.customer, lines, draft.notes, cmd.occurred_at)?;
        if cmd.is_completed == Some(true) {
            slip.complete(cmd.occurred_at);
        }

        journal.commit()?;
        if let Err(err) = self.slips.save(slip.clone()) {
            warn!(slip_number = %slip.slip_number(), error = %err, "slip save failed; reverting stock");
            journal.revert();
            return Err(err.into());
        }

        info!(
            slip_id = %slip.id_typed(),
            slip_number = %slip.slip_number(),
            total_amount = slip.total_amount(),
            completed = slip.is_completed(),
            "packing slip updated"
        );
        Ok(slip)
    }

    /// Mark a slip completed. Completing an already completed slip is a no-op.
    pub async fn complete_slip(
        &self,
        slip_id: SlipId,
        occurred_at: DateTime<Utc>,
    ) -> ServiceResult<PackingSlip> {
        let _slip_guard = self.slip_locks.acquire(slip_id).await;

        let mut slip = self
            .slips
            .get(&slip_id)?
            .ok_or(ServiceError::SlipNotFound(slip_id))?;
        if !slip.complete(occurred_at) {
            debug!(slip_id = %slip_id, "packing slip already completed");
            return Ok(slip);
        }
        self.slips.save(slip.clone())?;

        info!(slip_id = %slip_id, slip_number = %slip.slip_number(), "packing slip completed");
        Ok(slip)
    }

    /// Return allocated stock and delete the slip.
    pub async fn cancel_slip(&self, slip_id: SlipId) -> ServiceResult<()> {
        let _slip_guard = self.slip_locks.acquire(slip_id).await;

        let slip = self
            .slips
            .get(&slip_id)?
            .ok_or(ServiceError::SlipNotFound(slip_id))?;
        let _item_guards = self
            .item_locks
            .acquire_many(slip.lines().iter().map(|line| line.item_id))
            .await;

        let mut journal = StockJournal::new(&self.items);
        for line in slip.lines() {
            if !journal.restore(line)? {
                warn!(
                    slip_number = %slip.slip_number(),
                    item_id = %line.item_id,
                    quantity = line.quantity,
                    "item no longer exists; skipping stock restore"
                );
            }
        }

        journal.commit()?;
        match self.slips.delete(&slip_id) {
            Ok(true) => {}
            Ok(false) => {
                journal.revert();
                return Err(ServiceError::SlipNotFound(slip_id));
            }
            Err(err) => {
                warn!(slip_number = %slip.slip_number(), error = %err, "slip delete failed; reverting stock");
                journal.revert();
                return Err(err.into());
            }
        }

        info!(slip_id = %slip_id, slip_number = %slip.slip_number(), "packing slip cancelled");
        Ok(())
    }

    pub fn get_slip(&self, slip_id: SlipId) -> ServiceResult<PackingSlip> {
        self.slips
            .get(&slip_id)?
            .ok_or(ServiceError::SlipNotFound(slip_id))
    }

    /// Newest first.
    pub fn list_slips(&self, filter: SlipFilter) -> ServiceResult<Vec<PackingSlip>> {
        let mut slips: Vec<PackingSlip> = self
            .slips
            .list()?
            .into_iter()
            .filter(|slip| filter.matches(slip))
            .collect();
        slips.sort_by(|a, b| {
            b.date()
                .cmp(&a.date())
                .then_with(|| b.slip_number().cmp(a.slip_number()))
        });
        Ok(slips)
    }

    /// Allocation outcome for `lines` against current stock, without mutating
    /// anything. Repeated items see the stock left by earlier lines.
    pub fn preview(&self, lines: &[LineRequest]) -> ServiceResult<Vec<AllocationPreview>> {
        let mut remaining: HashMap<ItemId, u64> = HashMap::new();
        let mut out = Vec::with_capacity(lines.len());

        for request in lines {
            let item = self
                .items
                .get(&request.item_id)?
                .ok_or(ServiceError::ItemNotFound(request.item_id))?;
            let available = *remaining
                .entry(request.item_id)
                .or_insert_with(|| item.quantity());
            let allocation = Allocation::compute(request.quantity, available);
            remaining.insert(request.item_id, available - allocation.allocated);

            out.push(AllocationPreview {
                item_id: request.item_id,
                name: item.name().to_string(),
                available,
                requested: allocation.requested,
                allocated: allocation.allocated,
                backorder: allocation.backorder,
                fully_allocated: allocation.is_fully_allocated(),
            });
        }
        Ok(out)
    }
}
