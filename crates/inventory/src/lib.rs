//! Inventory domain module.
//!
//! This crate contains business rules for stocked items, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod allocation;
pub mod item;

pub use allocation::Allocation;
pub use item::{Item, ItemEdit, NewItem, PurchaseRecord, ReceiveStock, VendorSnapshot};
