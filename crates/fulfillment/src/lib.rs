//! Packing-slip domain module.
//!
//! Slip records, slip numbering and request validation, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage). Stock allocation
//! against items is orchestrated by the fulfillment engine in `stockroom-infra`.

pub mod draft;
pub mod number;
pub mod slip;

pub use draft::{CustomerInfo, LineRequest, SlipDraft};
pub use number::{MAX_DAILY_SEQUENCE, SlipNumber};
pub use slip::{PackingSlip, SlipFilter, SlipLine, SlipStatus, total_amount};
