//! Infrastructure layer: stores, locking, and the services that orchestrate
//! domain logic against them (fulfillment engine, item catalog).

pub mod catalog;
pub mod engine;
pub mod error;
pub mod journal;
pub mod locks;
pub mod sequence;
pub mod store;


pub use catalog::ItemCatalog;
pub use engine::{AllocationPreview, CreateSlip, EngineOptions, FulfillmentEngine, UpdateSlip};
pub use error::{ServiceError, ServiceResult};
pub use store::{InMemoryStore, ItemStore, SlipStore, StoreError};
