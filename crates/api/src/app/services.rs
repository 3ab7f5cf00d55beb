use std::sync::Arc;

use stockroom_fulfillment::PackingSlip;
use stockroom_infra::{EngineOptions, FulfillmentEngine, InMemoryStore, ItemCatalog};
use stockroom_inventory::Item;

use crate::config::AppConfig;

pub type ItemStoreHandle = Arc<InMemoryStore<Item>>;
pub type SlipStoreHandle = Arc<InMemoryStore<PackingSlip>>;

/// Shared services behind every handler.
pub struct AppServices {
    pub engine: FulfillmentEngine<ItemStoreHandle, SlipStoreHandle>,
    pub catalog: ItemCatalog<ItemStoreHandle>,
}

/// In-memory wiring: one item store shared by the engine and the catalog,
/// which also share the engine's per-item locks.
pub fn build_services(config: &AppConfig) -> AppServices {
    let items: ItemStoreHandle = Arc::new(InMemoryStore::new());
    let slips: SlipStoreHandle = Arc::new(InMemoryStore::new());

    let engine = FulfillmentEngine::with_options(
        items.clone(),
        slips,
        EngineOptions {
            lock_completed_slips: config.lock_completed_slips,
        },
    );
    let catalog = ItemCatalog::new(items, engine.item_locks());

    AppServices { engine, catalog }
}
