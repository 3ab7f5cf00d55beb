use axum::Router;

pub mod items;
pub mod packing_slips;
pub mod system;

/// Router for all resource endpoints.
pub fn router() -> Router {
    Router::new()
        .merge(items::router())
        .merge(packing_slips::router())
}
