use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;

use stockroom_core::ItemId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/low-stock", get(low_stock))
        .route("/items/:id", get(get_item).put(update_item).delete(delete_item))
        .route("/items/:id/add-stock", put(add_stock))
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListItemsQuery>,
) -> axum::response::Response {
    match services.catalog.list(query.search.as_deref()) {
        Ok(items) => Json(items.iter().map(dto::item_to_json).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn low_stock(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.catalog.low_stock() {
        Ok(items) => Json(items.iter().map(dto::item_to_json).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Create a new item, or restock the existing item with the same name.
pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateItemRequest>,
) -> axum::response::Response {
    let now = Utc::now();
    match services
        .catalog
        .create_or_restock(dto::to_new_item(body, now), now)
        .await
    {
        Ok((item, true)) => (StatusCode::CREATED, Json(dto::item_to_json(&item))).into_response(),
        Ok((item, false)) => (StatusCode::OK, Json(dto::item_to_json(&item))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ItemId = match errors::parse_id(&id, "item") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.get(id) {
        Ok(item) => Json(dto::item_to_json(&item)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateItemRequest>,
) -> axum::response::Response {
    let id: ItemId = match errors::parse_id(&id, "item") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let now = Utc::now();
    match services
        .catalog
        .update(id, dto::to_item_edit(body, now), now)
        .await
    {
        Ok(item) => Json(dto::item_to_json(&item)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ItemId = match errors::parse_id(&id, "item") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn add_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::AddStockRequest>,
) -> axum::response::Response {
    let id: ItemId = match errors::parse_id(&id, "item") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services
        .catalog
        .add_stock(id, dto::to_receive_stock(body), Utc::now())
        .await
    {
        Ok(item) => Json(dto::item_to_json(&item)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
