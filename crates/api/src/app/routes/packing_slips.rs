use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use stockroom_core::SlipId;
use stockroom_infra::{CreateSlip, UpdateSlip};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/packing-slips", get(list_slips).post(create_slip))
        .route("/packing-slips/preview", post(preview))
        .route(
            "/packing-slips/:id",
            get(get_slip).put(update_slip).delete(cancel_slip),
        )
        .route("/packing-slips/:id/complete", post(complete_slip))
}

pub async fn list_slips(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListSlipsQuery>,
) -> axum::response::Response {
    let filter = match dto::parse_slip_filter(query.status.as_deref()) {
        Ok(f) => f,
        Err(resp) => return resp,
    };

    match services.engine.list_slips(filter) {
        Ok(slips) => Json(slips.iter().map(dto::slip_to_json).collect::<Vec<_>>()).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_slip(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateSlipRequest>,
) -> axum::response::Response {
    let draft = match dto::to_draft(body.customer, body.lines, body.notes) {
        Ok(d) => d,
        Err(resp) => return resp,
    };

    let cmd = CreateSlip {
        draft,
        occurred_at: Utc::now(),
    };
    match services.engine.create_slip(cmd).await {
        Ok(slip) => (StatusCode::CREATED, Json(dto::slip_to_json(&slip))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn preview(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::PreviewRequest>,
) -> axum::response::Response {
    let lines = match dto::to_line_requests(body.lines) {
        Ok(l) => l,
        Err(resp) => return resp,
    };

    match services.engine.preview(&lines) {
        Ok(preview) => Json(preview).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_slip(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SlipId = match errors::parse_id(&id, "packing slip") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.engine.get_slip(id) {
        Ok(slip) => Json(dto::slip_to_json(&slip)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_slip(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateSlipRequest>,
) -> axum::response::Response {
    let id: SlipId = match errors::parse_id(&id, "packing slip") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    if body.is_completion_only() {
        return match body.is_completed {
            Some(true) => match services.engine.complete_slip(id, Utc::now()).await {
                Ok(slip) => Json(dto::slip_to_json(&slip)).into_response(),
                Err(e) => errors::service_error_to_response(e),
            },
            _ => errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "customer and lines are required",
            ),
        };
    }

    let draft = match dto::to_draft(
        body.customer.unwrap_or_default(),
        body.lines.unwrap_or_default(),
        body.notes,
    ) {
        Ok(d) => d,
        Err(resp) => return resp,
    };

    let cmd = UpdateSlip {
        slip_id: id,
        draft,
        is_completed: body.is_completed,
        occurred_at: Utc::now(),
    };
    match services.engine.update_slip(cmd).await {
        Ok(slip) => Json(dto::slip_to_json(&slip)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn complete_slip(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SlipId = match errors::parse_id(&id, "packing slip") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.engine.complete_slip(id, Utc::now()).await {
        Ok(slip) => Json(dto::slip_to_json(&slip)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Cancel: return allocated stock and delete the slip.
pub async fn cancel_slip(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SlipId = match errors::parse_id(&id, "packing slip") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.engine.cancel_slip(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
