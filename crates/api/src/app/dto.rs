use chrono::{DateTime, Utc};
use serde::Deserialize;

use stockroom_core::ItemId;
use stockroom_fulfillment::{CustomerInfo, LineRequest, PackingSlip, SlipDraft, SlipFilter};
use stockroom_inventory::{Item, ItemEdit, NewItem, PurchaseRecord, ReceiveStock, VendorSnapshot};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct PurchaseRecordRequest {
    pub price: u64,
    pub quantity: u64,
    pub date: Option<DateTime<Utc>>,
    pub vendor_id: Option<String>,
    pub vendor_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    #[serde(default)]
    pub quantity: u64,
    #[serde(default)]
    pub cost_price: u64,
    #[serde(default)]
    pub selling_price: u64,
    /// Defaults to `cost_price`.
    pub latest_price: Option<u64>,
    #[serde(default)]
    pub reorder_level: u64,
    #[serde(default)]
    pub purchase_history: Vec<PurchaseRecordRequest>,
    pub vendor: Option<VendorSnapshot>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub name: String,
    #[serde(default)]
    pub cost_price: u64,
    #[serde(default)]
    pub selling_price: u64,
    pub latest_price: Option<u64>,
    #[serde(default)]
    pub reorder_level: u64,
    pub purchase_history: Option<Vec<PurchaseRecordRequest>>,
    pub vendor: Option<VendorSnapshot>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddStockRequest {
    pub quantity: u64,
    pub price: u64,
    pub vendor_id: Option<String>,
    pub vendor_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerRequest {
    #[serde(default)]
    pub name: String,
    pub contact: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SlipLineRequest {
    pub item_id: String,
    pub quantity: u64,
    #[serde(default)]
    pub price: u64,
}

#[derive(Debug, Deserialize)]
pub struct CreateSlipRequest {
    #[serde(default)]
    pub customer: CustomerRequest,
    #[serde(default, alias = "items")]
    pub lines: Vec<SlipLineRequest>,
    pub notes: Option<String>,
}

/// Full update; a body carrying only `is_completed: true` just completes the slip.
#[derive(Debug, Deserialize)]
pub struct UpdateSlipRequest {
    pub customer: Option<CustomerRequest>,
    #[serde(alias = "items")]
    pub lines: Option<Vec<SlipLineRequest>>,
    pub notes: Option<String>,
    pub is_completed: Option<bool>,
}

impl UpdateSlipRequest {
    pub fn is_completion_only(&self) -> bool {
        self.customer.is_none() && self.lines.is_none() && self.notes.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    #[serde(default, alias = "items")]
    pub lines: Vec<SlipLineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ListSlipsQuery {
    pub status: Option<String>,
}

// -------------------------
// Request -> domain
// -------------------------

fn purchase_records(records: Vec<PurchaseRecordRequest>, now: DateTime<Utc>) -> Vec<PurchaseRecord> {
    records
        .into_iter()
        .map(|r| PurchaseRecord {
            price: r.price,
            quantity: r.quantity,
            date: r.date.unwrap_or(now),
            vendor_id: r.vendor_id,
            vendor_name: r.vendor_name,
        })
        .collect()
}

pub fn to_new_item(body: CreateItemRequest, now: DateTime<Utc>) -> NewItem {
    NewItem {
        name: body.name,
        quantity: body.quantity,
        cost_price: body.cost_price,
        selling_price: body.selling_price,
        latest_price: body.latest_price.unwrap_or(body.cost_price),
        reorder_level: body.reorder_level,
        purchase_history: purchase_records(body.purchase_history, now),
        vendor: body.vendor,
        image_url: body.image_url,
    }
}

pub fn to_item_edit(body: UpdateItemRequest, now: DateTime<Utc>) -> ItemEdit {
    ItemEdit {
        name: body.name,
        cost_price: body.cost_price,
        selling_price: body.selling_price,
        latest_price: body.latest_price.unwrap_or(body.cost_price),
        reorder_level: body.reorder_level,
        purchase_history: body.purchase_history.map(|h| purchase_records(h, now)),
        vendor: body.vendor,
        image_url: body.image_url,
    }
}

pub fn to_receive_stock(body: AddStockRequest) -> ReceiveStock {
    ReceiveStock {
        quantity: body.quantity,
        price: body.price,
        vendor_id: body.vendor_id,
        vendor_name: body.vendor_name,
    }
}

fn to_customer(c: CustomerRequest) -> CustomerInfo {
    CustomerInfo {
        name: c.name,
        contact: c.contact,
        phone: c.phone,
        email: c.email,
        address: c.address,
        company: c.company,
    }
}

pub fn to_line_requests(
    lines: Vec<SlipLineRequest>,
) -> Result<Vec<LineRequest>, axum::response::Response> {
    lines
        .into_iter()
        .map(|l| -> Result<LineRequest, axum::response::Response> {
            let item_id: ItemId = errors::parse_id(&l.item_id, "item")?;
            Ok(LineRequest {
                item_id,
                quantity: l.quantity,
                price: l.price,
            })
        })
        .collect()
}

pub fn to_draft(
    customer: CustomerRequest,
    lines: Vec<SlipLineRequest>,
    notes: Option<String>,
) -> Result<SlipDraft, axum::response::Response> {
    Ok(SlipDraft {
        customer: to_customer(customer),
        lines: to_line_requests(lines)?,
        notes,
    })
}

pub fn parse_slip_filter(status: Option<&str>) -> Result<SlipFilter, axum::response::Response> {
    match status.map(|s| s.trim().to_lowercase()).as_deref() {
        None | Some("") | Some("all") => Ok(SlipFilter::All),
        Some("open") => Ok(SlipFilter::Open),
        Some("completed") => Ok(SlipFilter::Completed),
        Some(_) => Err(errors::json_error(
            axum::http::StatusCode::BAD_REQUEST,
            "validation_error",
            "status must be one of: all, open, completed",
        )),
    }
}

// -------------------------
// Domain -> JSON
// -------------------------

pub fn item_to_json(item: &Item) -> serde_json::Value {
    serde_json::json!({
        "id": item.id_typed().to_string(),
        "name": item.name(),
        "quantity": item.quantity(),
        "cost_price": item.cost_price(),
        "selling_price": item.selling_price(),
        "latest_price": item.latest_price(),
        "reorder_level": item.reorder_level(),
        "low_stock": item.is_low_stock(),
        "average_cost": item.average_cost(),
        "purchase_history": item.purchase_history(),
        "vendor": item.vendor(),
        "image_url": item.image_url(),
        "created_at": item.created_at().to_rfc3339(),
        "updated_at": item.updated_at().to_rfc3339(),
    })
}

pub fn slip_to_json(slip: &PackingSlip) -> serde_json::Value {
    serde_json::json!({
        "id": slip.id_typed().to_string(),
        "slip_number": slip.slip_number().as_str(),
        "date": slip.date().to_rfc3339(),
        "customer": slip.customer(),
        "lines": slip.lines().iter().map(|l| serde_json::json!({
            "item_id": l.item_id.to_string(),
            "name": l.name,
            "quantity": l.quantity,
            "backorder_quantity": l.backorder_quantity,
            "price": l.price,
            "amount": l.amount().ok(),
        })).collect::<Vec<_>>(),
        "total_amount": slip.total_amount(),
        "notes": slip.notes(),
        "is_completed": slip.is_completed(),
        "status": slip.status(),
        "updated_at": slip.updated_at().to_rfc3339(),
    })
}
