//! Status, invoicing and point-of-sale handlers.
//!
//! ```text
//! PATCH /api/bookings/{id}/status {"status":"ready"}            (admin)
//! POST /api/bookings/{id}/invoice {"items":[{"name":"Shirt","qty":3,"price":500}]}
//! GET /api/bookings/{id}/invoices                              (admin)
//! POST /api/pos/walk-in                                        (admin)
//! ```
//!
//! The invoice route does not check a bearer token.

use actix_web::{HttpResponse, get, patch, post, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    BookingStatus, BookingValidationError, Error, InvoiceLine, InvoicedBooking, Role, WalkInOrder, require_lines,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedAccount;
use crate::inbound::http::booking_dto::{BookingDto, InvoiceDto};
use crate::inbound::http::bookings::BookingItemRequest;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, parse_booking_id};

/// Status transition body.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusRequest {
    #[schema(example = "ready")]
    pub status: Option<String>,
}

/// Result of a status transition.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeResponse {
    pub booking: BookingDto,
    /// Status before the transition.
    pub previous_status: BookingStatus,
}

/// Invoice line as entered by staff.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct InvoiceItemRequest {
    #[schema(example = "Shirt")]
    pub name: String,
    #[schema(example = 3)]
    pub qty: i64,
    #[schema(value_type = f64, example = 500)]
    pub price: Decimal,
}

/// Invoice generation body.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct InvoiceRequest {
    pub items: Vec<InvoiceItemRequest>,
    pub notes: Option<String>,
}

/// Counter sale body.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct WalkInRequest {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub items: Vec<BookingItemRequest>,
    pub notes: Option<String>,
}

/// Invoice together with the booking it priced.
#[derive(Debug, Serialize, ToSchema)]
pub struct InvoicedBookingResponse {
    pub invoice: InvoiceDto,
    pub booking: BookingDto,
}

impl From<InvoicedBooking> for InvoicedBookingResponse {
    fn from(value: InvoicedBooking) -> Self {
        Self {
            invoice: InvoiceDto::from(&value.invoice),
            booking: BookingDto::from(value.booking),
        }
    }
}

fn invoice_lines(items: &[InvoiceItemRequest]) -> Result<Vec<InvoiceLine>, Error> {
    let lines = items
        .iter()
        .enumerate()
        .map(|(index, item)| InvoiceLine::try_new(index, &item.name, item.qty, item.price))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(require_lines(lines)?)
}

/// Walk-in lines arrive in booking-item shape; errors name those fields.
fn walk_in_lines(items: &[BookingItemRequest]) -> Result<Vec<InvoiceLine>, Error> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            InvoiceLine::try_new(index, &item.garment_type, item.quantity, item.price_per_item)
                .map_err(|err| match err {
                    BookingValidationError::InvalidItem { index, field } => {
                        BookingValidationError::InvalidItem {
                            index,
                            field: booking_item_field(field),
                        }
                    }
                    other => other,
                })
                .map_err(Error::from)
        })
        .collect()
}

fn booking_item_field(invoice_field: &'static str) -> &'static str {
    match invoice_field {
        "name" => "garmentType",
        "qty" => "quantity",
        "price" => "pricePerItem",
        other => other,
    }
}

impl TryFrom<&WalkInRequest> for WalkInOrder {
    type Error = Error;

    fn try_from(value: &WalkInRequest) -> Result<Self, Self::Error> {
        let lines = walk_in_lines(&value.items)?;
        Ok(Self::try_new(
            value.customer_name.as_deref(),
            value.customer_phone.as_deref(),
            value.customer_email.as_deref(),
            lines,
            value.notes.as_deref(),
        )?)
    }
}

/// Move a booking to another workflow state.
///
/// Any state may follow any other. The customer is notified of the change.
#[utoipa::path(
    patch,
    path = "/api/bookings/{id}/status",
    params(("id" = String, Path, description = "Booking identifier")),
    request_body = StatusRequest,
    responses(
        (status = 200, description = "Status changed", body = StatusChangeResponse),
        (status = 400, description = "Missing or unknown status", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Booking not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "updateBookingStatus",
    security(("bearer" = []))
)]
#[patch("/bookings/{id}/status")]
pub async fn update_status(
    auth: AuthenticatedAccount,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<StatusRequest>,
) -> ApiResult<web::Json<StatusChangeResponse>> {
    auth.require(Role::Admin)?;
    let id = parse_booking_id(&path.into_inner())?;
    let raw = payload
        .into_inner()
        .status
        .filter(|status| !status.trim().is_empty())
        .ok_or_else(|| missing_field_error(FieldName::new("status")))?;
    let change = state.workflow.transition(&id, &raw).await?;
    Ok(web::Json(StatusChangeResponse {
        booking: BookingDto::from(change.booking),
        previous_status: change.previous,
    }))
}

/// Price a booking and record an invoice at the standard 7.5% rate.
///
/// The booking's items are replaced by the invoice lines and both its
/// estimated and final price become the invoice total.
#[utoipa::path(
    post,
    path = "/api/bookings/{id}/invoice",
    params(("id" = String, Path, description = "Booking identifier")),
    request_body = InvoiceRequest,
    responses(
        (status = 201, description = "Invoice issued", body = InvoicedBookingResponse),
        (status = 400, description = "No items or invalid item", body = Error),
        (status = 404, description = "Booking not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["invoices"],
    operation_id = "generateInvoice",
    security([])
)]
#[post("/bookings/{id}/invoice")]
pub async fn generate_invoice(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<InvoiceRequest>,
) -> ApiResult<HttpResponse> {
    let id = parse_booking_id(&path.into_inner())?;
    let InvoiceRequest { items, notes } = payload.into_inner();
    let lines = invoice_lines(&items)?;
    let invoiced = state.invoices.generate_invoice(&id, lines, notes).await?;
    Ok(HttpResponse::Created().json(InvoicedBookingResponse::from(invoiced)))
}

/// Invoices issued for a booking, newest first.
#[utoipa::path(
    get,
    path = "/api/bookings/{id}/invoices",
    params(("id" = String, Path, description = "Booking identifier")),
    responses(
        (status = 200, description = "Invoices", body = [InvoiceDto]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Booking not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["invoices"],
    operation_id = "listInvoices",
    security(("bearer" = []))
)]
#[get("/bookings/{id}/invoices")]
pub async fn list_invoices(
    auth: AuthenticatedAccount,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<InvoiceDto>>> {
    auth.require(Role::Admin)?;
    let id = parse_booking_id(&path.into_inner())?;
    let invoices = state.invoices.list_invoices(&id).await?;
    Ok(web::Json(invoices.iter().map(InvoiceDto::from).collect()))
}

/// Record a counter sale: a confirmed booking and its invoice at 5% tax.
#[utoipa::path(
    post,
    path = "/api/pos/walk-in",
    request_body = WalkInRequest,
    responses(
        (status = 201, description = "Sale recorded", body = InvoicedBookingResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["invoices"],
    operation_id = "createWalkIn",
    security(("bearer" = []))
)]
#[post("/pos/walk-in")]
pub async fn create_walk_in(
    auth: AuthenticatedAccount,
    state: web::Data<HttpState>,
    payload: web::Json<WalkInRequest>,
) -> ApiResult<HttpResponse> {
    auth.require(Role::Admin)?;
    let order = WalkInOrder::try_from(&payload.into_inner())?;
    let invoiced = state.invoices.create_walk_in(order).await?;
    Ok(HttpResponse::Created().json(InvoicedBookingResponse::from(invoiced)))
}
