//! Booking API handlers.
//!
//! ```text
//! POST /api/bookings            (public)
//! GET /api/bookings             (admin)
//! GET /api/bookings/statuses    (public)
//! GET /api/bookings/user/{id}   (public)
//! GET /api/bookings/{id}        (public)
//! PATCH /api/bookings/{id}      (admin)
//! ```

use actix_web::{HttpResponse, get, patch, post, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    BookingDraft, BookingItem, BookingPatch, BookingStatus, BookingSubmission, Error, Role,
    parse_status,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedAccount;
use crate::inbound::http::booking_dto::BookingDto;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, parse_account_id, parse_booking_id, parse_payment_status,
};

/// Garment line in a booking request.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingItemRequest {
    #[schema(example = "Shirt")]
    pub garment_type: String,
    #[schema(example = 3)]
    pub quantity: i64,
    #[schema(value_type = f64, example = 500)]
    pub price_per_item: Decimal,
}

fn parse_items(items: &[BookingItemRequest]) -> Result<Vec<BookingItem>, Error> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            BookingItem::try_new(index, &item.garment_type, item.quantity, item.price_per_item)
                .map_err(Error::from)
        })
        .collect()
}

/// Public booking submission.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBookingRequest {
    /// Registered account to attach the booking to, when known.
    pub user_id: Option<String>,
    #[schema(example = "Ada")]
    pub customer_name: Option<String>,
    #[schema(example = "08011112222")]
    pub customer_phone: Option<String>,
    #[schema(example = "a@x.com")]
    pub customer_email: Option<String>,
    #[schema(example = "12 Some St")]
    pub pickup_address: Option<String>,
    pub delivery_address: Option<String>,
    #[schema(example = "wash-fold")]
    pub service_type: Option<String>,
    pub is_express: bool,
    pub preferred_pickup_date: Option<String>,
    pub preferred_pickup_time: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<BookingItemRequest>,
    pub terms_accepted: Option<bool>,
}

impl TryFrom<&CreateBookingRequest> for BookingDraft {
    type Error = Error;

    fn try_from(value: &CreateBookingRequest) -> Result<Self, Self::Error> {
        let account_id = value
            .user_id
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_account_id(raw, FieldName::new("userId")))
            .transpose()?;
        let submission = BookingSubmission {
            account_id,
            customer_name: value.customer_name.as_deref(),
            customer_phone: value.customer_phone.as_deref(),
            customer_email: value.customer_email.as_deref(),
            pickup_address: value.pickup_address.as_deref(),
            delivery_address: value.delivery_address.as_deref(),
            service_type: value.service_type.as_deref(),
            is_express: value.is_express,
            preferred_pickup_date: value.preferred_pickup_date.as_deref(),
            preferred_pickup_time: value.preferred_pickup_time.as_deref(),
            notes: value.notes.as_deref(),
            items: parse_items(&value.items)?,
            terms_accepted: value.terms_accepted,
        };
        Ok(Self::try_from_submission(submission)?)
    }
}

/// Staff patch. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PatchBookingRequest {
    /// Replaces the item list and recomputes prices.
    pub items: Option<Vec<BookingItemRequest>>,
    pub notes: Option<String>,
    #[schema(example = "confirmed")]
    pub status: Option<String>,
    #[schema(example = "paid")]
    pub payment_status: Option<String>,
}

impl TryFrom<&PatchBookingRequest> for BookingPatch {
    type Error = Error;

    fn try_from(value: &PatchBookingRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            items: value.items.as_deref().map(parse_items).transpose()?,
            notes: value.notes.clone(),
            status: value.status.as_deref().map(parse_status).transpose()?,
            payment_status: value
                .payment_status
                .as_deref()
                .map(parse_payment_status)
                .transpose()?,
        })
    }
}

/// Response to a public submission.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBookingResponse {
    pub booking: BookingDto,
    /// Customer-facing tracking page.
    #[schema(example = "https://shop.example/track/3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub tracking_url: String,
}

/// One workflow state as shown on the tracking page.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusDescriptor {
    pub status: BookingStatus,
    #[schema(example = "Out for Delivery")]
    pub label: &'static str,
    pub description: &'static str,
    pub next_step: &'static str,
    pub is_terminal: bool,
}

impl From<BookingStatus> for StatusDescriptor {
    fn from(status: BookingStatus) -> Self {
        Self {
            status,
            label: status.label(),
            description: status.description(),
            next_step: status.next_step(),
            is_terminal: status.is_terminal(),
        }
    }
}

/// Submit a booking from the public form.
///
/// The owning account is resolved from `userId`, then email, then phone; a
/// guest account is created when none match.
#[utoipa::path(
    post,
    path = "/api/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking stored", body = CreatedBookingResponse),
        (status = 400, description = "Missing fields or terms not accepted", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "createBooking",
    security([])
)]
#[post("/bookings")]
pub async fn create_booking(
    state: web::Data<HttpState>,
    payload: web::Json<CreateBookingRequest>,
) -> ApiResult<HttpResponse> {
    let draft = BookingDraft::try_from(&payload.into_inner())?;
    let submitted = state.bookings.submit(draft).await?;
    Ok(HttpResponse::Created().json(CreatedBookingResponse {
        booking: BookingDto::from(submitted.booking),
        tracking_url: submitted.tracking_url,
    }))
}

/// List every booking, newest first.
#[utoipa::path(
    get,
    path = "/api/bookings",
    responses(
        (status = 200, description = "Bookings", body = [BookingDto]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "listBookings",
    security(("bearer" = []))
)]
#[get("/bookings")]
pub async fn list_bookings(
    auth: AuthenticatedAccount,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<BookingDto>>> {
    auth.require(Role::Admin)?;
    let bookings = state.bookings.store().get_all_bookings().await?;
    Ok(web::Json(bookings.iter().map(BookingDto::from).collect()))
}

/// Workflow states with their tracking-page copy, in workflow order.
#[utoipa::path(
    get,
    path = "/api/bookings/statuses",
    responses((status = 200, description = "Workflow states", body = [StatusDescriptor])),
    tags = ["bookings"],
    operation_id = "listBookingStatuses",
    security([])
)]
#[get("/bookings/statuses")]
pub async fn list_statuses() -> web::Json<Vec<StatusDescriptor>> {
    web::Json(BookingStatus::ALL.into_iter().map(StatusDescriptor::from).collect())
}

/// Bookings owned by an account, newest first. Empty when there are none.
#[utoipa::path(
    get,
    path = "/api/bookings/user/{user_id}",
    params(("user_id" = String, Path, description = "Account identifier")),
    responses(
        (status = 200, description = "Bookings", body = [BookingDto]),
        (status = 400, description = "Invalid account id", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "listBookingsForUser",
    security([])
)]
#[get("/bookings/user/{user_id}")]
pub async fn list_user_bookings(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<BookingDto>>> {
    let account_id = parse_account_id(&path.into_inner(), FieldName::new("userId"))?;
    let bookings = state
        .bookings
        .store()
        .get_bookings_by_account(&account_id)
        .await?;
    Ok(web::Json(bookings.iter().map(BookingDto::from).collect()))
}

/// Fetch one booking for the tracking page.
#[utoipa::path(
    get,
    path = "/api/bookings/{id}",
    params(("id" = String, Path, description = "Booking identifier")),
    responses(
        (status = 200, description = "Booking", body = BookingDto),
        (status = 400, description = "Invalid booking id", body = Error),
        (status = 404, description = "Booking not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "getBooking",
    security([])
)]
#[get("/bookings/{id}")]
pub async fn get_booking(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<BookingDto>> {
    let id = parse_booking_id(&path.into_inner())?;
    let booking = state
        .bookings
        .store()
        .get_booking(&id)
        .await?
        .ok_or_else(|| Error::not_found(format!("booking {id} not found")))?;
    Ok(web::Json(BookingDto::from(booking)))
}

/// Patch items, notes, status or payment status.
#[utoipa::path(
    patch,
    path = "/api/bookings/{id}",
    params(("id" = String, Path, description = "Booking identifier")),
    request_body = PatchBookingRequest,
    responses(
        (status = 200, description = "Updated booking", body = BookingDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 404, description = "Booking not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["bookings"],
    operation_id = "patchBooking",
    security(("bearer" = []))
)]
#[patch("/bookings/{id}")]
pub async fn patch_booking(
    auth: AuthenticatedAccount,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<PatchBookingRequest>,
) -> ApiResult<web::Json<BookingDto>> {
    auth.require(Role::Admin)?;
    let id = parse_booking_id(&path.into_inner())?;
    let patch = BookingPatch::try_from(&payload.into_inner())?;
    let booking = state.bookings.patch(&id, patch).await?;
    Ok(web::Json(BookingDto::from(booking)))
}

#[cfg(test)]
mod tests;
