//! Booking data model: one customer order across its lifecycle.
//!
//! Derived pricing fields (`total_items`, `estimated_price`, `final_price`)
//! are only ever recomputed from items or written by invoicing; no caller
//! sets them directly.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use super::money::{add_money, money_in_range};
use super::{AccountId, Error, round_money};

/// Stable booking identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(Uuid);

impl BookingId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BookingId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

/// Human-referenceable order number, `ORD-<epoch millis>-<0..=999>`.
///
/// Assigned once at creation and never regenerated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

/// Largest random suffix appended to an order number.
pub const ORDER_SUFFIX_MAX: u16 = 999;

impl OrderNumber {
    /// Generate a fresh order number for `now` with a random suffix.
    pub fn generate(now: DateTime<Utc>) -> Self {
        let suffix = rand::thread_rng().gen_range(0..=ORDER_SUFFIX_MAX);
        Self::from_parts(now.timestamp_millis(), suffix)
    }

    /// Build an order number from its parts.
    pub fn from_parts(millis: i64, suffix: u16) -> Self {
        Self(format!("ORD-{millis}-{suffix}"))
    }

    /// Wrap a stored order number.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Whether `raw` matches `ORD-<digits>-<0..=999>`.
    ///
    /// # Examples
    /// ```
    /// use orderdesk::domain::OrderNumber;
    ///
    /// assert!(OrderNumber::is_well_formed("ORD-1718000000000-42"));
    /// assert!(!OrderNumber::is_well_formed("ORD-1718000000000-1000"));
    /// ```
    pub fn is_well_formed(raw: &str) -> bool {
        let Some(rest) = raw.strip_prefix("ORD-") else {
            return false;
        };
        let Some((millis, suffix)) = rest.split_once('-') else {
            return false;
        };
        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        all_digits(millis)
            && all_digits(suffix)
            && suffix.len() <= 3
            && suffix.parse::<u16>().is_ok_and(|value| value <= ORDER_SUFFIX_MAX)
    }

    /// Borrow as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow state of a booking.
///
/// `pending → confirmed → picked_up → in_progress → ready →
/// out_for_delivery → delivered`, with `cancelled` reachable from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Submitted, awaiting staff confirmation.
    Pending,
    /// Accepted by staff.
    Confirmed,
    /// Garments collected from the customer.
    PickedUp,
    /// Being cleaned.
    InProgress,
    /// Cleaned and awaiting dispatch or collection.
    Ready,
    /// On the way back to the customer.
    OutForDelivery,
    /// Returned to the customer. Terminal.
    Delivered,
    /// Abandoned. Terminal.
    Cancelled,
}

/// Error returned for a status name outside the workflow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid status: {0}")]
pub struct InvalidStatus(pub String);

impl BookingStatus {
    /// Every workflow state in lifecycle order, `cancelled` last.
    pub const ALL: [Self; 8] = [
        Self::Pending,
        Self::Confirmed,
        Self::PickedUp,
        Self::InProgress,
        Self::Ready,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Wire/storage name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::PickedUp => "picked_up",
            Self::InProgress => "in_progress",
            Self::Ready => "ready",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Short customer-facing label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::PickedUp => "Picked Up",
            Self::InProgress => "In Progress",
            Self::Ready => "Ready",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// One-sentence description of the state.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Pending => "Your booking has been received and is awaiting confirmation.",
            Self::Confirmed => "Your booking is confirmed and a pickup is being scheduled.",
            Self::PickedUp => "We have collected your garments.",
            Self::InProgress => "Your garments are being cleaned.",
            Self::Ready => "Your garments are clean and ready.",
            Self::OutForDelivery => "Your garments are on their way back to you.",
            Self::Delivered => "Your garments have been delivered.",
            Self::Cancelled => "This booking has been cancelled.",
        }
    }

    /// Hint about what happens next.
    pub const fn next_step(self) -> &'static str {
        match self {
            Self::Pending => "Our team will confirm your booking shortly.",
            Self::Confirmed => "A rider will arrive at your pickup address.",
            Self::PickedUp => "Cleaning starts once your items are tagged.",
            Self::InProgress => "We will let you know when everything is ready.",
            Self::Ready => "Delivery will be dispatched soon.",
            Self::OutForDelivery => "Please be available at your delivery address.",
            Self::Delivered => "Thank you for choosing us.",
            Self::Cancelled => "Contact us if you would like to rebook.",
        }
    }

    /// `delivered` and `cancelled` end the lifecycle.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidStatus(s.to_owned()))
    }
}

/// Payment state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Not yet paid.
    Pending,
    /// Paid in full.
    Paid,
    /// Payment attempt failed.
    Failed,
}

impl PaymentStatus {
    /// Wire/storage name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            other => Err(InvalidStatus(other.to_owned())),
        }
    }
}

/// One garment line on a booking.
///
/// Serialised camelCase with the price as a decimal string; this is also
/// the JSONB storage shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingItem {
    /// Garment name, e.g. `Shirt`.
    pub garment_type: String,
    /// Positive count.
    pub quantity: u32,
    /// Non-negative unit price.
    pub price_per_item: Decimal,
}

impl BookingItem {
    /// Validate and construct an item. `index` locates the item in error
    /// details.
    pub fn try_new(
        index: usize,
        garment_type: &str,
        quantity: i64,
        price_per_item: Decimal,
    ) -> Result<Self, BookingValidationError> {
        let garment_type = garment_type.trim();
        if garment_type.is_empty() {
            return Err(BookingValidationError::InvalidItem {
                index,
                field: "garmentType",
            });
        }
        let quantity = positive_quantity(quantity).ok_or(BookingValidationError::InvalidItem {
            index,
            field: "quantity",
        })?;
        if !unit_price_in_range(price_per_item) {
            return Err(BookingValidationError::InvalidItem {
                index,
                field: "pricePerItem",
            });
        }
        Ok(Self {
            garment_type: garment_type.to_owned(),
            quantity,
            price_per_item,
        })
    }

    /// Quantity multiplied by unit price, saturating for display.
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity).saturating_mul(self.price_per_item)
    }

    /// Quantity multiplied by unit price, `None` on overflow.
    pub fn checked_line_total(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.price_per_item)
    }
}

/// Largest quantity accepted on one line.
pub const MAX_LINE_QUANTITY: u32 = 10_000;

/// Largest unit price accepted on one line: 999,999.99.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 2);

/// Accept quantities in `1..=MAX_LINE_QUANTITY`.
pub(crate) fn positive_quantity(raw: i64) -> Option<u32> {
    u32::try_from(raw)
        .ok()
        .filter(|quantity| (1..=MAX_LINE_QUANTITY).contains(quantity))
}

/// Accept unit prices in `0..=MAX_UNIT_PRICE`.
pub(crate) fn unit_price_in_range(price: Decimal) -> bool {
    !price.is_sign_negative() && price <= MAX_UNIT_PRICE
}

/// Totals derived from an item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemTotals {
    /// Σ quantity.
    pub total_items: u32,
    /// Σ quantity × price, rounded to two fraction digits.
    pub amount: Decimal,
}

impl ItemTotals {
    /// Compute totals over `items`.
    ///
    /// Fails with [`BookingValidationError::AmountOutOfRange`] when the item
    /// count no longer fits the stored column or the amount exceeds
    /// [`MAX_MONEY_AMOUNT`](super::money::MAX_MONEY_AMOUNT).
    pub fn of(items: &[BookingItem]) -> Result<Self, BookingValidationError> {
        let mut total_items = 0_u32;
        let mut amount = Decimal::ZERO;
        for item in items {
            total_items = total_items
                .checked_add(item.quantity)
                .filter(|count| i32::try_from(*count).is_ok())
                .ok_or(BookingValidationError::AmountOutOfRange)?;
            let line = item
                .checked_line_total()
                .ok_or(BookingValidationError::AmountOutOfRange)?;
            amount = add_money(amount, line)?;
        }
        Ok(Self {
            total_items,
            amount: money_in_range(round_money(amount))?,
        })
    }
}

/// Validation failures for booking input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingValidationError {
    /// A required field was missing or blank.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// The public form requires accepted terms.
    #[error("terms must be accepted")]
    TermsNotAccepted,
    /// An item failed validation.
    #[error("item {index} has an invalid {field}")]
    InvalidItem {
        /// Position in the submitted list.
        index: usize,
        /// Offending field.
        field: &'static str,
    },
    /// An item list was required but empty.
    #[error("at least one item is required")]
    EmptyItems,
    /// Item totals exceed what an order can hold.
    #[error("item totals exceed the supported amount")]
    AmountOutOfRange,
}

impl From<BookingValidationError> for Error {
    fn from(err: BookingValidationError) -> Self {
        let details = match &err {
            BookingValidationError::MissingField(field) => {
                json!({ "field": field, "code": "missing_field" })
            }
            BookingValidationError::TermsNotAccepted => {
                json!({ "field": "termsAccepted", "code": "terms_not_accepted" })
            }
            BookingValidationError::InvalidItem { index, field } => {
                json!({ "field": field, "index": index, "code": "invalid_item" })
            }
            BookingValidationError::EmptyItems => {
                json!({ "field": "items", "code": "empty_items" })
            }
            BookingValidationError::AmountOutOfRange => {
                json!({ "field": "items", "code": "amount_out_of_range" })
            }
        };
        Self::invalid_request(err.to_string()).with_details(details)
    }
}

/// Validated contact snapshot captured at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSnapshot {
    /// Customer name.
    pub name: String,
    /// Customer phone; also the guest username.
    pub phone: String,
    /// Email; optional only for walk-ins.
    pub email: Option<String>,
}

/// New booking as submitted, before an account and order number exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDraft {
    /// Explicit owning account, when the caller is signed in.
    pub account_id: Option<AccountId>,
    /// Contact details.
    pub contact: ContactSnapshot,
    /// Where garments are collected.
    pub pickup_address: String,
    /// Where garments are returned, if different.
    pub delivery_address: Option<String>,
    /// Free-form service identifier, e.g. `wash-fold`.
    pub service_type: String,
    /// Express turnaround.
    pub is_express: bool,
    /// Preferred pickup date, presence only.
    pub preferred_pickup_date: Option<String>,
    /// Preferred pickup time, presence only.
    pub preferred_pickup_time: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Optional initial items.
    pub items: Vec<BookingItem>,
    /// Whether the customer accepted the terms.
    pub terms_accepted: bool,
}

/// Raw public submission fields, as received.
#[derive(Debug, Clone, Default)]
pub struct BookingSubmission<'a> {
    /// Explicit owning account.
    pub account_id: Option<AccountId>,
    /// Customer name.
    pub customer_name: Option<&'a str>,
    /// Customer phone.
    pub customer_phone: Option<&'a str>,
    /// Customer email.
    pub customer_email: Option<&'a str>,
    /// Pickup address.
    pub pickup_address: Option<&'a str>,
    /// Delivery address.
    pub delivery_address: Option<&'a str>,
    /// Service identifier.
    pub service_type: Option<&'a str>,
    /// Express flag.
    pub is_express: bool,
    /// Preferred pickup date.
    pub preferred_pickup_date: Option<&'a str>,
    /// Preferred pickup time.
    pub preferred_pickup_time: Option<&'a str>,
    /// Notes.
    pub notes: Option<&'a str>,
    /// Items, already validated.
    pub items: Vec<BookingItem>,
    /// Terms flag; `None` counts as not accepted.
    pub terms_accepted: Option<bool>,
}

fn required(value: Option<&str>, field: &'static str) -> Result<String, BookingValidationError> {
    super::auth::non_blank(value).ok_or(BookingValidationError::MissingField(field))
}

impl BookingDraft {
    /// Validate a public form submission.
    ///
    /// Name, phone, email, pickup address and service type must be present
    /// and non-blank, terms must be accepted and item totals must fit a money
    /// column.
    pub fn try_from_submission(raw: BookingSubmission<'_>) -> Result<Self, BookingValidationError> {
        let name = required(raw.customer_name, "customerName")?;
        let phone = required(raw.customer_phone, "customerPhone")?;
        let email = required(raw.customer_email, "customerEmail")?;
        let pickup_address = required(raw.pickup_address, "pickupAddress")?;
        let service_type = required(raw.service_type, "serviceType")?;
        if raw.terms_accepted != Some(true) {
            return Err(BookingValidationError::TermsNotAccepted);
        }
        ItemTotals::of(&raw.items)?;
        Ok(Self {
            account_id: raw.account_id,
            contact: ContactSnapshot {
                name,
                phone,
                email: Some(email),
            },
            pickup_address,
            delivery_address: super::auth::non_blank(raw.delivery_address),
            service_type,
            is_express: raw.is_express,
            preferred_pickup_date: super::auth::non_blank(raw.preferred_pickup_date),
            preferred_pickup_time: super::auth::non_blank(raw.preferred_pickup_time),
            notes: super::auth::non_blank(raw.notes),
            items: raw.items,
            terms_accepted: true,
        })
    }
}

/// Stored booking record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    /// Identifier.
    pub id: BookingId,
    /// Owning account; always resolved before storage.
    pub account_id: AccountId,
    /// Order number assigned at creation.
    pub order_number: OrderNumber,
    /// Contact snapshot.
    pub contact: ContactSnapshot,
    /// Pickup address.
    pub pickup_address: String,
    /// Delivery address.
    pub delivery_address: Option<String>,
    /// Service identifier.
    pub service_type: String,
    /// Express flag.
    pub is_express: bool,
    /// Preferred pickup date.
    pub preferred_pickup_date: Option<String>,
    /// Preferred pickup time.
    pub preferred_pickup_time: Option<String>,
    /// Notes.
    pub notes: Option<String>,
    /// Garment lines.
    pub items: Vec<BookingItem>,
    /// Σ quantity over items.
    pub total_items: u32,
    /// Derived from items.
    pub estimated_price: Option<Decimal>,
    /// Derived from items or set by invoicing.
    pub final_price: Option<Decimal>,
    /// Workflow state.
    pub status: BookingStatus,
    /// Payment state.
    pub payment_status: PaymentStatus,
    /// Whether terms were accepted.
    pub terms_accepted: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Bumped on every mutation.
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Materialise a draft owned by `account_id`, status `pending`.
    pub fn from_draft(
        draft: BookingDraft,
        account_id: AccountId,
        order_number: OrderNumber,
        now: DateTime<Utc>,
    ) -> Result<Self, BookingValidationError> {
        let mut booking = Self {
            id: BookingId::random(),
            account_id,
            order_number,
            contact: draft.contact,
            pickup_address: draft.pickup_address,
            delivery_address: draft.delivery_address,
            service_type: draft.service_type,
            is_express: draft.is_express,
            preferred_pickup_date: draft.preferred_pickup_date,
            preferred_pickup_time: draft.preferred_pickup_time,
            notes: draft.notes,
            items: Vec::new(),
            total_items: 0,
            estimated_price: None,
            final_price: None,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            terms_accepted: draft.terms_accepted,
            created_at: now,
            updated_at: now,
        };
        if !draft.items.is_empty() {
            booking.replace_items(draft.items)?;
        }
        Ok(booking)
    }

    /// Replace items and recompute every derived field from them.
    ///
    /// The booking is left untouched when the totals are out of range.
    pub fn replace_items(&mut self, items: Vec<BookingItem>) -> Result<(), BookingValidationError> {
        let totals = ItemTotals::of(&items)?;
        self.items = items;
        self.total_items = totals.total_items;
        self.estimated_price = Some(totals.amount);
        self.final_price = Some(totals.amount);
        Ok(())
    }

    /// Apply a patch and bump `updated_at`.
    ///
    /// Items are validated first, so a rejected patch changes nothing.
    pub fn apply_patch(
        &mut self,
        patch: BookingPatch,
        now: DateTime<Utc>,
    ) -> Result<(), BookingValidationError> {
        let BookingPatch {
            items,
            notes,
            status,
            payment_status,
        } = patch;
        if let Some(items) = items {
            self.replace_items(items)?;
        }
        if let Some(notes) = notes {
            self.notes = super::auth::non_blank(Some(notes.as_str()));
        }
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(payment_status) = payment_status {
            self.payment_status = payment_status;
        }
        self.updated_at = now;
        Ok(())
    }
}

/// Partial update accepted by the booking store.
///
/// Derived price fields are deliberately absent: they follow `items`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingPatch {
    /// Replacement items.
    pub items: Option<Vec<BookingItem>>,
    /// Replacement notes; a blank string clears them.
    pub notes: Option<String>,
    /// New workflow state.
    pub status: Option<BookingStatus>,
    /// New payment state.
    pub payment_status: Option<PaymentStatus>,
}

impl BookingPatch {
    /// Whether the patch changes nothing but `updated_at`.
    pub fn is_empty(&self) -> bool {
        self.items.is_none()
            && self.notes.is_none()
            && self.status.is_none()
            && self.payment_status.is_none()
    }
}
