//! Invoice data model and pricing arithmetic.
//!
//! An invoice is an immutable snapshot: once computed and stored its lines
//! and amounts never change. Corrections are made by issuing another
//! invoice.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::booking::{positive_quantity, unit_price_in_range};
use super::money::{add_money, money_in_range};
use super::{BookingId, BookingItem, BookingValidationError, round_money};

/// Stable invoice identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(Uuid);

impl InvoiceId {
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

impl fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InvoiceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

/// Validated invoice line.
///
/// ## Invariants
/// - `description` is trimmed and non-empty.
/// - `quantity` is in `1..=MAX_LINE_QUANTITY`.
/// - `unit_price` is in `0..=MAX_UNIT_PRICE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    description: String,
    quantity: u32,
    unit_price: Decimal,
}

impl InvoiceLine {
    /// Validate a raw line; `index` locates it in error details.
    pub fn try_new(
        index: usize,
        description: &str,
        quantity: i64,
        unit_price: Decimal,
    ) -> Result<Self, BookingValidationError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(BookingValidationError::InvalidItem { index, field: "name" });
        }
        let quantity = positive_quantity(quantity)
            .ok_or(BookingValidationError::InvalidItem { index, field: "qty" })?;
        if !unit_price_in_range(unit_price) {
            return Err(BookingValidationError::InvalidItem { index, field: "price" });
        }
        Ok(Self {
            description: description.to_owned(),
            quantity,
            unit_price,
        })
    }

    /// Garment or service description.
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Positive count.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Non-negative unit price.
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Quantity multiplied by unit price, saturating for display.
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity).saturating_mul(self.unit_price)
    }

    /// Quantity multiplied by unit price, `None` on overflow.
    pub fn checked_line_total(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.unit_price)
    }
}

impl From<&InvoiceLine> for BookingItem {
    fn from(line: &InvoiceLine) -> Self {
        Self {
            garment_type: line.description.clone(),
            quantity: line.quantity,
            price_per_item: line.unit_price,
        }
    }
}

impl From<&BookingItem> for InvoiceLine {
    fn from(item: &BookingItem) -> Self {
        Self {
            description: item.garment_type.clone(),
            quantity: item.quantity,
            unit_price: item.price_per_item,
        }
    }
}

/// Tax rate applied to an invoice subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxRate(Decimal);

impl TaxRate {
    /// Rate for invoices generated against an existing booking: 7.5%.
    pub const STANDARD: Self = Self(Decimal::from_parts(75, 0, 0, false, 3));
    /// Rate for counter walk-in sales: 5%.
    pub const WALK_IN: Self = Self(Decimal::from_parts(5, 0, 0, false, 2));

    /// Wrap a stored rate.
    pub fn from_decimal(rate: Decimal) -> Self {
        Self(rate)
    }

    /// Rate as a fraction, e.g. `0.075`.
    pub fn as_decimal(self) -> Decimal {
        self.0
    }
}

/// Subtotal, tax and total for a set of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceTotals {
    /// Σ quantity × unit price.
    pub subtotal: Decimal,
    /// `subtotal × rate`.
    pub tax: Decimal,
    /// `subtotal + tax`.
    pub total: Decimal,
}

impl InvoiceTotals {
    /// Price `lines` at `rate`, every amount rounded half away from zero to
    /// two fraction digits.
    ///
    /// # Errors
    /// [`BookingValidationError::AmountOutOfRange`] when any amount would not
    /// fit a money column.
    ///
    /// # Examples
    /// ```
    /// use orderdesk::domain::{InvoiceLine, InvoiceTotals, TaxRate};
    /// use rust_decimal::Decimal;
    ///
    /// let lines = [InvoiceLine::try_new(0, "Shirt", 3, Decimal::from(500)).expect("valid")];
    /// let totals = InvoiceTotals::compute(&lines, TaxRate::STANDARD).expect("in range");
    /// assert_eq!(totals.subtotal.to_string(), "1500.00");
    /// assert_eq!(totals.tax.to_string(), "112.50");
    /// assert_eq!(totals.total.to_string(), "1612.50");
    /// ```
    pub fn compute(lines: &[InvoiceLine], rate: TaxRate) -> Result<Self, BookingValidationError> {
        let mut subtotal = Decimal::ZERO;
        for line in lines {
            let amount = line
                .checked_line_total()
                .ok_or(BookingValidationError::AmountOutOfRange)?;
            subtotal = add_money(subtotal, amount)?;
        }
        let subtotal = money_in_range(round_money(subtotal))?;
        let tax = subtotal
            .checked_mul(rate.as_decimal())
            .map(round_money)
            .ok_or(BookingValidationError::AmountOutOfRange)?;
        let total = add_money(subtotal, tax)?;
        Ok(Self {
            subtotal,
            tax,
            total: round_money(total),
        })
    }
}

/// Validate a raw list of lines, requiring at least one.
pub fn require_lines(lines: Vec<InvoiceLine>) -> Result<Vec<InvoiceLine>, BookingValidationError> {
    if lines.is_empty() {
        return Err(BookingValidationError::EmptyItems);
    }
    Ok(lines)
}

/// Stored invoice record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    /// Identifier.
    pub id: InvoiceId,
    /// Owning booking.
    pub booking_id: BookingId,
    /// Line snapshot.
    pub items: Vec<InvoiceLine>,
    /// Σ line totals.
    pub subtotal: Decimal,
    /// Tax amount.
    pub tax: Decimal,
    /// Rate the tax was computed at.
    pub tax_rate: TaxRate,
    /// Subtotal plus tax.
    pub total: Decimal,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// Price `items` at `rate` for `booking_id`.
    pub fn issue(
        booking_id: BookingId,
        items: Vec<InvoiceLine>,
        rate: TaxRate,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, BookingValidationError> {
        let InvoiceTotals {
            subtotal,
            tax,
            total,
        } = InvoiceTotals::compute(&items, rate)?;
        Ok(Self {
            id: InvoiceId::random(),
            booking_id,
            items,
            subtotal,
            tax,
            tax_rate: rate,
            total,
            notes,
            created_at: now,
        })
    }

    /// Line snapshot expressed as booking items.
    pub fn booking_items(&self) -> Vec<BookingItem> {
        self.items.iter().map(BookingItem::from).collect()
    }
}
