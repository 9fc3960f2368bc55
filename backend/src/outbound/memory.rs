//! In-memory adapters backing every storage port.
//!
//! Used when no database URL is configured and by tests. A single mutex
//! guards all three tables so the two-record invoice writes are atomic.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, BookingRepository, BookingRepositoryError,
    BranchDirectory, BranchDirectoryError, InvoiceRepository, InvoiceRepositoryError,
};
use crate::domain::{Account, AccountId, Booking, BookingId, BookingStatus, Branch, Invoice};

#[derive(Debug, Default)]
struct Tables {
    accounts: HashMap<AccountId, Account>,
    bookings: HashMap<BookingId, Booking>,
    invoices: Vec<Invoice>,
}

impl Tables {
    fn order_number_taken(&self, booking: &Booking) -> bool {
        self.bookings
            .values()
            .any(|existing| existing.id != booking.id && existing.order_number == booking.order_number)
    }
}

/// Process-local store implementing the account, booking and invoice ports.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn newest_first<T>(mut rows: Vec<T>, created_at: impl Fn(&T) -> chrono::DateTime<chrono::Utc>) -> Vec<T> {
    rows.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
    rows
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn insert(&self, account: &Account) -> Result<(), AccountRepositoryError> {
        let mut tables = self.tables();
        if tables
            .accounts
            .values()
            .any(|existing| existing.username == account.username)
        {
            return Err(AccountRepositoryError::duplicate("username"));
        }
        if account.email.is_some()
            && tables
                .accounts
                .values()
                .any(|existing| existing.email == account.email)
        {
            return Err(AccountRepositoryError::duplicate("email"));
        }
        tables.accounts.insert(account.id, account.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountRepositoryError> {
        Ok(self.tables().accounts.get(id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, AccountRepositoryError> {
        Ok(self
            .tables()
            .accounts
            .values()
            .find(|account| account.username == username)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountRepositoryError> {
        Ok(self
            .tables()
            .accounts
            .values()
            .find(|account| account.email.as_deref() == Some(email))
            .cloned())
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn insert(&self, booking: &Booking) -> Result<(), BookingRepositoryError> {
        let mut tables = self.tables();
        if tables.order_number_taken(booking) {
            return Err(BookingRepositoryError::duplicate_order_number(
                booking.order_number.as_str(),
            ));
        }
        tables.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn update(&self, booking: &Booking) -> Result<bool, BookingRepositoryError> {
        let mut tables = self.tables();
        match tables.bookings.get_mut(&booking.id) {
            Some(slot) => {
                *slot = booking.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_status(
        &self,
        id: &BookingId,
        status: BookingStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<BookingStatus>, BookingRepositoryError> {
        let mut tables = self.tables();
        Ok(tables.bookings.get_mut(id).map(|slot| {
            let previous = slot.status;
            slot.status = status;
            slot.updated_at = updated_at;
            previous
        }))
    }

    async fn find_by_id(&self, id: &BookingId) -> Result<Option<Booking>, BookingRepositoryError> {
        Ok(self.tables().bookings.get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Booking>, BookingRepositoryError> {
        let rows = self.tables().bookings.values().cloned().collect();
        Ok(newest_first(rows, |booking: &Booking| booking.created_at))
    }

    async fn list_for_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<Booking>, BookingRepositoryError> {
        let rows = self
            .tables()
            .bookings
            .values()
            .filter(|booking| booking.account_id == *account_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |booking: &Booking| booking.created_at))
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryStore {
    async fn record_invoice(
        &self,
        invoice: &Invoice,
        booking: &Booking,
    ) -> Result<(), InvoiceRepositoryError> {
        let mut tables = self.tables();
        let Some(slot) = tables.bookings.get_mut(&booking.id) else {
            return Err(InvoiceRepositoryError::missing_booking(booking.id.to_string()));
        };
        slot.items.clone_from(&booking.items);
        slot.total_items = booking.total_items;
        slot.estimated_price = booking.estimated_price;
        slot.final_price = booking.final_price;
        slot.payment_status = booking.payment_status;
        slot.updated_at = booking.updated_at;
        tables.invoices.push(invoice.clone());
        Ok(())
    }

    async fn create_walk_in(
        &self,
        booking: &Booking,
        invoice: &Invoice,
    ) -> Result<(), InvoiceRepositoryError> {
        let mut tables = self.tables();
        if tables.order_number_taken(booking) {
            return Err(InvoiceRepositoryError::duplicate_order_number(
                booking.order_number.as_str(),
            ));
        }
        tables.bookings.insert(booking.id, booking.clone());
        tables.invoices.push(invoice.clone());
        Ok(())
    }

    async fn list_for_booking(
        &self,
        booking_id: &BookingId,
    ) -> Result<Vec<Invoice>, InvoiceRepositoryError> {
        let rows = self
            .tables()
            .invoices
            .iter()
            .filter(|invoice| invoice.booking_id == *booking_id)
            .cloned()
            .collect();
        Ok(newest_first(rows, |invoice: &Invoice| invoice.created_at))
    }
}

/// Fixed branch list, filtered to active branches on read.
#[derive(Debug, Clone, Default)]
pub struct StaticBranchDirectory {
    branches: Vec<Branch>,
}

impl StaticBranchDirectory {
    /// Serve `branches`.
    pub fn new(branches: Vec<Branch>) -> Self {
        Self { branches }
    }
}

#[async_trait]
impl BranchDirectory for StaticBranchDirectory {
    async fn active_branches(&self) -> Result<Vec<Branch>, BranchDirectoryError> {
        let mut active: Vec<Branch> = self
            .branches
            .iter()
            .filter(|branch| branch.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(active)
    }
}
