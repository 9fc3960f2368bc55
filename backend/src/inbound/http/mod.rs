//! HTTP inbound adapter exposing REST endpoints.

pub mod accounts;
pub mod auth;
pub mod booking_dto;
pub mod bookings;
pub mod branches;
pub mod error;
pub mod health;
pub mod invoices;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api` handler on `cfg`.
///
/// `/bookings/statuses` is registered ahead of `/bookings/{id}` so the
/// literal segment wins.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(accounts::register)
            .service(accounts::login)
            .service(accounts::verify)
            .service(accounts::register_admin)
            .service(bookings::list_statuses)
            .service(bookings::create_booking)
            .service(bookings::list_bookings)
            .service(bookings::list_user_bookings)
            .service(invoices::update_status)
            .service(invoices::generate_invoice)
            .service(invoices::list_invoices)
            .service(bookings::get_booking)
            .service(bookings::patch_booking)
            .service(invoices::create_walk_in)
            .service(branches::list_branches),
    );
}
