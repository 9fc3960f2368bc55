//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the order desk, the shared
//! error schema and the bearer token security scheme. Request and response
//! schemas referenced by the paths are collected automatically.
//!
//! The generated document is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by POST /api/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Order desk API",
        description = "Laundry order intake, status tracking, invoicing and point-of-sale walk-ins."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::verify,
        crate::inbound::http::accounts::register_admin,
        crate::inbound::http::bookings::create_booking,
        crate::inbound::http::bookings::list_bookings,
        crate::inbound::http::bookings::list_statuses,
        crate::inbound::http::bookings::list_user_bookings,
        crate::inbound::http::bookings::get_booking,
        crate::inbound::http::bookings::patch_booking,
        crate::inbound::http::invoices::update_status,
        crate::inbound::http::invoices::generate_invoice,
        crate::inbound::http::invoices::list_invoices,
        crate::inbound::http::invoices::create_walk_in,
        crate::inbound::http::branches::list_branches,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(Error, ErrorCode)),
    tags(
        (name = "accounts", description = "Registration, login and token checks"),
        (name = "bookings", description = "Booking intake, lookup and edits"),
        (name = "invoices", description = "Status changes, invoices and walk-in sales"),
        (name = "branches", description = "Shop locations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
