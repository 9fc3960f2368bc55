//! Test helpers for inbound HTTP components.

use actix_web::{App, web};
use rstest::fixture;

pub(crate) use crate::test_support::TestBackend;

use super::validation::json_error_handler;

/// Fresh in-memory backend per test.
#[fixture]
pub(crate) fn backend() -> TestBackend {
    TestBackend::new()
}

/// App with the backend's state and the shared JSON error handler, ready for
/// handlers under test to be registered.
pub(crate) fn test_app(
    backend: &TestBackend,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    App::new()
        .app_data(backend.data())
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
}
