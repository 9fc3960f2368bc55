//! End-to-end tests driving the full application over in-memory adapters.
//!
//! The app is assembled with the same `build_app` the server uses, so
//! middleware ordering, route precedence and the JSON error handler are all
//! exercised together.

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::test::{self, TestRequest};
use actix_web::web;
use chrono::TimeDelta;
use orderdesk::domain::{BookingStatus, TRACE_ID_HEADER};
use orderdesk::inbound::http::health::HealthState;
use orderdesk::middleware::LoginRateLimit;
use orderdesk::middleware::rate_limit::{DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW_MINUTES};
use orderdesk::server::{AppDependencies, build_app};
use orderdesk::test_support::{Sent, TestBackend};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

#[fixture]
fn backend() -> TestBackend {
    TestBackend::new()
}

async fn init_app(
    backend: &TestBackend,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    let health_state = web::Data::new(HealthState::new());
    health_state.mark_ready();
    test::init_service(build_app(AppDependencies {
        health_state,
        http_state: backend.data(),
        login_limit: LoginRateLimit::new(
            backend.clock.clone(),
            DEFAULT_MAX_ATTEMPTS,
            TimeDelta::minutes(DEFAULT_WINDOW_MINUTES),
        ),
    }))
    .await
}

async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(app, req).await;
    let status = res.status();
    let bytes = test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, body)
}

fn ada_submission() -> Value {
    json!({
        "customerName": "Ada",
        "customerPhone": "08011112222",
        "customerEmail": "a@x.com",
        "pickupAddress": "12 Some St",
        "serviceType": "wash-fold",
        "termsAccepted": true
    })
}

fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {token}"))
}

#[rstest]
#[actix_web::test]
async fn public_submission_creates_a_pending_booking(backend: TestBackend) {
    let app = init_app(&backend).await;
    let req = TestRequest::post()
        .uri("/api/bookings")
        .set_json(ada_submission())
        .to_request();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::CREATED);
    let booking = &body["booking"];
    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["paymentStatus"], "pending");
    let order_number = booking["orderNumber"].as_str().expect("order number");
    assert!(order_number.starts_with("ORD-"));
    let id = booking["id"].as_str().expect("id");
    assert_eq!(
        body["trackingUrl"],
        format!("https://shop.test/track/{id}")
    );

    let (status, fetched) = send(
        &app,
        TestRequest::get().uri(&format!("/api/bookings/{id}")).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["orderNumber"], order_number);
    assert!(matches!(
        backend.notifier.sent().as_slice(),
        [Sent::Confirmation { .. }]
    ));
}

#[rstest]
#[actix_web::test]
async fn shirt_invoice_totals_and_final_price(backend: TestBackend) {
    let app = init_app(&backend).await;
    let (_, created) = send(
        &app,
        TestRequest::post()
            .uri("/api/bookings")
            .set_json(ada_submission())
            .to_request(),
    )
    .await;
    let id = created["booking"]["id"].as_str().expect("id").to_owned();

    let (status, body) = send(
        &app,
        TestRequest::post()
            .uri(&format!("/api/bookings/{id}/invoice"))
            .set_json(json!({"items": [{"name": "Shirt", "qty": 3, "price": 500}]}))
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["invoice"]["subtotal"], "1500.00");
    assert_eq!(body["invoice"]["tax"], "112.50");
    assert_eq!(body["invoice"]["total"], "1612.50");
    assert_eq!(body["booking"]["finalPrice"], "1612.50");
}

#[rstest]
#[actix_web::test]
async fn listing_bookings_requires_a_token(backend: TestBackend) {
    let app = init_app(&backend).await;
    let (status, body) = send(&app, TestRequest::get().uri("/api/bookings").to_request()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");
    assert!(body["traceId"].is_string());
}

#[rstest]
#[actix_web::test]
async fn delivered_booking_can_move_back_to_confirmed(backend: TestBackend) {
    let app = init_app(&backend).await;
    let token = backend.admin_token().await;
    let (_, created) = send(
        &app,
        TestRequest::post()
            .uri("/api/bookings")
            .set_json(ada_submission())
            .to_request(),
    )
    .await;
    let id = created["booking"]["id"].as_str().expect("id").to_owned();

    for status in ["delivered", "confirmed"] {
        let (code, _) = send(
            &app,
            TestRequest::patch()
                .uri(&format!("/api/bookings/{id}/status"))
                .insert_header(bearer(&token))
                .set_json(json!({"status": status}))
                .to_request(),
        )
        .await;
        assert_eq!(code, StatusCode::OK);
    }

    let (_, fetched) = send(
        &app,
        TestRequest::get().uri(&format!("/api/bookings/{id}")).to_request(),
    )
    .await;
    assert_eq!(fetched["status"], "confirmed");
    let updates: Vec<_> = backend
        .notifier
        .sent()
        .into_iter()
        .filter_map(|sent| match sent {
            Sent::StatusUpdate { previous, current, .. } => Some((previous, current)),
            _ => None,
        })
        .collect();
    assert_eq!(
        updates,
        vec![
            (BookingStatus::Pending, BookingStatus::Delivered),
            (BookingStatus::Delivered, BookingStatus::Confirmed),
        ]
    );
}

#[rstest]
#[actix_web::test]
async fn walk_in_sale_is_confirmed_and_invoiced(backend: TestBackend) {
    let app = init_app(&backend).await;
    let token = backend.admin_token().await;
    let (status, body) = send(
        &app,
        TestRequest::post()
            .uri("/api/pos/walk-in")
            .insert_header(bearer(&token))
            .set_json(json!({
                "customerName": "Bola",
                "customerPhone": "08033334444",
                "items": [{"garmentType": "Suit", "quantity": 1, "pricePerItem": 1500}]
            }))
            .to_request(),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["booking"]["status"], "confirmed");
    assert_eq!(body["invoice"]["tax"], "75.00");
    assert_eq!(body["invoice"]["total"], "1575.00");

    let id = body["booking"]["id"].as_str().expect("id");
    let (status, invoices) = send(
        &app,
        TestRequest::get()
            .uri(&format!("/api/bookings/{id}/invoices"))
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(invoices.as_array().map(Vec::len), Some(1));
}

#[rstest]
#[actix_web::test]
async fn registered_customer_can_log_in_and_verify(backend: TestBackend) {
    let app = init_app(&backend).await;
    let (status, _) = send(
        &app,
        TestRequest::post()
            .uri("/api/register")
            .set_json(json!({"username": "grace", "password": "pw-123", "email": "g@x.com"}))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, login) = send(
        &app,
        TestRequest::post()
            .uri("/api/login")
            .set_json(json!({"username": "grace", "password": "pw-123"}))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = login["token"].as_str().expect("token").to_owned();

    let (status, verified) = send(
        &app,
        TestRequest::get()
            .uri("/api/auth/verify")
            .insert_header(bearer(&token))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified["user"]["username"], "grace");
    assert_eq!(verified["user"]["role"], "customer");
}

#[rstest]
#[actix_web::test]
async fn sixth_login_attempt_is_throttled(backend: TestBackend) {
    let app = init_app(&backend).await;
    let attempt = || {
        TestRequest::post()
            .uri("/api/login")
            .peer_addr("192.0.2.10:5000".parse().expect("socket address"))
            .set_json(json!({"username": "nobody", "password": "pw"}))
            .to_request()
    };
    for _ in 0..DEFAULT_MAX_ATTEMPTS {
        let (status, _) = send(&app, attempt()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
    let (status, body) = send(&app, attempt()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "too_many_requests");

    backend.clock.advance(TimeDelta::minutes(DEFAULT_WINDOW_MINUTES));
    let (status, _) = send(&app, attempt()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn every_response_carries_a_trace_id(backend: TestBackend) {
    let app = init_app(&backend).await;
    let res = test::call_service(&app, TestRequest::get().uri("/api/branches").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let header = res
        .headers()
        .get(TRACE_ID_HEADER)
        .expect("trace id header")
        .to_str()
        .expect("ascii header")
        .to_owned();
    assert!(uuid::Uuid::parse_str(&header).is_ok());
}

#[rstest]
#[actix_web::test]
async fn readiness_check_reports_ready(backend: TestBackend) {
    let app = init_app(&backend).await;
    let res = test::call_service(&app, TestRequest::get().uri("/health/ready").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[rstest]
#[actix_web::test]
async fn malformed_json_is_a_validation_error(backend: TestBackend) {
    let app = init_app(&backend).await;
    let req = TestRequest::post()
        .uri("/api/bookings")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_request");
}

#[rstest]
#[actix_web::test]
async fn unknown_status_value_is_rejected(backend: TestBackend) {
    let app = init_app(&backend).await;
    let token = backend.admin_token().await;
    let (_, created) = send(
        &app,
        TestRequest::post()
            .uri("/api/bookings")
            .set_json(ada_submission())
            .to_request(),
    )
    .await;
    let id = created["booking"]["id"].as_str().expect("id").to_owned();
    let (status, _) = send(
        &app,
        TestRequest::patch()
            .uri(&format!("/api/bookings/{id}/status"))
            .insert_header(bearer(&token))
            .set_json(json!({"status": "lost"}))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
