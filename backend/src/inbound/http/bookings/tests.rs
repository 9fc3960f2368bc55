//! Tests for the booking handlers.

use super::*;
use crate::domain::OrderNumber;
use crate::inbound::http::test_utils::{TestBackend, backend, test_app};
use crate::test_support::{Sent, TEST_TRACKING_BASE_URL};
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(create_booking)
            .service(list_bookings)
            .service(list_statuses)
            .service(list_user_bookings)
            .service(get_booking)
            .service(patch_booking),
    );
}

fn ada() -> Value {
    json!({
        "customerName": "Ada",
        "customerPhone": "08011112222",
        "customerEmail": "a@x.com",
        "pickupAddress": "12 Some St",
        "serviceType": "wash-fold",
        "termsAccepted": true
    })
}

async fn submit(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    body: Value,
) -> Value {
    let req = actix_test::TestRequest::post()
        .uri("/api/bookings")
        .set_json(body)
        .to_request();
    let res = actix_test::call_service(app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    actix_test::read_body_json(res).await
}

#[rstest]
#[actix_web::test]
async fn ada_submission_is_stored_pending(backend: TestBackend) {
    let app = actix_test::init_service(test_app(&backend).configure(routes)).await;

    let body = submit(&app, ada()).await;

    let booking = &body["booking"];
    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["paymentStatus"], "pending");
    assert_eq!(booking["customerName"], "Ada");
    let order_number = booking["orderNumber"].as_str().expect("order number");
    assert!(OrderNumber::is_well_formed(order_number), "{order_number}");
    let id = booking["id"].as_str().expect("id");
    assert_eq!(
        body["trackingUrl"],
        format!("{TEST_TRACKING_BASE_URL}/track/{id}")
    );
    assert!(matches!(
        backend.notifier.sent().as_slice(),
        [Sent::Confirmation { .. }]
    ));
}

#[rstest]
#[actix_web::test]
async fn items_price_the_booking(backend: TestBackend) {
    let app = actix_test::init_service(test_app(&backend).configure(routes)).await;
    let mut body = ada();
    body["items"] = json!([
        {"garmentType": "Shirt", "quantity": 3, "pricePerItem": 500},
        {"garmentType": "Suit", "quantity": 1, "pricePerItem": "2500.50"}
    ]);

    let body = submit(&app, body).await;

    assert_eq!(body["booking"]["totalItems"], 4);
    assert_eq!(body["booking"]["estimatedPrice"], "4000.50");
    assert_eq!(body["booking"]["finalPrice"], "4000.50");
}

#[rstest]
#[case("customerName")]
#[case("customerPhone")]
#[case("customerEmail")]
#[case("pickupAddress")]
#[case("serviceType")]
#[actix_web::test]
async fn missing_required_field_is_rejected(backend: TestBackend, #[case] field: &str) {
    let app = actix_test::init_service(test_app(&backend).configure(routes)).await;
    let mut body = ada();
    if let Some(object) = body.as_object_mut() {
        object.remove(field);
    }
    let req = actix_test::TestRequest::post()
        .uri("/api/bookings")
        .set_json(body)
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], field);
    assert!(backend.notifier.sent().is_empty());
}

#[rstest]
#[case(json!(false))]
#[case(Value::Null)]
#[actix_web::test]
async fn unaccepted_terms_are_rejected(backend: TestBackend, #[case] terms: Value) {
    let app = actix_test::init_service(test_app(&backend).configure(routes)).await;
    let mut body = ada();
    body["termsAccepted"] = terms;
    let req = actix_test::TestRequest::post()
        .uri("/api/bookings")
        .set_json(body)
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], "terms_not_accepted");
}

#[rstest]
#[actix_web::test]
async fn negative_quantity_names_the_item(backend: TestBackend) {
    let app = actix_test::init_service(test_app(&backend).configure(routes)).await;
    let mut body = ada();
    body["items"] = json!([
        {"garmentType": "Shirt", "quantity": 1, "pricePerItem": 1},
        {"garmentType": "Tie", "quantity": -2, "pricePerItem": 1}
    ]);
    let req = actix_test::TestRequest::post()
        .uri("/api/bookings")
        .set_json(body)
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["index"], 1);
    assert_eq!(body["details"]["field"], "quantity");
}

#[rstest]
#[actix_web::test]
async fn oversized_totals_are_rejected(backend: TestBackend) {
    let app = actix_test::init_service(test_app(&backend).configure(routes)).await;
    let mut body = ada();
    let rug = json!({"garmentType": "Rug", "quantity": 10_000, "pricePerItem": "999999.99"});
    body["items"] = json!([rug.clone(), rug]);
    let req = actix_test::TestRequest::post()
        .uri("/api/bookings")
        .set_json(body)
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["code"], "amount_out_of_range");
    assert!(backend.notifier.sent().is_empty());
}

#[rstest]
#[actix_web::test]
async fn malformed_json_uses_error_envelope(backend: TestBackend) {
    let app = actix_test::init_service(test_app(&backend).configure(routes)).await;
    let req = actix_test::TestRequest::post()
        .uri("/api/bookings")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["code"], "malformed_body");
}

#[rstest]
#[actix_web::test]
async fn listing_requires_a_token(backend: TestBackend) {
    let app = actix_test::init_service(test_app(&backend).configure(routes)).await;
    let req = actix_test::TestRequest::get().uri("/api/bookings").to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[rstest]
#[actix_web::test]
async fn customers_cannot_list_bookings(backend: TestBackend) {
    let token = backend.customer_token().await;
    let app = actix_test::init_service(test_app(&backend).configure(routes)).await;
    let req = actix_test::TestRequest::get()
        .uri("/api/bookings")
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[rstest]
#[actix_web::test]
async fn admins_list_newest_first(backend: TestBackend) {
    let token = backend.admin_token().await;
    let app = actix_test::init_service(test_app(&backend).configure(routes)).await;
    let first = submit(&app, ada()).await;
    backend.clock.advance(chrono::TimeDelta::minutes(5));
    let mut later = ada();
    later["customerName"] = json!("Grace");
    let second = submit(&app, later).await;

    let req = actix_test::TestRequest::get()
        .uri("/api/bookings")
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let list: Value = actix_test::call_and_read_body_json(&app, req).await;
    let ids: Vec<&Value> = list
        .as_array()
        .expect("array")
        .iter()
        .map(|booking| &booking["id"])
        .collect();
    assert_eq!(ids, vec![&second["booking"]["id"], &first["booking"]["id"]]);
}

#[rstest]
#[actix_web::test]
async fn statuses_are_listed_in_workflow_order(backend: TestBackend) {
    let app = actix_test::init_service(test_app(&backend).configure(routes)).await;
    let req = actix_test::TestRequest::get()
        .uri("/api/bookings/statuses")
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, req).await;
    let names: Vec<&str> = body
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|entry| entry["status"].as_str())
        .collect();
    assert_eq!(
        names,
        [
            "pending",
            "confirmed",
            "picked_up",
            "in_progress",
            "ready",
            "out_for_delivery",
            "delivered",
            "cancelled"
        ]
    );
    assert_eq!(body[5]["label"], "Out for Delivery");
    assert_eq!(body[6]["isTerminal"], true);
}

#[rstest]
#[actix_web::test]
async fn booking_lookup(backend: TestBackend) {
    let app = actix_test::init_service(test_app(&backend).configure(routes)).await;
    let created = submit(&app, ada()).await;
    let id = created["booking"]["id"].as_str().expect("id");

    let found = actix_test::TestRequest::get()
        .uri(&format!("/api/bookings/{id}"))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, found).await;
    assert_eq!(body["orderNumber"], created["booking"]["orderNumber"]);

    let missing = actix_test::TestRequest::get()
        .uri("/api/bookings/3fa85f64-5717-4562-b3fc-2c963f66afa6")
        .to_request();
    let res = actix_test::call_service(&app, missing).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let malformed = actix_test::TestRequest::get()
        .uri("/api/bookings/not-a-uuid")
        .to_request();
    let res = actix_test::call_service(&app, malformed).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn user_bookings_follow_the_resolved_account(backend: TestBackend) {
    let app = actix_test::init_service(test_app(&backend).configure(routes)).await;
    let created = submit(&app, ada()).await;
    let user_id = created["booking"]["userId"].as_str().expect("user id");

    let req = actix_test::TestRequest::get()
        .uri(&format!("/api/bookings/user/{user_id}"))
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let other = actix_test::TestRequest::get()
        .uri("/api/bookings/user/3fa85f64-5717-4562-b3fc-2c963f66afa6")
        .to_request();
    let body: Value = actix_test::call_and_read_body_json(&app, other).await;
    assert_eq!(body, json!([]));
}

#[rstest]
#[actix_web::test]
async fn explicit_user_id_owns_the_booking(backend: TestBackend) {
    let account = backend.seed_account("ada", Role::Customer).await;
    let app = actix_test::init_service(test_app(&backend).configure(routes)).await;
    let mut body = ada();
    body["userId"] = json!(account.id.to_string());

    let created = submit(&app, body).await;
    assert_eq!(created["booking"]["userId"], account.id.to_string());
}

#[rstest]
#[actix_web::test]
async fn patch_updates_items_and_notifies_on_status(backend: TestBackend) {
    let token = backend.admin_token().await;
    let app = actix_test::init_service(test_app(&backend).configure(routes)).await;
    let created = submit(&app, ada()).await;
    let id = created["booking"]["id"].as_str().expect("id");

    let req = actix_test::TestRequest::patch()
        .uri(&format!("/api/bookings/{id}"))
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
        .set_json(json!({
            "items": [{"garmentType": "Duvet", "quantity": 2, "pricePerItem": "1250.25"}],
            "status": "confirmed",
            "paymentStatus": "paid",
            "notes": "ring the bell"
        }))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["status"], "confirmed");
    assert_eq!(body["paymentStatus"], "paid");
    assert_eq!(body["estimatedPrice"], "2500.50");
    assert_eq!(body["notes"], "ring the bell");
    assert!(matches!(
        backend.notifier.sent().as_slice(),
        [
            Sent::Confirmation { .. },
            Sent::StatusUpdate {
                previous: BookingStatus::Pending,
                current: BookingStatus::Confirmed,
                ..
            }
        ]
    ));
}

#[rstest]
#[case(json!({"status": "lost"}))]
#[case(json!({"paymentStatus": "refunded"}))]
#[actix_web::test]
async fn patch_rejects_unknown_states(backend: TestBackend, #[case] body: Value) {
    let token = backend.admin_token().await;
    let app = actix_test::init_service(test_app(&backend).configure(routes)).await;
    let created = submit(&app, ada()).await;
    let id = created["booking"]["id"].as_str().expect("id");

    let req = actix_test::TestRequest::patch()
        .uri(&format!("/api/bookings/{id}"))
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
        .set_json(body)
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn patch_requires_admin(backend: TestBackend) {
    let token = backend.customer_token().await;
    let app = actix_test::init_service(test_app(&backend).configure(routes)).await;
    let req = actix_test::TestRequest::patch()
        .uri("/api/bookings/3fa85f64-5717-4562-b3fc-2c963f66afa6")
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
        .set_json(json!({"notes": "x"}))
        .to_request();
    let res = actix_test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}
