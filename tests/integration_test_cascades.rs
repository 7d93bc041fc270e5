mod common;

use common::{future_instant, parse_body, TestApp};
use reserva_backend::domain::models::event::{kinds, streams, EventEnvelope};
use reserva_backend::domain::ports::EventBus;
use serde_json::json;

#[tokio::test]
async fn deleting_a_resource_cancels_its_bookings() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Cascata Corp", "cascata.example.com").await;
    let (_, token) = app.signup_admin(&tenant_id).await;
    let resource_id = app.create_resource(&token).await;

    let created = app
        .create_booking(&token, &resource_id, &future_instant(7, 14, 0), &future_instant(7, 15, 0))
        .await;
    assert_eq!(created.status(), 201);
    let booking_id = parse_body(created).await["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            &app.resource_router,
            "DELETE",
            &format!("/resources/{}", resource_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(response.status(), 204);

    app.drain_events().await;

    let response = app
        .request(
            &app.booking_router,
            "GET",
            &format!("/bookings/{}", booking_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = parse_body(response).await;
    assert_eq!(body["status"], "cancelado");
    assert_eq!(body["cancellation_reason"], "resource_deleted");

    // The cascade announced each cancellation on the booking stream.
    let published = app.fabric.published(streams::BOOKING_EVENTS);
    assert!(published
        .iter()
        .any(|e| e.event_type == kinds::BOOKING_CANCELLED
            && e.payload["booking_id"] == booking_id.as_str()));
}

#[tokio::test]
async fn deleting_a_user_cancels_their_bookings() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Usuario Corp", "usuario-cascata.example.com").await;
    let (admin_id, token) = app.signup_admin(&tenant_id).await;
    let resource_id = app.create_resource(&token).await;

    let created = app
        .create_booking(&token, &resource_id, &future_instant(7, 14, 0), &future_instant(7, 15, 0))
        .await;
    let booking_id = parse_body(created).await["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            &app.user_router,
            "DELETE",
            &format!("/users/{}", admin_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(response.status(), 204);

    app.drain_events().await;

    let response = app
        .request(
            &app.booking_router,
            "GET",
            &format!("/bookings/{}", booking_id),
            Some(&token),
            None,
        )
        .await;
    let body = parse_body(response).await;
    assert_eq!(body["status"], "cancelado");
    assert_eq!(body["cancellation_reason"], "user_deleted");
}

#[tokio::test]
async fn deleting_a_tenant_removes_everything_it_owned() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Fim Corp", "fim.example.com").await;
    let (user_id, token) = app.signup_admin(&tenant_id).await;
    let resource_id = app.create_resource(&token).await;

    let created = app
        .create_booking(&token, &resource_id, &future_instant(7, 14, 0), &future_instant(7, 15, 0))
        .await;
    let booking_id = parse_body(created).await["id"].as_str().unwrap().to_string();

    let categories = parse_body(
        app.request(&app.resource_router, "GET", "/categories/", Some(&token), None)
            .await,
    )
    .await;
    let category_id = categories[0]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            &app.tenant_router,
            "DELETE",
            &format!("/tenants/{}", tenant_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(response.status(), 204);

    app.drain_events().await;

    // Every owned entity is gone from every store.
    let user = app
        .request(&app.user_router, "GET", &format!("/users/{}", user_id), Some(&token), None)
        .await;
    assert_eq!(user.status(), 404);

    let category = app
        .request(
            &app.resource_router,
            "GET",
            &format!("/categories/{}", category_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(category.status(), 404);

    let resource = app
        .request(
            &app.resource_router,
            "GET",
            &format!("/resources/{}", resource_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(resource.status(), 404);

    let booking = app
        .request(
            &app.booking_router,
            "GET",
            &format!("/bookings/{}", booking_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(booking.status(), 404);

    let tenant = app
        .request(&app.tenant_router, "GET", &format!("/tenants/{}", tenant_id), None, None)
        .await;
    assert_eq!(tenant.status(), 404);
}

#[tokio::test]
async fn replaying_a_cascade_event_is_idempotent() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Replay Corp", "replay.example.com").await;
    let (_, token) = app.signup_admin(&tenant_id).await;
    let resource_id = app.create_resource(&token).await;

    let created = app
        .create_booking(&token, &resource_id, &future_instant(7, 14, 0), &future_instant(7, 15, 0))
        .await;
    let booking_id = parse_body(created).await["id"].as_str().unwrap().to_string();

    let envelope = EventEnvelope::new(
        kinds::RESOURCE_DELETED,
        json!({ "resource_id": resource_id, "tenant_id": tenant_id }),
        &tenant_id,
    );
    app.fabric.publish(streams::DELETION_EVENTS, &envelope).await.unwrap();
    app.drain_events().await;

    let first_pass = parse_body(
        app.request(
            &app.booking_router,
            "GET",
            &format!("/bookings/{}", booking_id),
            Some(&token),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(first_pass["status"], "cancelado");
    let cancelled_at = first_pass["cancelled_at"].clone();

    // Same event again: the state does not change.
    app.fabric.publish(streams::DELETION_EVENTS, &envelope).await.unwrap();
    app.drain_events().await;

    let second_pass = parse_body(
        app.request(
            &app.booking_router,
            "GET",
            &format!("/bookings/{}", booking_id),
            Some(&token),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(second_pass["status"], "cancelado");
    assert_eq!(second_pass["cancelled_at"], cancelled_at);

    let cancellations = app
        .fabric
        .published(streams::BOOKING_EVENTS)
        .into_iter()
        .filter(|e| e.event_type == kinds::BOOKING_CANCELLED)
        .count();
    assert_eq!(cancellations, 1);
}
