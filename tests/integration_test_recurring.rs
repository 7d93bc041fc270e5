mod common;

use common::{future_monday, parse_body, TestApp};
use serde_json::json;

fn monday_instant(date: chrono::NaiveDate, hour: u32, minute: u32) -> String {
    format!("{}T{:02}:{:02}:00Z", date, hour, minute)
}

#[tokio::test]
async fn weekly_recurrence_creates_the_whole_batch() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Semanal Corp", "semanal.example.com").await;
    let (_, token) = app.signup_admin(&tenant_id).await;
    let resource_id = app.create_resource(&token).await;

    let first_monday = future_monday(2);
    let end_date = first_monday + chrono::Duration::days(15);

    let response = app
        .request(
            &app.booking_router,
            "POST",
            "/bookings/",
            Some(&token),
            Some(json!({
                "resource_id": resource_id,
                "start_time": monday_instant(first_monday, 14, 0),
                "end_time": monday_instant(first_monday, 15, 0),
                "recurring_enabled": true,
                "recurring_pattern": {
                    "frequency": "weekly",
                    "interval": 1,
                    "days_of_week": [0],
                    "end_date": format!("{}T23:59:59Z", end_date)
                }
            })),
        )
        .await;
    assert_eq!(response.status(), 201);

    let body = parse_body(response).await;
    let occurrences = body.as_array().expect("recurring create returns the batch");
    assert_eq!(occurrences.len(), 3);

    let group_id = occurrences[0]["recurrence_group_id"].as_str().unwrap();
    assert!(occurrences.iter().all(|b| b["recurrence_group_id"] == group_id));
    assert!(occurrences.iter().all(|b| b["recurring_enabled"] == true));
}

#[tokio::test]
async fn recurrence_batch_is_all_or_nothing() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Atomico Corp", "atomico.example.com").await;
    let (_, token) = app.signup_admin(&tenant_id).await;
    let resource_id = app.create_resource(&token).await;

    let first_monday = future_monday(2);
    let third_monday = first_monday + chrono::Duration::days(14);

    // A conflicting booking already sits on the third occurrence.
    let blocker = app
        .create_booking(
            &token,
            &resource_id,
            &monday_instant(third_monday, 14, 0),
            &monday_instant(third_monday, 15, 0),
        )
        .await;
    assert_eq!(blocker.status(), 201);

    let response = app
        .request(
            &app.booking_router,
            "POST",
            "/bookings/",
            Some(&token),
            Some(json!({
                "resource_id": resource_id,
                "start_time": monday_instant(first_monday, 14, 0),
                "end_time": monday_instant(first_monday, 15, 0),
                "recurring_enabled": true,
                "recurring_pattern": {
                    "frequency": "weekly",
                    "interval": 1,
                    "days_of_week": [0],
                    "end_date": format!("{}T23:59:59Z", first_monday + chrono::Duration::days(22))
                }
            })),
        )
        .await;
    assert_eq!(response.status(), 409);

    // None of the four occurrences was persisted.
    let list = app
        .request(&app.booking_router, "GET", "/bookings/", Some(&token), None)
        .await;
    let items = parse_body(list).await;
    assert_eq!(items.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn recurring_create_requires_a_pattern() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Padrao Corp", "padrao.example.com").await;
    let (_, token) = app.signup_admin(&tenant_id).await;
    let resource_id = app.create_resource(&token).await;

    let first_monday = future_monday(2);
    let response = app
        .request(
            &app.booking_router,
            "POST",
            "/bookings/",
            Some(&token),
            Some(json!({
                "resource_id": resource_id,
                "start_time": monday_instant(first_monday, 14, 0),
                "end_time": monday_instant(first_monday, 15, 0),
                "recurring_enabled": true
            })),
        )
        .await;
    assert_eq!(response.status(), 400);
}
