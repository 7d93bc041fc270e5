mod common;

use common::{future_instant, parse_body, TestApp};
use serde_json::json;

#[tokio::test]
async fn resource_writes_require_the_management_permission() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Gestor Corp", "gestor.example.com").await;
    let (_, admin_token) = app.signup_admin(&tenant_id).await;

    app.request(
        &app.user_router,
        "POST",
        "/users/",
        None,
        Some(json!({
            "tenant_id": tenant_id,
            "name": "Eva",
            "email": "eva@example.com",
            "password": "segredo-123"
        })),
    )
    .await;
    let member_token = app.login("eva@example.com", "segredo-123").await;

    let category = app
        .request(
            &app.resource_router,
            "POST",
            "/categories/",
            Some(&admin_token),
            Some(json!({ "name": "Salas" })),
        )
        .await;
    let category_id = parse_body(category).await["id"].as_str().unwrap().to_string();

    let payload = json!({
        "category_id": category_id,
        "name": "Sala restrita",
        "availability_schedule": { "monday": ["08:00-12:00"] }
    });

    let denied = app
        .request(&app.resource_router, "POST", "/resources/", Some(&member_token), Some(payload.clone()))
        .await;
    assert_eq!(denied.status(), 403);

    let allowed = app
        .request(&app.resource_router, "POST", "/resources/", Some(&admin_token), Some(payload))
        .await;
    assert_eq!(allowed.status(), 201);
}

#[tokio::test]
async fn malformed_schedules_and_unknown_categories_are_rejected() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Valida Corp", "valida.example.com").await;
    let (_, token) = app.signup_admin(&tenant_id).await;

    let response = app
        .request(
            &app.resource_router,
            "POST",
            "/resources/",
            Some(&token),
            Some(json!({
                "category_id": "00000000-0000-0000-0000-000000000000",
                "name": "Sem categoria",
                "availability_schedule": { "monday": ["08:00-12:00"] }
            })),
        )
        .await;
    assert_eq!(response.status(), 422);

    let category = app
        .request(
            &app.resource_router,
            "POST",
            "/categories/",
            Some(&token),
            Some(json!({ "name": "Salas" })),
        )
        .await;
    let category_id = parse_body(category).await["id"].as_str().unwrap().to_string();

    // End before start inside a window.
    let response = app
        .request(
            &app.resource_router,
            "POST",
            "/resources/",
            Some(&token),
            Some(json!({
                "category_id": category_id,
                "name": "Janela invertida",
                "availability_schedule": { "monday": ["12:00-08:00"] }
            })),
        )
        .await;
    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn bookings_on_unavailable_resources_are_refused() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Manutencao Corp", "manutencao.example.com").await;
    let (_, token) = app.signup_admin(&tenant_id).await;
    let resource_id = app.create_resource(&token).await;

    let response = app
        .request(
            &app.resource_router,
            "PUT",
            &format!("/resources/{}", resource_id),
            Some(&token),
            Some(json!({ "status": "manutencao" })),
        )
        .await;
    assert_eq!(response.status(), 200);

    let response = app
        .create_booking(&token, &resource_id, &future_instant(7, 14, 0), &future_instant(7, 15, 0))
        .await;
    assert_eq!(response.status(), 422);

    // Availability is equally refused while under maintenance.
    let date = (chrono::Utc::now() + chrono::Duration::days(7)).date_naive();
    let response = app
        .request(
            &app.resource_router,
            "GET",
            &format!("/resources/{}/availability?data={}", resource_id, date),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn bookings_must_fit_the_resource_schedule() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Agenda Corp", "agenda.example.com").await;
    let (_, token) = app.signup_admin(&tenant_id).await;

    let category = app
        .request(
            &app.resource_router,
            "POST",
            "/categories/",
            Some(&token),
            Some(json!({ "name": "Salas" })),
        )
        .await;
    let category_id = parse_body(category).await["id"].as_str().unwrap().to_string();

    // Mornings only (09:00-12:00 local).
    let window = ["09:00-12:00"];
    let response = app
        .request(
            &app.resource_router,
            "POST",
            "/resources/",
            Some(&token),
            Some(json!({
                "category_id": category_id,
                "name": "Sala matinal",
                "availability_schedule": {
                    "monday": window, "tuesday": window, "wednesday": window,
                    "thursday": window, "friday": window, "saturday": window,
                    "sunday": window
                }
            })),
        )
        .await;
    let resource_id = parse_body(response).await["id"].as_str().unwrap().to_string();

    // 17:00Z is 14:00 local, inside working hours but outside the schedule.
    let response = app
        .create_booking(&token, &resource_id, &future_instant(7, 17, 0), &future_instant(7, 18, 0))
        .await;
    assert_eq!(response.status(), 422);

    // 13:00Z is 10:00 local, inside the morning window.
    let response = app
        .create_booking(&token, &resource_id, &future_instant(7, 13, 0), &future_instant(7, 14, 0))
        .await;
    assert_eq!(response.status(), 201);
}

#[tokio::test]
async fn cross_tenant_resource_access_is_denied() {
    let app = TestApp::new().await;
    let tenant_a = app.create_tenant("Res A", "res-a.example.com").await;
    let tenant_b = app.create_tenant("Res B", "res-b.example.com").await;
    let (_, token_a) = app.signup_admin(&tenant_a).await;
    let (_, token_b) = app.signup_admin(&tenant_b).await;

    let resource_a = app.create_resource(&token_a).await;

    let response = app
        .request(
            &app.resource_router,
            "GET",
            &format!("/resources/{}", resource_a),
            Some(&token_b),
            None,
        )
        .await;
    assert_eq!(response.status(), 403);

    // Booking another tenant's resource fails admission.
    let response = app
        .create_booking(&token_b, &resource_a, &future_instant(7, 14, 0), &future_instant(7, 15, 0))
        .await;
    assert_eq!(response.status(), 422);
}
