mod common;

use common::{parse_body, TestApp};
use reserva_backend::domain::ports::Cache;
use reserva_backend::domain::services::settings::settings_cache_key;
use serde_json::json;

#[tokio::test]
async fn tenant_crud_and_domain_uniqueness() {
    let app = TestApp::new().await;

    let response = app
        .request(
            &app.tenant_router,
            "POST",
            "/tenants/",
            None,
            Some(json!({ "name": "Clinica Sol", "domain": "sol.example.com", "plan": "profissional" })),
        )
        .await;
    assert_eq!(response.status(), 201);
    let tenant = parse_body(response).await;
    assert_eq!(tenant["plan"], "profissional");
    assert_eq!(tenant["is_active"], true);
    let tenant_id = tenant["id"].as_str().unwrap().to_string();

    // The same domain cannot be registered twice.
    let duplicate = app
        .request(
            &app.tenant_router,
            "POST",
            "/tenants/",
            None,
            Some(json!({ "name": "Clon", "domain": "sol.example.com" })),
        )
        .await;
    assert_eq!(duplicate.status(), 400);

    let listed = app.request(&app.tenant_router, "GET", "/tenants/", None, None).await;
    assert_eq!(listed.status(), 200);
    assert_eq!(parse_body(listed).await.as_array().unwrap().len(), 1);

    // Updates are admin-of-tenant only.
    let (_, token) = app.signup_admin(&tenant_id).await;
    let response = app
        .request(
            &app.tenant_router,
            "PUT",
            &format!("/tenants/{}", tenant_id),
            Some(&token),
            Some(json!({ "name": "Clinica Sol e Lua" })),
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(parse_body(response).await["name"], "Clinica Sol e Lua");

    let anonymous = app
        .request(
            &app.tenant_router,
            "PUT",
            &format!("/tenants/{}", tenant_id),
            None,
            Some(json!({ "name": "invasor" })),
        )
        .await;
    assert_eq!(anonymous.status(), 401);
}

#[tokio::test]
async fn settings_are_tenant_admin_scoped_and_update_invalidates_cache() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Ajuste Corp", "ajuste.example.com").await;
    let other_tenant = app.create_tenant("Outro Corp", "outro.example.com").await;
    let (_, token) = app.signup_admin(&tenant_id).await;
    let (_, other_token) = app.signup_admin(&other_tenant).await;

    let response = app
        .request(
            &app.tenant_router,
            "GET",
            &format!("/tenants/{}/settings", tenant_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);
    let settings = parse_body(response).await;
    assert_eq!(settings["booking_interval"], 30);
    assert_eq!(settings["timezone"], "America/Sao_Paulo");

    // Cross-tenant admins are denied outright.
    let response = app
        .request(
            &app.tenant_router,
            "GET",
            &format!("/tenants/{}/settings", tenant_id),
            Some(&other_token),
            None,
        )
        .await;
    assert_eq!(response.status(), 403);

    // Warm the settings cache through the booking path, then update.
    let resource_id = app.create_resource(&token).await;
    app.create_booking(
        &token,
        &resource_id,
        &common::future_instant(7, 14, 0),
        &common::future_instant(7, 15, 0),
    )
    .await;
    assert!(app.cache.get(&settings_cache_key(&tenant_id)).await.is_some());

    let response = app
        .request(
            &app.tenant_router,
            "PUT",
            &format!("/tenants/{}/settings", tenant_id),
            Some(&token),
            Some(json!({ "booking_interval": 60, "working_hours_end": "17:00" })),
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(parse_body(response).await["booking_interval"], 60);
    assert!(app.cache.get(&settings_cache_key(&tenant_id)).await.is_none());

    // Nonsense policies are refused.
    let response = app
        .request(
            &app.tenant_router,
            "PUT",
            &format!("/tenants/{}/settings", tenant_id),
            Some(&token),
            Some(json!({ "working_hours_start": "19:00" })),
        )
        .await;
    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn webhook_registration_validates_urls() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Gancho Corp", "gancho.example.com").await;
    let (_, token) = app.signup_admin(&tenant_id).await;

    let response = app
        .request(
            &app.tenant_router,
            "POST",
            &format!("/tenants/{}/webhooks", tenant_id),
            Some(&token),
            Some(json!({
                "url": "http://example.com/hook",
                "events": ["booking.created"]
            })),
        )
        .await;
    assert_eq!(response.status(), 422);

    let response = app
        .request(
            &app.tenant_router,
            "POST",
            &format!("/tenants/{}/webhooks", tenant_id),
            Some(&token),
            Some(json!({
                "url": "https://hooks.example.com/reservas",
                "events": ["booking.created", "booking.cancelled"],
                "secret": "segredo-webhook"
            })),
        )
        .await;
    assert_eq!(response.status(), 201);
    let webhook = parse_body(response).await;
    assert!(webhook.get("secret").is_none());
    let webhook_id = webhook["id"].as_str().unwrap().to_string();

    let listed = app
        .request(
            &app.tenant_router,
            "GET",
            &format!("/tenants/{}/webhooks", tenant_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(parse_body(listed).await.as_array().unwrap().len(), 1);

    let response = app
        .request(
            &app.tenant_router,
            "PUT",
            &format!("/tenants/{}/webhooks/{}", tenant_id, webhook_id),
            Some(&token),
            Some(json!({ "is_active": false })),
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(parse_body(response).await["is_active"], false);

    let response = app
        .request(
            &app.tenant_router,
            "DELETE",
            &format!("/tenants/{}/webhooks/{}", tenant_id, webhook_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(response.status(), 204);
}

#[tokio::test]
async fn health_and_ready_answer() {
    let app = TestApp::new().await;
    for router in [&app.tenant_router, &app.user_router, &app.resource_router, &app.booking_router] {
        let health = app.request(router, "GET", "/health", None, None).await;
        assert_eq!(health.status(), 200);
        let ready = app.request(router, "GET", "/ready", None, None).await;
        assert_eq!(ready.status(), 200);
    }
}
