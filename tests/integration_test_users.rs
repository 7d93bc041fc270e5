mod common;

use common::{parse_body, TestApp};
use serde_json::json;

#[tokio::test]
async fn signup_login_and_me_round_trip() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Conta Corp", "conta.example.com").await;

    let response = app
        .request(
            &app.user_router,
            "POST",
            "/users/",
            None,
            Some(json!({
                "tenant_id": tenant_id,
                "name": "Beatriz",
                "email": "bia@example.com",
                "password": "segredo-123"
            })),
        )
        .await;
    assert_eq!(response.status(), 201);
    let body = parse_body(response).await;
    assert_eq!(body["user_type"], "user");
    assert_eq!(body["permissions"]["can_book"], true);
    assert_eq!(body["permissions"]["can_manage_users"], false);
    assert!(body.get("password_hash").is_none());

    let token = app.login("bia@example.com", "segredo-123").await;
    let me = app
        .request(&app.user_router, "GET", "/users/me", Some(&token), None)
        .await;
    assert_eq!(me.status(), 200);
    assert_eq!(parse_body(me).await["email"], "bia@example.com");
}

#[tokio::test]
async fn email_is_unique_per_tenant_but_not_across_tenants() {
    let app = TestApp::new().await;
    let tenant_a = app.create_tenant("A Corp", "a.example.com").await;
    let tenant_b = app.create_tenant("B Corp", "b.example.com").await;

    let payload = |tenant: &str| {
        json!({
            "tenant_id": tenant,
            "name": "Carlos",
            "email": "carlos@example.com",
            "password": "segredo-123"
        })
    };

    let first = app
        .request(&app.user_router, "POST", "/users/", None, Some(payload(&tenant_a)))
        .await;
    assert_eq!(first.status(), 201);

    let duplicate = app
        .request(&app.user_router, "POST", "/users/", None, Some(payload(&tenant_a)))
        .await;
    assert_eq!(duplicate.status(), 400);

    let other_tenant = app
        .request(&app.user_router, "POST", "/users/", None, Some(payload(&tenant_b)))
        .await;
    assert_eq!(other_tenant.status(), 201);
}

#[tokio::test]
async fn signup_rejects_unknown_tenants_and_bad_credentials_fail_login() {
    let app = TestApp::new().await;

    let response = app
        .request(
            &app.user_router,
            "POST",
            "/users/",
            None,
            Some(json!({
                "tenant_id": "00000000-0000-0000-0000-000000000000",
                "name": "Ninguem",
                "email": "x@example.com",
                "password": "segredo-123"
            })),
        )
        .await;
    assert_eq!(response.status(), 422);

    let tenant_id = app.create_tenant("Login Corp", "login.example.com").await;
    app.signup_admin(&tenant_id).await;

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/users/login")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(axum::body::Body::from("email=nao-existe@example.com&password=errada"))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.user_router.clone(), request).await.unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn listing_users_requires_an_admin_of_that_tenant() {
    let app = TestApp::new().await;
    let tenant_a = app.create_tenant("Iso A", "iso-a.example.com").await;
    let tenant_b = app.create_tenant("Iso B", "iso-b.example.com").await;
    let (_, admin_a) = app.signup_admin(&tenant_a).await;
    app.signup_admin(&tenant_b).await;

    // Admin of A cannot list B, regardless of role.
    let response = app
        .request(
            &app.user_router,
            "GET",
            &format!("/users/?tenant_id={}", tenant_b),
            Some(&admin_a),
            None,
        )
        .await;
    assert_eq!(response.status(), 403);

    // A plain member of A cannot list A either.
    app.request(
        &app.user_router,
        "POST",
        "/users/",
        None,
        Some(json!({
            "tenant_id": tenant_a,
            "name": "Membro",
            "email": "membro@example.com",
            "password": "segredo-123"
        })),
    )
    .await;
    let member_token = app.login("membro@example.com", "segredo-123").await;
    let response = app
        .request(
            &app.user_router,
            "GET",
            &format!("/users/?tenant_id={}", tenant_a),
            Some(&member_token),
            None,
        )
        .await;
    assert_eq!(response.status(), 403);

    // The admin of A can.
    let response = app
        .request(
            &app.user_router,
            "GET",
            &format!("/users/?tenant_id={}", tenant_a),
            Some(&admin_a),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(parse_body(response).await.as_array().unwrap().len(), 2);

    // Missing bearer is unauthenticated, not forbidden.
    let response = app
        .request(
            &app.user_router,
            "GET",
            &format!("/users/?tenant_id={}", tenant_a),
            None,
            None,
        )
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn permission_changes_are_admin_only() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Perm Corp", "perm.example.com").await;
    let (_, admin_token) = app.signup_admin(&tenant_id).await;

    let created = app
        .request(
            &app.user_router,
            "POST",
            "/users/",
            None,
            Some(json!({
                "tenant_id": tenant_id,
                "name": "Davi",
                "email": "davi@example.com",
                "password": "segredo-123"
            })),
        )
        .await;
    let user_id = parse_body(created).await["id"].as_str().unwrap().to_string();
    let member_token = app.login("davi@example.com", "segredo-123").await;

    // Self-escalation is denied.
    let response = app
        .request(
            &app.user_router,
            "PUT",
            &format!("/users/{}", user_id),
            Some(&member_token),
            Some(json!({ "permissions": { "can_manage_resources": true } })),
        )
        .await;
    assert_eq!(response.status(), 403);

    // The admin can grant it.
    let response = app
        .request(
            &app.user_router,
            "PUT",
            &format!("/users/{}", user_id),
            Some(&admin_token),
            Some(json!({ "permissions": { "can_manage_resources": true } })),
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(parse_body(response).await["permissions"]["can_manage_resources"], true);

    // Self-service profile edits still work.
    let response = app
        .request(
            &app.user_router,
            "PUT",
            &format!("/users/{}", user_id),
            Some(&member_token),
            Some(json!({ "phone": "+55 11 99999-0000" })),
        )
        .await;
    assert_eq!(response.status(), 200);
}
