mod common;

use common::{future_instant, parse_body, TestApp};

#[tokio::test]
async fn overlapping_booking_is_rejected_with_conflict_body() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Conflito Corp", "conflito.example.com").await;
    let (_, token) = app.signup_admin(&tenant_id).await;
    let resource_id = app.create_resource(&token).await;

    let first = app
        .create_booking(&token, &resource_id, &future_instant(7, 14, 0), &future_instant(7, 15, 0))
        .await;
    assert_eq!(first.status(), 201);
    let first_body = parse_body(first).await;
    assert_eq!(first_body["status"], "pendente");
    assert!(first_body["confirmation_code"].as_str().unwrap().len() == 8);

    let second = app
        .create_booking(&token, &resource_id, &future_instant(7, 14, 30), &future_instant(7, 15, 30))
        .await;
    assert_eq!(second.status(), 409);
    let body = parse_body(second).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "conflict");
    assert_eq!(body["conflicts"].as_array().unwrap().len(), 1);
    assert_eq!(body["conflicts"][0]["booking_id"], first_body["id"]);
}

#[tokio::test]
async fn booking_outside_working_hours_is_rejected() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Horario Corp", "horario.example.com").await;
    let (_, token) = app.signup_admin(&tenant_id).await;
    let resource_id = app.create_resource(&token).await;

    // 22:00Z is 19:00 in Sao Paulo, past the 18:00 close.
    let response = app
        .create_booking(&token, &resource_id, &future_instant(7, 22, 0), &future_instant(7, 23, 0))
        .await;
    assert_eq!(response.status(), 422);
    assert_eq!(parse_body(response).await["error"], "validation");
}

#[tokio::test]
async fn duration_must_be_a_multiple_of_the_interval() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Intervalo Corp", "intervalo.example.com").await;
    let (_, token) = app.signup_admin(&tenant_id).await;
    let resource_id = app.create_resource(&token).await;

    let response = app
        .create_booking(&token, &resource_id, &future_instant(7, 14, 0), &future_instant(7, 14, 25))
        .await;
    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn booking_beyond_advance_window_is_rejected() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Antecedencia Corp", "antecedencia.example.com").await;
    let (_, token) = app.signup_admin(&tenant_id).await;
    let resource_id = app.create_resource(&token).await;

    // Default advance window is 30 days.
    let response = app
        .create_booking(&token, &resource_id, &future_instant(45, 14, 0), &future_instant(45, 15, 0))
        .await;
    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn listing_reflects_the_cancellation_window() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Cancelamento Corp", "cancelamento.example.com").await;
    let (_, token) = app.signup_admin(&tenant_id).await;
    let resource_id = app.create_resource(&token).await;

    let response = app
        .create_booking(&token, &resource_id, &future_instant(7, 14, 0), &future_instant(7, 15, 0))
        .await;
    assert_eq!(response.status(), 201);

    let list = app
        .request(&app.booking_router, "GET", "/bookings/", Some(&token), None)
        .await;
    assert_eq!(list.status(), 200);
    let items = parse_body(list).await;
    assert_eq!(items.as_array().unwrap().len(), 1);
    // 7 days out with a 24h window: still cancellable.
    assert_eq!(items[0]["can_cancel"], true);

    // Stretch the window beyond the booking lead time; the flag flips.
    let settings = app
        .request(
            &app.tenant_router,
            "PUT",
            &format!("/tenants/{}/settings", tenant_id),
            Some(&token),
            Some(serde_json::json!({ "cancellation_hours": 10000 })),
        )
        .await;
    assert_eq!(settings.status(), 200);

    let list = app
        .request(&app.booking_router, "GET", "/bookings/", Some(&token), None)
        .await;
    let items = parse_body(list).await;
    assert_eq!(items[0]["can_cancel"], false);
}

#[tokio::test]
async fn cancellation_window_blocks_late_cancels() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Janela Corp", "janela.example.com").await;
    let (_, token) = app.signup_admin(&tenant_id).await;
    let resource_id = app.create_resource(&token).await;

    let created = app
        .create_booking(&token, &resource_id, &future_instant(7, 14, 0), &future_instant(7, 15, 0))
        .await;
    let booking_id = parse_body(created).await["id"].as_str().unwrap().to_string();

    app.request(
        &app.tenant_router,
        "PUT",
        &format!("/tenants/{}/settings", tenant_id),
        Some(&token),
        Some(serde_json::json!({ "cancellation_hours": 10000 })),
    )
    .await;

    let response = app
        .request(
            &app.booking_router,
            "PATCH",
            &format!("/bookings/{}/cancel", booking_id),
            Some(&token),
            Some(serde_json::json!({ "reason": "mudou o plano" })),
        )
        .await;
    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn cancel_and_status_lifecycle() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Ciclo Corp", "ciclo.example.com").await;
    let (_, token) = app.signup_admin(&tenant_id).await;
    let resource_id = app.create_resource(&token).await;

    let created = app
        .create_booking(&token, &resource_id, &future_instant(7, 14, 0), &future_instant(7, 15, 0))
        .await;
    let booking_id = parse_body(created).await["id"].as_str().unwrap().to_string();

    // pendente -> confirmado via the administrative transition.
    let response = app
        .request(
            &app.booking_router,
            "PATCH",
            &format!("/bookings/{}/status?status=confirmado", booking_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(parse_body(response).await["status"], "confirmado");

    // confirmado -> pendente is not a legal transition.
    let response = app
        .request(
            &app.booking_router,
            "PATCH",
            &format!("/bookings/{}/status?status=pendente", booking_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(response.status(), 422);

    let response = app
        .request(
            &app.booking_router,
            "PATCH",
            &format!("/bookings/{}/cancel", booking_id),
            Some(&token),
            Some(serde_json::json!({ "reason": "sala em obras" })),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = parse_body(response).await;
    assert_eq!(body["status"], "cancelado");
    assert_eq!(body["cancellation_reason"], "sala em obras");

    // Cancelled is terminal.
    let response = app
        .request(
            &app.booking_router,
            "PATCH",
            &format!("/bookings/{}/cancel", booking_id),
            Some(&token),
            Some(serde_json::json!({})),
        )
        .await;
    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn reschedule_runs_full_admission_against_other_bookings() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Remarca Corp", "remarca.example.com").await;
    let (_, token) = app.signup_admin(&tenant_id).await;
    let resource_id = app.create_resource(&token).await;

    app.create_booking(&token, &resource_id, &future_instant(7, 14, 0), &future_instant(7, 15, 0))
        .await;
    let second = app
        .create_booking(&token, &resource_id, &future_instant(7, 15, 0), &future_instant(7, 16, 0))
        .await;
    let second_id = parse_body(second).await["id"].as_str().unwrap().to_string();

    // Moving into the occupied interval conflicts.
    let response = app
        .request(
            &app.booking_router,
            "PUT",
            &format!("/bookings/{}", second_id),
            Some(&token),
            Some(serde_json::json!({
                "start_time": future_instant(7, 14, 30),
                "end_time": future_instant(7, 15, 30)
            })),
        )
        .await;
    assert_eq!(response.status(), 409);

    // A notes-only update does not re-run admission and keeps the times.
    let response = app
        .request(
            &app.booking_router,
            "PUT",
            &format!("/bookings/{}", second_id),
            Some(&token),
            Some(serde_json::json!({ "notes": "trazer projetor" })),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = parse_body(response).await;
    assert_eq!(body["notes"], "trazer projetor");
    assert_eq!(body["start_time"].as_str().unwrap(), future_instant(7, 15, 0));
}

#[tokio::test]
async fn single_booking_reads_follow_the_listing_visibility_rule() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Privado Corp", "privado.example.com").await;
    let (_, admin_token) = app.signup_admin(&tenant_id).await;
    let resource_id = app.create_resource(&admin_token).await;

    // Two plain members; the first books, the second should not see it.
    for email in ["fernanda@example.com", "gustavo@example.com"] {
        app.request(
            &app.user_router,
            "POST",
            "/users/",
            None,
            Some(serde_json::json!({
                "tenant_id": tenant_id,
                "name": "Membro",
                "email": email,
                "password": "segredo-123"
            })),
        )
        .await;
    }
    let owner_token = app.login("fernanda@example.com", "segredo-123").await;
    let other_token = app.login("gustavo@example.com", "segredo-123").await;

    let created = app
        .create_booking(&owner_token, &resource_id, &future_instant(7, 14, 0), &future_instant(7, 15, 0))
        .await;
    assert_eq!(created.status(), 201);
    let booking_id = parse_body(created).await["id"].as_str().unwrap().to_string();
    let uri = format!("/bookings/{}", booking_id);

    let owner = app.request(&app.booking_router, "GET", &uri, Some(&owner_token), None).await;
    assert_eq!(owner.status(), 200);

    let other = app.request(&app.booking_router, "GET", &uri, Some(&other_token), None).await;
    assert_eq!(other.status(), 403);

    let admin = app.request(&app.booking_router, "GET", &uri, Some(&admin_token), None).await;
    assert_eq!(admin.status(), 200);
}

#[tokio::test]
async fn naive_timestamps_are_read_in_tenant_local_time() {
    let app = TestApp::new().await;
    let tenant_id = app.create_tenant("Local Corp", "local.example.com").await;
    let (_, token) = app.signup_admin(&tenant_id).await;
    let resource_id = app.create_resource(&token).await;

    // 11:00 naive local in Sao Paulo is 14:00Z.
    let date = (chrono::Utc::now() + chrono::Duration::days(7)).date_naive();
    let response = app
        .create_booking(
            &token,
            &resource_id,
            &format!("{}T11:00:00", date),
            &format!("{}T12:00:00", date),
        )
        .await;
    assert_eq!(response.status(), 201);
    let body = parse_body(response).await;
    assert_eq!(body["start_time"].as_str().unwrap(), format!("{}T14:00:00Z", date));
}
