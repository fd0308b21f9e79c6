mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{
    create_app_user, create_license, create_tenant_account, generate_unique_email,
    generate_unique_tenant_name, get_auth_token, setup_test_app,
};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn superadmin_token(pool: &PgPool, app: &axum::Router) -> String {
    let mut tx = pool.begin().await.unwrap();
    let email = generate_unique_email();
    create_app_user(&mut tx, &email, "superpass123", "superadmin", None).await;
    tx.commit().await.unwrap();

    get_auth_token(app, &email, "superpass123").await
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_licenses(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let tenant = create_tenant_account(
        &mut tx,
        &generate_unique_tenant_name(),
        &generate_unique_email(),
        "rootpass123",
    )
    .await;
    create_license(&mut tx, tenant.id, "admin", 11, 2, true).await;
    create_license(&mut tx, tenant.id, "agent", 100, 0, true).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = superadmin_token(&pool, &app).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/licenses/{}", tenant.id),
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let licenses = body.as_array().unwrap();
    assert_eq!(licenses.len(), 2);
    assert_eq!(licenses[0]["role"], "admin");
    assert_eq!(licenses[0]["maxUsers"], 11);
    assert_eq!(licenses[0]["usedUsers"], 2);
    assert_eq!(licenses[0]["active"], true);
    assert_eq!(licenses[1]["role"], "agent");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_licenses_unknown_tenant_is_empty(pool: PgPool) {
    let app = setup_test_app(pool.clone()).await;
    let token = superadmin_token(&pool, &app).await;

    let (status, body) = send(
        &app,
        "GET",
        &format!("/licenses/{}", Uuid::new_v4()),
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_licenses_require_superadmin(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let tenant = create_tenant_account(
        &mut tx,
        &generate_unique_tenant_name(),
        &generate_unique_email(),
        "rootpass123",
    )
    .await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool).await;

    let (status, _) = send(&app, "GET", &format!("/licenses/{}", tenant.id), None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let root_token = get_auth_token(&app, &tenant.email, "rootpass123").await;
    let (status, body) = send(
        &app,
        "GET",
        &format!("/licenses/{}", tenant.id),
        Some(&root_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Forbidden: insufficient role");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_licenses(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let tenant = create_tenant_account(
        &mut tx,
        &generate_unique_tenant_name(),
        &generate_unique_email(),
        "rootpass123",
    )
    .await;
    create_license(&mut tx, tenant.id, "admin", 11, 3, true).await;
    create_license(&mut tx, tenant.id, "agent", 100, 0, true).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = superadmin_token(&pool, &app).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/licenses/{}", tenant.id),
        Some(&token),
        Some(json!({"licenses": {"admin": 25, "agent": 50}})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["msg"], "Licenses updated");

    let updated = body["licenses"].as_array().unwrap();
    assert_eq!(updated.len(), 2);
    assert_eq!(updated[0]["role"], "admin");
    assert_eq!(updated[0]["maxUsers"], 25);
    // Seats in use survive a quota change.
    assert_eq!(updated[0]["usedUsers"], 3);
    assert_eq!(updated[1]["role"], "agent");
    assert_eq!(updated[1]["maxUsers"], 50);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_licenses_role_is_case_insensitive(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let tenant = create_tenant_account(
        &mut tx,
        &generate_unique_tenant_name(),
        &generate_unique_email(),
        "rootpass123",
    )
    .await;
    create_license(&mut tx, tenant.id, "admin", 11, 0, true).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = superadmin_token(&pool, &app).await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/licenses/{}", tenant.id),
        Some(&token),
        Some(json!({"licenses": {"Admin": 30}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let max = sqlx::query_scalar::<_, i32>(
        "SELECT max_users FROM tenant_licenses WHERE tenant_id = $1 AND role = 'admin'",
    )
    .bind(tenant.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(max, 30);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_licenses_unknown_role(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let tenant = create_tenant_account(
        &mut tx,
        &generate_unique_tenant_name(),
        &generate_unique_email(),
        "rootpass123",
    )
    .await;
    create_license(&mut tx, tenant.id, "admin", 11, 0, true).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = superadmin_token(&pool, &app).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/licenses/{}", tenant.id),
        Some(&token),
        Some(json!({"licenses": {"marketing": 5}})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "License not found for role: marketing");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_licenses_empty_map_rejected(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let tenant = create_tenant_account(
        &mut tx,
        &generate_unique_tenant_name(),
        &generate_unique_email(),
        "rootpass123",
    )
    .await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = superadmin_token(&pool, &app).await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/licenses/{}", tenant.id),
        Some(&token),
        Some(json!({"licenses": {}})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_raised_quota_frees_seats_for_creation(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let tenant = create_tenant_account(
        &mut tx,
        &generate_unique_tenant_name(),
        &generate_unique_email(),
        "rootpass123",
    )
    .await;
    create_license(&mut tx, tenant.id, "admin", 1, 1, true).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool.clone()).await;
    let token = superadmin_token(&pool, &app).await;
    let root_token = get_auth_token(&app, &tenant.email, "rootpass123").await;

    let payload = json!({
        "email": generate_unique_email(),
        "password": "userpass123",
        "userName": "Second Admin",
        "role": "admin"
    });

    let (status, body) = send(
        &app,
        "POST",
        "/register/user",
        Some(&root_token),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "admin license limit exceeded");

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/licenses/{}", tenant.id),
        Some(&token),
        Some(json!({"licenses": {"admin": 2}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "POST", "/register/user", Some(&root_token), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
}
