mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{
    create_app_user, create_tenant_account, generate_unique_email, generate_unique_tenant_name,
    get_auth_token, setup_test_app, setup_test_app_without_tenant_enforcement,
};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

async fn get_me(
    app: &axum::Router,
    token: &str,
    tenant_header: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder()
        .method("GET")
        .uri("/me")
        .header("authorization", format!("Bearer {}", token));
    if let Some(tenant) = tenant_header {
        builder = builder.header("x-tenant-id", tenant);
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[sqlx::test(migrations = "./migrations")]
async fn test_scoped_role_without_header_forbidden(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let tenant = create_tenant_account(
        &mut tx,
        &generate_unique_tenant_name(),
        &generate_unique_email(),
        "rootpass123",
    )
    .await;
    let email = generate_unique_email();
    create_app_user(&mut tx, &email, "testpass123", "agent", Some(tenant.id)).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool).await;
    let token = get_auth_token(&app, &email, "testpass123").await;

    let (status, body) = get_me(&app, &token, None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Tenant header required. Provide X-Tenant-Id.");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_scoped_role_with_wrong_header_forbidden(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let tenant = create_tenant_account(
        &mut tx,
        &generate_unique_tenant_name(),
        &generate_unique_email(),
        "rootpass123",
    )
    .await;
    let email = generate_unique_email();
    create_app_user(&mut tx, &email, "testpass123", "agent", Some(tenant.id)).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool).await;
    let token = get_auth_token(&app, &email, "testpass123").await;

    let (status, body) = get_me(&app, &token, Some(&Uuid::new_v4().to_string())).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["error"],
        "Tenant mismatch. Provide correct X-Tenant-Id header."
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_scoped_role_with_matching_header_passes(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let tenant = create_tenant_account(
        &mut tx,
        &generate_unique_tenant_name(),
        &generate_unique_email(),
        "rootpass123",
    )
    .await;
    let email = generate_unique_email();
    create_app_user(&mut tx, &email, "testpass123", "agent", Some(tenant.id)).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool).await;
    let token = get_auth_token(&app, &email, "testpass123").await;

    let (status, body) = get_me(&app, &token, Some(&tenant.id.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["email"], email);
    assert_eq!(body["role"], "agent");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_malformed_header_counts_as_missing(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let tenant = create_tenant_account(
        &mut tx,
        &generate_unique_tenant_name(),
        &generate_unique_email(),
        "rootpass123",
    )
    .await;
    let email = generate_unique_email();
    create_app_user(&mut tx, &email, "testpass123", "reviewer", Some(tenant.id)).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool).await;
    let token = get_auth_token(&app, &email, "testpass123").await;

    let (status, body) = get_me(&app, &token, Some("not-a-uuid")).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Tenant header required. Provide X-Tenant-Id.");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_without_header_passes(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let tenant = create_tenant_account(
        &mut tx,
        &generate_unique_tenant_name(),
        &generate_unique_email(),
        "rootpass123",
    )
    .await;
    let email = generate_unique_email();
    create_app_user(&mut tx, &email, "testpass123", "admin", Some(tenant.id)).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool).await;
    let token = get_auth_token(&app, &email, "testpass123").await;

    let (status, body) = get_me(&app, &token, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_superadmin_without_header_passes(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let email = generate_unique_email();
    create_app_user(&mut tx, &email, "testpass123", "superadmin", None).await;
    tx.commit().await.unwrap();

    let app = setup_test_app(pool).await;
    let token = get_auth_token(&app, &email, "testpass123").await;

    let (status, body) = get_me(&app, &token, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "superadmin");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_tenant_root_without_header_passes(pool: PgPool) {
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
    let token = get_auth_token(&app, &tenant.email, "rootpass123").await;

    let (status, body) = get_me(&app, &token, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "tenant");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_enforcement_off_scoped_role_passes_without_header(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let tenant = create_tenant_account(
        &mut tx,
        &generate_unique_tenant_name(),
        &generate_unique_email(),
        "rootpass123",
    )
    .await;
    let email = generate_unique_email();
    create_app_user(&mut tx, &email, "testpass123", "agent", Some(tenant.id)).await;
    tx.commit().await.unwrap();

    let app = setup_test_app_without_tenant_enforcement(pool).await;
    let token = get_auth_token(&app, &email, "testpass123").await;

    let (status, body) = get_me(&app, &token, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "agent");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_me_without_token_unauthorized(pool: PgPool) {
    let app = setup_test_app(pool).await;

    let request = Request::builder()
        .method("GET")
        .uri("/me")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_me_with_garbage_token_unauthorized(pool: PgPool) {
    let app = setup_test_app(pool).await;

    let request = Request::builder()
        .method("GET")
        .uri("/me")
        .header("authorization", "Bearer not.a.token")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
