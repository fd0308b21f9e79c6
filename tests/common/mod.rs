use axum::body::Body;
use axum::http::Request;
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};
use tenauth::config::cors::CorsConfig;
use tenauth::config::email::EmailConfig;
use tenauth::config::jwt::JwtConfig;
use tenauth::config::rate_limit::RateLimitConfig;
use tenauth::config::tenancy::TenancyConfig;
use tenauth::config::two_factor::TwoFactorConfig;
use tenauth::router::init_router;
use tenauth::state::AppState;
use tenauth::utils::password::hash_password;
use tower::ServiceExt;
use uuid::Uuid;

/// Code every test challenge is issued with, via `TwoFactorConfig::fixed_code`.
pub const TEST_CODE: &str = "123456";

/// Well-known system role IDs (must match migration)
#[allow(dead_code)]
pub mod system_roles {
    use uuid::Uuid;
    pub const SUPERADMIN: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000001);
    pub const TENANT: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000002);
    pub const ADMIN: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000003);
    pub const AGENT: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000004);
    pub const AUDITOR: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000005);
    pub const REVIEWER: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000006);
}

#[allow(dead_code)]
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub tenant_id: Option<Uuid>,
}

#[allow(dead_code)]
pub struct TestTenant {
    pub id: Uuid,
    pub account_name: String,
    pub email: String,
    pub password: String,
}

/// App state with SMTP off and a fixed two-factor code, so tests can
/// complete the login flow without a mailbox.
pub fn test_state(pool: PgPool) -> AppState {
    AppState {
        db: pool,
        jwt_config: JwtConfig {
            secret: "test-secret-key-for-integration-tests".to_string(),
            token_expiry: 3600,
        },
        email_config: EmailConfig {
            enabled: false,
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@tenauth.com".to_string(),
            from_name: "TenAuth".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
        },
        two_factor_config: TwoFactorConfig {
            fixed_code: Some(TEST_CODE.to_string()),
            ..TwoFactorConfig::default()
        },
        tenancy_config: TenancyConfig {
            enforce_tenant_header: true,
        },
        cors_config: CorsConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        rate_limit_config: RateLimitConfig::default(),
    }
}

pub async fn setup_test_app(pool: PgPool) -> axum::Router {
    init_router(test_state(pool))
}

#[allow(dead_code)]
pub async fn setup_test_app_without_tenant_enforcement(pool: PgPool) -> axum::Router {
    let mut state = test_state(pool);
    state.tenancy_config.enforce_tenant_header = false;
    init_router(state)
}

/// Create an app user with the given role slug.
/// role should be one of: "superadmin", "admin", "agent", "auditor", "reviewer"
pub async fn create_app_user(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    password: &str,
    role: &str,
    tenant_id: Option<Uuid>,
) -> TestUser {
    let hashed = hash_password(password).unwrap();

    let role_id = match role {
        "superadmin" => system_roles::SUPERADMIN,
        "tenant" => system_roles::TENANT,
        "admin" => system_roles::ADMIN,
        "agent" => system_roles::AGENT,
        "auditor" => system_roles::AUDITOR,
        "reviewer" => system_roles::REVIEWER,
        _ => panic!("Invalid role: {}", role),
    };

    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO app_users (email, password, user_name, enabled, role_id, tenant_id)
        VALUES ($1, $2, $3, TRUE, $4, $5)
        RETURNING id
        "#,
    )
    .bind(email)
    .bind(&hashed)
    .bind("Test User")
    .bind(role_id)
    .bind(tenant_id)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    TestUser {
        id,
        email: email.to_string(),
        password: password.to_string(),
        tenant_id,
    }
}

/// Create a tenant account with root login credentials.
pub async fn create_tenant_account(
    tx: &mut Transaction<'_, Postgres>,
    account_name: &str,
    email: &str,
    password: &str,
) -> TestTenant {
    let hashed = hash_password(password).unwrap();

    let id = sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO tenant_accounts (account_name, email, password, official_email)
        VALUES ($1, $2, $3, $2)
        RETURNING id
        "#,
    )
    .bind(account_name)
    .bind(email)
    .bind(&hashed)
    .fetch_one(&mut **tx)
    .await
    .unwrap();

    TestTenant {
        id,
        account_name: account_name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
    }
}

/// Create a seat license row for one role of a tenant.
#[allow(dead_code)]
pub async fn create_license(
    tx: &mut Transaction<'_, Postgres>,
    tenant_id: Uuid,
    role: &str,
    max_users: i32,
    used_users: i32,
    active: bool,
) -> Uuid {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO tenant_licenses (tenant_id, role, max_users, used_users, active)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(tenant_id)
    .bind(role)
    .bind(max_users)
    .bind(used_users)
    .bind(active)
    .fetch_one(&mut **tx)
    .await
    .unwrap()
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

#[allow(dead_code)]
pub fn generate_unique_tenant_name() -> String {
    format!("Tenant {}", Uuid::new_v4())
}

/// Run the full two-step login and return the issued JWT.
pub async fn get_auth_token(app: &axum::Router, email: &str, password: &str) -> String {
    let challenge_id = start_login(app, email, password).await;

    let request = Request::builder()
        .method("POST")
        .uri("/auth/2fa/verify")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "challengeId": challenge_id,
                "code": TEST_CODE
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.status(),
        axum::http::StatusCode::OK,
        "two-factor verification failed during test login"
    );

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    body["token"].as_str().unwrap().to_string()
}

/// Submit credentials and return the challenge id from the login response.
pub async fn start_login(app: &axum::Router, email: &str, password: &str) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": email,
                "password": password
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.status(),
        axum::http::StatusCode::OK,
        "login failed during test setup"
    );

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    body["challengeId"].as_str().unwrap().to_string()
}
