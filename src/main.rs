use dotenvy::dotenv;
use tenauth::db::{run_migrations, seed_superadmin_from_env};
use tenauth::logging::init_tracing;
use tenauth::metrics::{init_metrics, metrics_app};
use tenauth::router::init_router;
use tenauth::state::init_app_state;

#[tokio::main]
async fn main() {
    dotenv().ok();

    init_tracing();

    let state = init_app_state().await;

    run_migrations(&state.db).await;
    seed_superadmin_from_env(&state.db).await;

    // Prometheus scrapes a separate port so /metrics never rides the API router
    if let Some(handle) = init_metrics() {
        let metrics_router = metrics_app(handle);
        tokio::spawn(async move {
            let listener = tokio::net::TcpListener::bind("0.0.0.0:3001")
                .await
                .expect("Failed to bind metrics port");
            println!("📊 Metrics available at http://localhost:3001/metrics");
            axum::serve(listener, metrics_router)
                .await
                .expect("Metrics server failed");
        });
    }

    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    println!("🚀 Server running on http://localhost:3000");
    println!("📚 Swagger UI available at http://localhost:3000/swagger-ui");
    println!("📖 Scalar UI available at http://localhost:3000/scalar");
    axum::serve(listener, app).await.unwrap();
}
