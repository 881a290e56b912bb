use std::sync::Arc;

use anyhow::Context;
use core_ltx::{api_socket_addr, setup_logging};
use worker_ltx::service_from_env;

use api_ltx::routes;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    setup_logging("api_ltx=debug,worker_ltx=info,data_model_ltx=info,core_ltx=info,tower_http=debug");

    if let Err(e) = run().await {
        tracing::error!("API server stopped: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let service = Arc::new(service_from_env().await?);
    let app = routes::router(service);

    let addr = api_socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to address: {}", addr))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
