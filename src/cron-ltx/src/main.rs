use std::time::Duration;

use core_ltx::{TimeUnit, api_base_url, poll_interval, setup_logging};

const HTTP_TIMEOUT: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() {
    // Load environment variables from .env file, if it exists
    dotenvy::dotenv().ok();

    setup_logging("cron_ltx=debug");

    if let Err(e) = run().await {
        tracing::error!("Cron service failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let poll_interval = poll_interval(TimeUnit::Seconds, "CRON_POLL_INTERVAL_S", 3600)?;
    let api_base_url = api_base_url()?;
    let host = std::env::var("CRON_HOST_OVERRIDE").ok().filter(|h| !h.trim().is_empty());

    // Generating every site can take a while.
    let http_client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

    tracing::info!(
        "Cron service started, regenerating via {} every {:?}",
        api_base_url,
        poll_interval
    );

    let mut ticker = tokio::time::interval(poll_interval);
    loop {
        ticker.tick().await;
        tracing::info!("Starting regeneration cycle");

        match cron_ltx::trigger_generation(&http_client, &api_base_url, host.as_deref()).await {
            Ok(summary) => tracing::info!(
                "Regenerated {} site(s) at {}: {} artifact(s), {} changed",
                summary.sites.len(),
                summary.generated_at,
                summary.artifacts,
                summary.changed
            ),
            Err(e) => tracing::error!("Regeneration cycle failed: {}", e),
        }
    }
}
