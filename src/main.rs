use sip_tracker::config::AppConfig;
use sip_tracker::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SUPABASE_SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    server::init_tracing("sip_tracker=info,tower_http=info");

    let config = AppConfig::from_env()?;
    tracing::info!(
        "Starting SIP Tracker API in {:?} mode with {:?} storage",
        config.environment,
        config.database.backend
    );

    server::serve(config).await
}
