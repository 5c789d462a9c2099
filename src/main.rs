use attendo::{
    config::{database, locations},
    core::break_slot::reconcile_break_counts,
    errors::Result,
};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file. Non-fatal, env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the location configuration
    let config = locations::load_default_config()
        .inspect(|c| info!("Loaded {} location(s) from configuration.", c.locations.len()))
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect and make sure the schema exists. The default database lives under ./data
    std::fs::create_dir_all("data")?;
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed configured locations and their schedules
    locations::seed_locations(&db, &config)
        .await
        .inspect_err(|e| error!("Failed to seed locations: {}", e))?;

    // 6. Heal break counters left behind by a crash
    let corrected = reconcile_break_counts(&db)
        .await
        .inspect_err(|e| error!("Failed to reconcile break counters: {}", e))?;
    info!(corrected, "attendo is ready");

    Ok(())
}
