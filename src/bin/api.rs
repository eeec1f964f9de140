use bike_service_assistant::{
    api::start_server,
    audit::{build_interaction_log, InteractionRecorder},
    config::AppConfig,
    AssistantEngine, AssistantService,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    info!("🏍️  Bike Service Assistant - API Server");
    info!("📍 Port: {}", config.port);
    info!("💬 Thanks threshold: {} chars", config.router.thanks_max_chars);

    // Create components
    let log = build_interaction_log(config.database_url.as_deref());
    let recorder = InteractionRecorder::new(log);
    let engine = AssistantEngine::with_router_config(config.router.clone());
    let service = AssistantService::new(engine, recorder);

    info!("✅ Assistant initialized");
    info!("📡 Starting API server...");

    // Start API server
    start_server(service, config.port).await?;

    Ok(())
}
