use bike_service_assistant::{
    audit::{InMemoryInteractionLog, InteractionLog, InteractionRecorder},
    config::AppConfig,
    engine::RequestContext,
    AssistantEngine, AssistantReply, AssistantService,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage:
  assistant <message...>
  assistant --estimate <bike_type> <service_type>";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let config = AppConfig::from_env()?;
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }

    let log = Arc::new(InMemoryInteractionLog::new());
    let service = AssistantService::new(
        AssistantEngine::with_router_config(config.router),
        InteractionRecorder::new(log.clone()),
    );
    let ctx = RequestContext::default();

    if args[0] == "--estimate" {
        let (Some(bike), Some(service_type)) = (args.get(1), args.get(2)) else {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        };

        match service.estimate(bike, service_type, &ctx) {
            Some(estimate) => {
                println!("\n=== COST ESTIMATE ===");
                if estimate.applicable {
                    println!("Range: ₹{} - ₹{}", estimate.min, estimate.max);
                } else {
                    println!("Range: not applicable");
                }
                println!("{}", estimate.note);
            }
            None => {
                eprintln!("Unknown bike type '{}' or service type '{}'", bike, service_type);
                std::process::exit(1);
            }
        }
    } else {
        let message = args.join(" ");
        info!(message = %message, "Running assistant");

        match service.chat(&message, &ctx) {
            AssistantReply::Conversation { lines, .. } => {
                println!();
                for line in lines {
                    println!("{}", line);
                }
            }
            AssistantReply::Diagnosis(diagnosis) => {
                let record = diagnosis.record;
                println!("\n=== DIAGNOSIS ===");
                println!("Problem: {}", record.title);
                println!("Urgency: {}", record.urgency);
                println!("Estimated cost: {}", record.cost_range);
                println!("\nPossible causes:");
                for (i, cause) in record.causes.iter().enumerate() {
                    println!("  {}: {}", i + 1, cause);
                }
                println!("\nTip: {}", record.tip);
            }
            AssistantReply::Unrecognized { message } => {
                println!("\n{}", message);
            }
        }
    }

    // let the spawned log write land before reporting
    tokio::task::yield_now().await;
    info!(logged = log.recent(10).await?.len(), "Interaction log");

    Ok(())
}
