//! Fire event pipeline worker binary.

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ftrace_worker::{schedule, FireProcessor, WorkerConfig};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("ftrace=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting ftrace-worker");

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let processor = match FireProcessor::from_env(&config) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to wire pipeline processor: {}", e);
            std::process::exit(1);
        }
    };

    let run_once = config.run_once || std::env::args().any(|a| a == "--once");
    if run_once {
        let outcome = processor.run_now().await;
        match serde_json::to_string(&outcome) {
            Ok(json) => println!("{}", json),
            Err(e) => error!("Failed to serialize outcome: {}", e),
        }
        if !outcome.success {
            std::process::exit(1);
        }
    } else {
        schedule::run_loop(&processor, &config.run_times).await;
    }

    info!("Worker shutdown complete");
}
