use log::{error, info};
use recipe_extract::server::{router, AppState};
use recipe_extract::{extract_and_enrich, scrape, AppConfig};
use serde_json::json;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let client = match scrape::build_client(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // With a URL argument, run one extraction and print the result;
    // otherwise serve the HTTP endpoint.
    let args: Vec<String> = env::args().collect();
    match args.get(1) {
        Some(url) => run_once(&client, &config, url).await,
        None => serve(config, client).await,
    }
}

/// One-shot CLI mode, for local testing outside the HTTP server.
async fn run_once(client: &reqwest::Client, config: &AppConfig, url: &str) -> ExitCode {
    match extract_and_enrich(client, config, url).await {
        Ok(recipe) => {
            println!("{}", json!({"success": true, "data": recipe}));
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}", json!({"success": false, "error": e.to_string()}));
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: AppConfig, client: reqwest::Client) -> ExitCode {
    let bind_addr = config.bind_addr.clone();
    let app = router(Arc::new(AppState { config, client }));

    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", bind_addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("Listening on http://{}", bind_addr);
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
