use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use warp::Filter;

mod agents;
mod api;
mod config;
mod error;
mod llm;
mod metrics;
mod middleware;
mod models;
mod pipeline;
mod report;
mod session;
mod tasks;
mod tools;

use agents::{AgentSettings, TravelAgents};
use llm::{HttpLlmClient, HttpLlmClientConfig};
use pipeline::{Coordinator, SequentialCrew};
use session::SessionStore;
use tools::{HttpSearchClient, HttpSearchConfig, SearchWebTool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = config::Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!("Starting AI travel planner");
    if config.llm_api_key.is_none() {
        tracing::warn!("no language model API key configured; runs will fail at the first stage");
    }
    if config.search_api_key.is_none() {
        tracing::warn!("no search API key configured; search calls will be rejected upstream");
    }

    let llm = HttpLlmClient::new(HttpLlmClientConfig {
        endpoint: config.llm_endpoint.clone(),
        api_key: config.llm_api_key.clone(),
        timeout_secs: config.llm_timeout_secs,
    })
    .context("failed to build language model client")?;

    let search = HttpSearchClient::new(HttpSearchConfig {
        endpoint: config.search_endpoint.clone(),
        api_key: config.search_api_key.clone(),
        timeout_secs: config.llm_timeout_secs,
    })
    .context("failed to build search client")?;

    let agents = TravelAgents::new(
        Arc::new(llm),
        SearchWebTool::new(Arc::new(search), config.search_max_results),
        AgentSettings {
            model: config.llm_model.clone(),
            temperature: config.llm_temperature,
            max_tool_rounds: config.max_tool_rounds,
        },
    );
    info!(model = %config.llm_model, "Travel agents ready");

    let app = api::AppState {
        coordinator: Coordinator::new(Arc::new(SequentialCrew::new(agents))),
        sessions: SessionStore::new(Duration::from_secs(config.session_ttl_secs)),
        pages: Arc::new(api::Pages::new().context("failed to load page templates")?),
    };

    // Health check route
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({"status": "healthy"})));

    // Metrics route
    let metrics = warp::path("metrics").and(warp::get()).map(|| {
        let (buffer, content_type) = metrics::render();
        warp::reply::with_header(buffer, "Content-Type", content_type)
    });

    let routes = health
        .or(metrics)
        .or(api::routes(app))
        .with(warp::log("trip_planner"))
        .recover(error::handle_rejection);

    // Start server
    let addr = ([0, 0, 0, 0], config.port);
    info!("Server listening on {}", addr.1);

    warp::serve(routes).run(addr).await;

    Ok(())
}
