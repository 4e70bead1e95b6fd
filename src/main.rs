//! Trip Planner - conversational travel planning agent
//!
//! Collects trip details over a multi-turn chat and produces a day-by-day
//! itinerary from a local city guide.

mod api;
mod config;
mod knowledge;
mod llm;
mod runtime;
mod state_machine;
mod system_prompt;
mod tools;

use api::{create_router, AppState};
use config::AppConfig;
use knowledge::KnowledgeBase;
use llm::{GeminiService, LoggingService};
use runtime::{
    AgentLoop, ConversationManager, InMemoryStore, ServiceLlmClient, ToolRegistryExecutor,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tools::ToolRegistry;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trip_planner=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = AppConfig::from_env()?;

    let knowledge = match &config.knowledge_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading city guides");
            KnowledgeBase::from_path(path)?
        }
        None => KnowledgeBase::builtin(),
    };
    let knowledge = Arc::new(knowledge);
    tracing::info!(cities = ?knowledge.city_names(), "Knowledge base ready");

    let gemini = GeminiService::new(config.gemini())?;
    let llm = LoggingService::new(Arc::new(gemini));
    tracing::info!(model = %config.model, max_cycles = config.max_cycles, "Decision step configured");

    let agent = AgentLoop::new(
        ServiceLlmClient::new(Arc::new(llm)),
        ToolRegistryExecutor::new(ToolRegistry::standard(knowledge.clone())),
        config.loop_config(knowledge.city_names()),
    );
    let manager = ConversationManager::new(InMemoryStore::new(), agent);
    let state = AppState::new(manager, knowledge);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Trip planner listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
