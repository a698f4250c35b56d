use std::sync::Arc;

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use startup_architect::api::{self, AppState};
use startup_architect::config::AppConfig;
use startup_architect::llm::GroqClient;
use startup_architect::tools::DuckDuckGoSearch;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("startup_architect=info,tower_http=info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        model = %config.crew.llm.model,
        max_rpm = ?config.crew.max_rpm,
        max_iter = config.crew.max_iter,
        search_chars = config.search.max_chars,
        "Configuration loaded"
    );

    let llm = GroqClient::new(config.groq.clone()).expect("Failed to build LLM client");
    let search = DuckDuckGoSearch::new(config.search.endpoint.clone(), config.search.max_chars)
        .expect("Failed to build search tool");
    let state = AppState::new(config.crew.clone(), Arc::new(llm), Arc::new(search));

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = api::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    tracing::info!("Server listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .await
        .expect("Server failed");
}
