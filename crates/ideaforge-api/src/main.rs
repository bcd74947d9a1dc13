use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ideaforge_api::{
    auth::AuthService,
    config::Config,
    routes::{assistants, auth, generate, health, threads, trending},
    state::AppState,
};
use ideaforge_engine::GenerationEngine;
use ideaforge_llm::{ChatClient, GeminiClient, OpenAIClient, Summarizer};
use ideaforge_persist::{seed_assistants, PersistClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting IdeaForge API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    // Model gateways. Gemini drives generation; OpenAI drives thread chat and
    // delegates summarization back to Gemini.
    let gemini = Arc::new(
        GeminiClient::new(config.gemini_api_key.clone()).with_model(config.llm.gemini_model.clone()),
    );
    let openai = Arc::new(
        OpenAIClient::new(config.openai_api_key.clone())
            .with_model(config.llm.openai_model.clone())
            .with_summary_delegate(gemini.clone()),
    );

    tracing::info!("Connecting to MongoDB");
    let persist = PersistClient::connect(&config.mongodb_uri, &config.mongodb.database).await?;
    tracing::info!("MongoDB connected");

    seed_assistants(persist.assistants()).await?;

    let engine = GenerationEngine::new(
        persist.assistants().clone(),
        persist.threads().clone(),
        persist.messages().clone(),
        gemini.clone() as Arc<dyn ChatClient>,
        openai.clone() as Arc<dyn ChatClient>,
        openai.clone() as Arc<dyn Summarizer>,
    );

    let auth_service = AuthService::new(
        persist.users().clone(),
        &config.jwt_secret,
        config.auth.token_ttl_hours,
    );

    let state = Arc::new(AppState::new(config.clone(), persist, engine, auth_service));

    let app = build_router(state.clone());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Assistants
        .route("/assistants", get(assistants::list_assistants))
        // Generation lifecycle
        .route("/generate", post(generate::generate_content))
        .route("/generate/:thread_id", get(generate::get_thread))
        .route("/generate/:thread_id/refine", post(generate::refine_content))
        .route("/generate/:thread_id/save", post(generate::save_idea))
        .route("/generate/:thread_id/share", post(generate::share_idea))
        .route("/generate/:thread_id/chat", post(generate::chat_with_card))
        .route(
            "/generate/:thread_id/chat/:card_id",
            get(generate::get_card_chat_history),
        )
        // Threads
        .route("/threads", get(threads::list_threads))
        .route(
            "/threads/:thread_id/messages",
            get(threads::list_messages).post(threads::send_message),
        )
        // Trending
        .route("/trending", get(trending::get_trending_ideas));

    Router::new()
        .merge(api_routes)
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(120)))
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let mut cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors = cors.allow_origin(Any);
        } else {
            for origin in &config.cors.origins {
                if let Ok(parsed_origin) = origin.parse::<axum::http::HeaderValue>() {
                    cors = cors.allow_origin(parsed_origin);
                }
            }
        }

        cors
    } else {
        CorsLayer::permissive()
    }
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
