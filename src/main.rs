use std::sync::Arc;

use techpath::app::AppState;
use techpath::config::AppConfig;
use techpath::db::post_repository::MongoPostRepository;
use techpath::db::question_repository::MongoQuestionRepository;
use techpath::genai::client::GeminiClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "techpath=info,tower_http=info".into()),
        )
        .init();

    tracing::info!("Starting TechPath server...");

    let config = AppConfig::from_env()?;

    // Connect to MongoDB
    let mongo_client = mongodb::Client::with_uri_str(&config.mongodb_uri).await?;
    let db = mongo_client.database(&config.mongodb_database);

    tracing::info!("Connected to MongoDB at {}", config.mongodb_uri);

    let state = AppState {
        posts: Arc::new(MongoPostRepository::new(&db)),
        questions: Arc::new(MongoQuestionRepository::new(&db)),
        chat: Arc::new(GeminiClient::new(config.gemini_api_key.clone())),
        paginate_browse: config.paginate_browse,
    };

    let app = techpath::app::router(state);

    tracing::info!("Listening on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
