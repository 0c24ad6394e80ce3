use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::db::post_repository::PostRepository;
use crate::db::question_repository::QuestionRepository;
use crate::genai::client::GenerativeClient;

#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub chat: Arc<dyn GenerativeClient>,
    /// See `AppConfig::paginate_browse`.
    pub paginate_browse: bool,
}

/// Build the Axum router with every API route wired to the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/blogs",
            get(api::posts::list_handler).post(api::posts::create_handler),
        )
        .route("/api/blogs/featured", get(api::posts::featured_handler))
        .route("/api/blogs/trending", get(api::posts::trending_handler))
        .route("/api/blogs/categories", get(api::posts::categories_handler))
        .route(
            "/api/blogs/trending-topics",
            get(api::posts::trending_topics_handler),
        )
        // GET matches by slug; PUT/DELETE match by id. Same route entry, the
        // handlers parse the segment the way they need it.
        .route(
            "/api/blogs/{key}",
            get(api::posts::get_by_slug_handler)
                .put(api::posts::update_handler)
                .delete(api::posts::delete_handler),
        )
        .route("/api/blogs/{key}/like", put(api::posts::like_handler))
        .route(
            "/api/blogs/{key}/bookmark",
            put(api::posts::bookmark_handler),
        )
        .route("/api/questions", get(api::questions::list_handler))
        .route(
            "/api/questions/categories",
            get(api::questions::categories_handler),
        )
        .route("/api/questions/stats", get(api::questions::stats_handler))
        .route("/api/questions/{id}", get(api::questions::get_handler))
        .route(
            "/api/questions/{id}/like",
            put(api::questions::like_handler),
        )
        .route("/api/stats/home", get(api::stats::home_handler))
        .route("/api/chat", post(api::chat::chat_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
