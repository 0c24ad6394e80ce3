use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::api::envelope::{ApiResponse, PagedResponse};
use crate::app::AppState;
use crate::db::post_repository::ListPostsQuery;
use crate::error::AppError;
use crate::models::post::{BlogPost, CreatePost, PostCounter, UpdatePost};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub page: Option<u64>,
}

impl ListParams {
    fn into_query(self, paginate_browse: bool) -> ListPostsQuery {
        // Blank and zero-valued params mean "absent", like the falsy
        // checks they replace.
        ListPostsQuery {
            category: self.category.filter(|s| !s.is_empty()),
            search: self.search.filter(|s| !s.is_empty()),
            limit: self.limit.filter(|l| *l > 0).unwrap_or(20),
            page: self.page.unwrap_or(1),
            paginate_browse,
        }
    }
}

/// `GET /api/blogs`
pub async fn list_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PagedResponse<BlogPost>>, AppError> {
    let query = params.into_query(state.paginate_browse);
    let (posts, total) = state.posts.list(&query).await?;
    Ok(Json(PagedResponse::new(
        posts,
        query.page,
        query.limit,
        total,
    )))
}

/// `GET /api/blogs/featured`
pub async fn featured_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<BlogPost>>, AppError> {
    let post = state
        .posts
        .find_featured()
        .await?
        .ok_or_else(|| AppError::NotFound("No featured post found".to_string()))?;
    Ok(Json(ApiResponse::ok(post)))
}

/// `GET /api/blogs/trending`
pub async fn trending_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BlogPost>>>, AppError> {
    let posts = state.posts.find_trending(5).await?;
    Ok(Json(ApiResponse::ok(posts)))
}

/// Category with its published-post count, for the sidebar listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub id: String,
    pub name: String,
    pub count: u64,
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// `GET /api/blogs/categories`
pub async fn categories_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CategoryEntry>>>, AppError> {
    let counts = state.posts.category_counts().await?;
    let categories = counts
        .into_iter()
        .map(|c| CategoryEntry {
            name: capitalize(&c.id),
            id: c.id,
            count: c.count,
        })
        .collect();
    Ok(Json(ApiResponse::ok(categories)))
}

/// `GET /api/blogs/trending-topics`
pub async fn trending_topics_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<crate::db::post_repository::TopicCount>>>, AppError> {
    let topics = state.posts.trending_topics(10).await?;
    Ok(Json(ApiResponse::ok(topics)))
}

/// `GET /api/blogs/{slug}`. Increments the view counter as a side effect.
pub async fn get_by_slug_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<BlogPost>>, AppError> {
    let post = state
        .posts
        .find_by_slug_and_view(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Blog post not found".to_string()))?;
    Ok(Json(ApiResponse::ok(post)))
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CounterBody {
    #[serde(default = "default_increment")]
    pub increment: bool,
}

fn default_increment() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Likes {
    pub likes: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Bookmarks {
    pub bookmarks: i64,
}

fn parse_object_id(raw: &str, what: &str) -> Result<ObjectId, AppError> {
    // A malformed id cannot resolve to a record, so it is a plain 404.
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("{what} not found")))
}

/// `PUT /api/blogs/{id}/like`
pub async fn like_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<CounterBody>>,
) -> Result<Json<ApiResponse<Likes>>, AppError> {
    let id = parse_object_id(&id, "Blog post")?;
    let increment = body.map(|Json(b)| b.increment).unwrap_or(true);
    let likes = state
        .posts
        .adjust_counter(id, PostCounter::Likes, increment)
        .await?
        .ok_or_else(|| AppError::NotFound("Blog post not found".to_string()))?;
    Ok(Json(ApiResponse::ok(Likes { likes })))
}

/// `PUT /api/blogs/{id}/bookmark`
pub async fn bookmark_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Json<CounterBody>>,
) -> Result<Json<ApiResponse<Bookmarks>>, AppError> {
    let id = parse_object_id(&id, "Blog post")?;
    let increment = body.map(|Json(b)| b.increment).unwrap_or(true);
    let bookmarks = state
        .posts
        .adjust_counter(id, PostCounter::Bookmarks, increment)
        .await?
        .ok_or_else(|| AppError::NotFound("Blog post not found".to_string()))?;
    Ok(Json(ApiResponse::ok(Bookmarks { bookmarks })))
}

/// `POST /api/blogs`
pub async fn create_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreatePost>,
) -> Result<(StatusCode, Json<ApiResponse<BlogPost>>), AppError> {
    let post = payload.into_post().map_err(AppError::BadRequest)?;
    let saved = state.posts.create(post).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            saved,
            "Blog post created successfully",
        )),
    ))
}

/// `PUT /api/blogs/{id}`
pub async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePost>,
) -> Result<Json<ApiResponse<BlogPost>>, AppError> {
    let id = parse_object_id(&id, "Blog post")?;
    let updated = state
        .posts
        .update(id, payload)
        .await?
        .ok_or_else(|| AppError::NotFound("Blog post not found".to_string()))?;
    Ok(Json(ApiResponse::ok_with_message(
        updated,
        "Blog post updated successfully",
    )))
}

/// `DELETE /api/blogs/{id}`
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BlogPost>>, AppError> {
    let id = parse_object_id(&id, "Blog post")?;
    let deleted = state
        .posts
        .delete(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Blog post not found".to_string()))?;
    Ok(Json(ApiResponse::ok_with_message(
        deleted,
        "Blog post deleted successfully",
    )))
}
