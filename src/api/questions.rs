use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::envelope::{ApiResponse, PagedResponse};
use crate::api::posts::Likes;
use crate::app::AppState;
use crate::db::question_repository::ListQuestionsQuery;
use crate::error::AppError;
use crate::models::question::{InterviewQuestion, QuestionCategory, QuestionStats};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
    pub difficulty: Option<String>,
    #[serde(rename = "type")]
    pub question_type: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub page: Option<u64>,
}

/// `GET /api/questions`
pub async fn list_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PagedResponse<InterviewQuestion>>, AppError> {
    // Blank and zero-valued params mean "absent", like the falsy checks
    // they replace.
    let query = ListQuestionsQuery {
        category: params.category.filter(|s| !s.is_empty()),
        difficulty: params.difficulty.filter(|s| !s.is_empty()),
        question_type: params.question_type.filter(|s| !s.is_empty()),
        search: params.search.filter(|s| !s.is_empty()),
        limit: params.limit.filter(|l| *l > 0).unwrap_or(50),
        page: params.page.unwrap_or(1),
    };
    let (questions, total) = state.questions.list(&query).await?;
    Ok(Json(PagedResponse::new(
        questions,
        query.page,
        query.limit,
        total,
    )))
}

/// Category with display metadata and its active-question count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub count: u64,
}

/// `GET /api/questions/categories`
pub async fn categories_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CategoryEntry>>>, AppError> {
    let counts = state.questions.category_counts().await?;
    let categories = counts
        .into_iter()
        .map(|c| {
            let (name, icon) = QuestionCategory::from_str_ci(&c.id)
                .map(|cat| cat.display())
                // Unknown categories in old data fall back to the raw id.
                .unwrap_or(("", "Code"));
            CategoryEntry {
                name: if name.is_empty() {
                    c.id.clone()
                } else {
                    name.to_string()
                },
                icon: icon.to_string(),
                id: c.id,
                count: c.count,
            }
        })
        .collect();
    Ok(Json(ApiResponse::ok(categories)))
}

/// `GET /api/questions/stats`
pub async fn stats_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<QuestionStats>>, AppError> {
    let stats = state.questions.stats().await?;
    Ok(Json(ApiResponse::ok(stats)))
}

/// `GET /api/questions/{id}`. Increments the view counter as a side effect.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<InterviewQuestion>>, AppError> {
    let id = id
        .parse()
        .map_err(|_| AppError::NotFound("Question not found".to_string()))?;
    let question = state
        .questions
        .find_by_id_and_view(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;
    Ok(Json(ApiResponse::ok(question)))
}

/// `PUT /api/questions/{id}/like`
pub async fn like_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Likes>>, AppError> {
    let id = id
        .parse()
        .map_err(|_| AppError::NotFound("Question not found".to_string()))?;
    let likes = state
        .questions
        .like(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;
    Ok(Json(ApiResponse::ok(Likes { likes })))
}
