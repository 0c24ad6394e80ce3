use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::envelope::ApiResponse;
use crate::app::AppState;
use crate::error::AppError;

/// Home-page headline numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeStats {
    pub interview_questions: String,
    pub tech_articles: String,
    pub ai_support: String,
    pub raw_counts: RawCounts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCounts {
    pub questions: u64,
    pub articles: u64,
}

/// Display rule: the literal count, unless it exceeds the threshold, in
/// which case `"<threshold>+"`.
fn format_count(count: u64, threshold: u64) -> String {
    if count > threshold {
        format!("{threshold}+")
    } else {
        count.to_string()
    }
}

/// `GET /api/stats/home`
pub async fn home_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<HomeStats>>, AppError> {
    let questions = state.questions.count_active().await?;
    let articles = state.posts.count_published().await?;

    Ok(Json(ApiResponse::ok(HomeStats {
        interview_questions: format_count(questions, 500),
        tech_articles: format_count(articles, 100),
        // A service feature, not a measurement.
        ai_support: "24/7".to_string(),
        raw_counts: RawCounts {
            questions,
            articles,
        },
    })))
}
