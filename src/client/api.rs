use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::api::chat::{ChatRequest, ChatResponse};
use crate::api::envelope::{ApiResponse, PagedResponse};
use crate::api::posts::{Bookmarks, CategoryEntry as PostCategoryEntry, CounterBody, Likes};
use crate::api::questions::CategoryEntry as QuestionCategoryEntry;
use crate::api::stats::HomeStats;
use crate::db::post_repository::TopicCount;
use crate::models::post::{BlogPost, CreatePost, UpdatePost};
use crate::models::question::{InterviewQuestion, QuestionStats};

/// Failure while talking to the backend.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with its error envelope.
    #[error("{message} (status {status})")]
    Api { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
    error: Option<String>,
}

/// Typed client for the TechPath REST API.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

/// Filters accepted by the list endpoints; every field is optional.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub question_type: Option<String>,
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub page: Option<u64>,
}

impl ListFilter {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(v) = &self.category {
            pairs.push(("category", v.clone()));
        }
        if let Some(v) = &self.difficulty {
            pairs.push(("difficulty", v.clone()));
        }
        if let Some(v) = &self.question_type {
            pairs.push(("type", v.clone()));
        }
        if let Some(v) = &self.search {
            pairs.push(("search", v.clone()));
        }
        if let Some(v) = self.limit {
            pairs.push(("limit", v.to_string()));
        }
        if let Some(v) = self.page {
            pairs.push(("page", v.to_string()));
        }
        pairs
    }
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn decode<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let message = response
            .json::<ErrorEnvelope>()
            .await
            .ok()
            .and_then(|e| e.message.or(e.error))
            .unwrap_or_else(|| status.to_string());
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .query(query)
            .send()
            .await?;
        Self::decode(response).await
    }

    // --- Blog posts ---

    pub async fn list_posts(
        &self,
        filter: &ListFilter,
    ) -> Result<PagedResponse<BlogPost>, ClientError> {
        self.get("/api/blogs", &filter.query()).await
    }

    pub async fn featured_post(&self) -> Result<ApiResponse<BlogPost>, ClientError> {
        self.get("/api/blogs/featured", &[]).await
    }

    pub async fn trending_posts(&self) -> Result<ApiResponse<Vec<BlogPost>>, ClientError> {
        self.get("/api/blogs/trending", &[]).await
    }

    pub async fn post_categories(
        &self,
    ) -> Result<ApiResponse<Vec<PostCategoryEntry>>, ClientError> {
        self.get("/api/blogs/categories", &[]).await
    }

    pub async fn trending_topics(&self) -> Result<ApiResponse<Vec<TopicCount>>, ClientError> {
        self.get("/api/blogs/trending-topics", &[]).await
    }

    pub async fn post_by_slug(&self, slug: &str) -> Result<ApiResponse<BlogPost>, ClientError> {
        self.get(&format!("/api/blogs/{slug}"), &[]).await
    }

    pub async fn toggle_post_like(
        &self,
        id: &str,
        increment: bool,
    ) -> Result<ApiResponse<Likes>, ClientError> {
        let response = self
            .http
            .put(format!("{}/api/blogs/{id}/like", self.base_url))
            .json(&CounterBody { increment })
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn toggle_post_bookmark(
        &self,
        id: &str,
        increment: bool,
    ) -> Result<ApiResponse<Bookmarks>, ClientError> {
        let response = self
            .http
            .put(format!("{}/api/blogs/{id}/bookmark", self.base_url))
            .json(&CounterBody { increment })
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn create_post(
        &self,
        payload: &CreatePost,
    ) -> Result<ApiResponse<BlogPost>, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/blogs", self.base_url))
            .json(payload)
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn update_post(
        &self,
        id: &str,
        payload: &UpdatePost,
    ) -> Result<ApiResponse<BlogPost>, ClientError> {
        let response = self
            .http
            .put(format!("{}/api/blogs/{id}", self.base_url))
            .json(payload)
            .send()
            .await?;
        Self::decode(response).await
    }

    pub async fn delete_post(&self, id: &str) -> Result<ApiResponse<BlogPost>, ClientError> {
        let response = self
            .http
            .delete(format!("{}/api/blogs/{id}", self.base_url))
            .send()
            .await?;
        Self::decode(response).await
    }

    // --- Interview questions ---

    pub async fn list_questions(
        &self,
        filter: &ListFilter,
    ) -> Result<PagedResponse<InterviewQuestion>, ClientError> {
        self.get("/api/questions", &filter.query()).await
    }

    pub async fn question_categories(
        &self,
    ) -> Result<ApiResponse<Vec<QuestionCategoryEntry>>, ClientError> {
        self.get("/api/questions/categories", &[]).await
    }

    pub async fn question_stats(&self) -> Result<ApiResponse<QuestionStats>, ClientError> {
        self.get("/api/questions/stats", &[]).await
    }

    pub async fn question(&self, id: &str) -> Result<ApiResponse<InterviewQuestion>, ClientError> {
        self.get(&format!("/api/questions/{id}"), &[]).await
    }

    pub async fn like_question(&self, id: &str) -> Result<ApiResponse<Likes>, ClientError> {
        let response = self
            .http
            .put(format!("{}/api/questions/{id}/like", self.base_url))
            .send()
            .await?;
        Self::decode(response).await
    }

    // --- Misc ---

    pub async fn home_stats(&self) -> Result<ApiResponse<HomeStats>, ClientError> {
        self.get("/api/stats/home", &[]).await
    }

    pub async fn chat(&self, message: &str) -> Result<ChatResponse, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&ChatRequest {
                message: Some(message.to_string()),
            })
            .send()
            .await?;
        Self::decode(response).await
    }
}
