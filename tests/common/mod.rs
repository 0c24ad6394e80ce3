use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::{Duration, Utc};

use techpath::app::{router, AppState};
use techpath::db::post_repository::{
    CategoryCount, ListPostsQuery, PostRepository, TopicCount,
};
use techpath::db::question_repository::{ListQuestionsQuery, QuestionRepository};
use techpath::error::{AppError, ChatError};
use techpath::genai::client::GenerativeClient;
use techpath::models::post::{BlogPost, PostCounter, UpdatePost};
use techpath::models::question::{
    BucketCount, CategoryViewCount, Difficulty, InterviewQuestion, QuestionCategory,
    QuestionDigest, QuestionStats, QuestionType,
};

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// In-memory PostRepository mirroring the MongoDB query semantics.
#[derive(Default)]
pub struct MemoryPostRepository {
    pub posts: Mutex<Vec<BlogPost>>,
}

impl MemoryPostRepository {
    fn matches(post: &BlogPost, query: &ListPostsQuery) -> bool {
        if !post.is_published {
            return false;
        }
        if let Some(category) = query.category.as_deref() {
            if category != "all" && post.category.as_str() != category {
                return false;
            }
        }
        if let Some(search) = query.search.as_deref() {
            let hit = contains_ci(&post.title, search)
                || contains_ci(&post.excerpt, search)
                || contains_ci(&post.author.name, search)
                || post.tags.iter().any(|t| contains_ci(t, search));
            if !hit {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn list(&self, query: &ListPostsQuery) -> Result<(Vec<BlogPost>, u64), AppError> {
        let posts = self.posts.lock().unwrap();
        let mut matched: Vec<BlogPost> = posts
            .iter()
            .filter(|p| Self::matches(p, query))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        let total = matched.len() as u64;
        let page: Vec<BlogPost> = matched
            .into_iter()
            .skip(query.skip() as usize)
            .take(query.limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn find_featured(&self) -> Result<Option<BlogPost>, AppError> {
        let posts = self.posts.lock().unwrap();
        Ok(posts
            .iter()
            .filter(|p| p.is_featured && p.is_published)
            .max_by_key(|p| p.published_at)
            .cloned())
    }

    async fn find_trending(&self, limit: i64) -> Result<Vec<BlogPost>, AppError> {
        let posts = self.posts.lock().unwrap();
        let mut trending: Vec<BlogPost> = posts
            .iter()
            .filter(|p| p.is_trending && p.is_published)
            .cloned()
            .collect();
        trending.sort_by(|a, b| {
            b.views
                .cmp(&a.views)
                .then(b.published_at.cmp(&a.published_at))
        });
        trending.truncate(limit.max(0) as usize);
        Ok(trending)
    }

    async fn category_counts(&self) -> Result<Vec<CategoryCount>, AppError> {
        let posts = self.posts.lock().unwrap();
        let mut counts: Vec<CategoryCount> = Vec::new();
        for post in posts.iter().filter(|p| p.is_published) {
            let id = post.category.as_str().to_string();
            match counts.iter_mut().find(|c| c.id == id) {
                Some(entry) => entry.count += 1,
                None => counts.push(CategoryCount { id, count: 1 }),
            }
        }
        counts.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(counts)
    }

    async fn trending_topics(&self, limit: i64) -> Result<Vec<TopicCount>, AppError> {
        let posts = self.posts.lock().unwrap();
        let mut topics: Vec<TopicCount> = Vec::new();
        for post in posts.iter().filter(|p| p.is_published) {
            for tag in &post.tags {
                match topics.iter_mut().find(|t| &t.name == tag) {
                    Some(entry) => entry.posts += 1,
                    None => topics.push(TopicCount {
                        name: tag.clone(),
                        posts: 1,
                    }),
                }
            }
        }
        topics.sort_by(|a, b| b.posts.cmp(&a.posts));
        topics.truncate(limit.max(0) as usize);
        Ok(topics)
    }

    async fn find_by_slug_and_view(&self, slug: &str) -> Result<Option<BlogPost>, AppError> {
        let mut posts = self.posts.lock().unwrap();
        for post in posts.iter_mut() {
            if post.slug == slug && post.is_published {
                post.views += 1;
                return Ok(Some(post.clone()));
            }
        }
        Ok(None)
    }

    async fn adjust_counter(
        &self,
        id: ObjectId,
        counter: PostCounter,
        increment: bool,
    ) -> Result<Option<i64>, AppError> {
        let mut posts = self.posts.lock().unwrap();
        for post in posts.iter_mut() {
            if post.id == Some(id) && post.is_published {
                let slot = match counter {
                    PostCounter::Likes => &mut post.likes,
                    PostCounter::Bookmarks => &mut post.bookmarks,
                };
                *slot = if increment {
                    *slot + 1
                } else {
                    (*slot - 1).max(0)
                };
                return Ok(Some(*slot));
            }
        }
        Ok(None)
    }

    async fn create(&self, mut post: BlogPost) -> Result<BlogPost, AppError> {
        post.id = Some(ObjectId::new());
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn update(
        &self,
        id: ObjectId,
        update: UpdatePost,
    ) -> Result<Option<BlogPost>, AppError> {
        use techpath::models::post::slugify;

        let mut posts = self.posts.lock().unwrap();
        for post in posts.iter_mut() {
            if post.id == Some(id) {
                if let Some(title) = update.title {
                    post.slug = slugify(&title);
                    post.title = title;
                }
                if let Some(content) = update.content {
                    post.content = content;
                }
                if let Some(excerpt) = update.excerpt {
                    post.excerpt = excerpt;
                }
                if let Some(category) = update.category {
                    post.category = category;
                }
                if let Some(author) = update.author {
                    post.author = author.normalize();
                }
                if let Some(tags) = update.tags {
                    post.tags = tags.into_iter().map(|t| t.to_lowercase()).collect();
                }
                if let Some(is_published) = update.is_published {
                    post.is_published = is_published;
                }
                if let Some(is_featured) = update.is_featured {
                    post.is_featured = is_featured;
                }
                if let Some(is_trending) = update.is_trending {
                    post.is_trending = is_trending;
                }
                post.last_modified = Utc::now();
                post.updated_at = Utc::now();
                return Ok(Some(post.clone()));
            }
        }
        Ok(None)
    }

    async fn delete(&self, id: ObjectId) -> Result<Option<BlogPost>, AppError> {
        let mut posts = self.posts.lock().unwrap();
        let index = posts.iter().position(|p| p.id == Some(id));
        Ok(index.map(|i| posts.remove(i)))
    }

    async fn count_published(&self) -> Result<u64, AppError> {
        let posts = self.posts.lock().unwrap();
        Ok(posts.iter().filter(|p| p.is_published).count() as u64)
    }
}

/// In-memory QuestionRepository mirroring the MongoDB query semantics.
#[derive(Default)]
pub struct MemoryQuestionRepository {
    pub questions: Mutex<Vec<InterviewQuestion>>,
}

impl MemoryQuestionRepository {
    fn matches(question: &InterviewQuestion, query: &ListQuestionsQuery) -> bool {
        if !question.is_active {
            return false;
        }
        if let Some(category) = query.category.as_deref() {
            if category != "all" && question.category.as_str() != category {
                return false;
            }
        }
        if let Some(difficulty) = query.difficulty.as_deref() {
            let current = serde_json::to_value(question.difficulty).unwrap();
            if current != difficulty {
                return false;
            }
        }
        if let Some(question_type) = query.question_type.as_deref() {
            let current = serde_json::to_value(question.question_type).unwrap();
            if current != question_type {
                return false;
            }
        }
        if let Some(search) = query.search.as_deref() {
            let hit = contains_ci(&question.question, search)
                || contains_ci(&question.answer, search)
                || question.tags.iter().any(|t| contains_ci(t, search));
            if !hit {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl QuestionRepository for MemoryQuestionRepository {
    async fn list(
        &self,
        query: &ListQuestionsQuery,
    ) -> Result<(Vec<InterviewQuestion>, u64), AppError> {
        let questions = self.questions.lock().unwrap();
        let mut matched: Vec<InterviewQuestion> = questions
            .iter()
            .filter(|q| Self::matches(q, query))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            b.popular
                .cmp(&a.popular)
                .then(b.views.cmp(&a.views))
                .then(b.created_at.cmp(&a.created_at))
        });

        let total = matched.len() as u64;
        let page: Vec<InterviewQuestion> = matched
            .into_iter()
            .skip(query.skip() as usize)
            .take(query.limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn category_counts(&self) -> Result<Vec<BucketCount>, AppError> {
        let questions = self.questions.lock().unwrap();
        let mut counts: Vec<BucketCount> = Vec::new();
        for question in questions.iter().filter(|q| q.is_active) {
            let id = question.category.as_str().to_string();
            match counts.iter_mut().find(|c| c.id == id) {
                Some(entry) => entry.count += 1,
                None => counts.push(BucketCount { id, count: 1 }),
            }
        }
        counts.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(counts)
    }

    async fn stats(&self) -> Result<QuestionStats, AppError> {
        let questions = self.questions.lock().unwrap();
        let active: Vec<&InterviewQuestion> =
            questions.iter().filter(|q| q.is_active).collect();

        let mut difficulty_distribution: Vec<BucketCount> = Vec::new();
        let mut category_distribution: Vec<CategoryViewCount> = Vec::new();
        for question in &active {
            let difficulty = serde_json::to_value(question.difficulty)
                .unwrap()
                .as_str()
                .unwrap()
                .to_string();
            match difficulty_distribution.iter_mut().find(|b| b.id == difficulty) {
                Some(entry) => entry.count += 1,
                None => difficulty_distribution.push(BucketCount {
                    id: difficulty,
                    count: 1,
                }),
            }

            let category = question.category.as_str().to_string();
            match category_distribution.iter_mut().find(|c| c.id == category) {
                Some(entry) => {
                    entry.count += 1;
                    entry.total_views += question.views;
                }
                None => category_distribution.push(CategoryViewCount {
                    id: category,
                    count: 1,
                    total_views: question.views,
                }),
            }
        }
        category_distribution.sort_by(|a, b| b.count.cmp(&a.count));

        let mut most_viewed: Vec<&&InterviewQuestion> = active.iter().collect();
        most_viewed.sort_by(|a, b| b.views.cmp(&a.views));
        let most_viewed_questions = most_viewed
            .into_iter()
            .take(5)
            .map(|q| QuestionDigest {
                id: q.id,
                question: q.question.clone(),
                category: q.category,
                difficulty: q.difficulty,
                views: q.views,
            })
            .collect();

        let mut categories: Vec<&str> = active.iter().map(|q| q.category.as_str()).collect();
        categories.sort();
        categories.dedup();

        Ok(QuestionStats {
            total_questions: active.len() as u64,
            total_categories: categories.len() as u64,
            popular_questions: active.iter().filter(|q| q.popular).count() as u64,
            total_views: active.iter().map(|q| q.views).sum(),
            difficulty_distribution,
            category_distribution,
            most_viewed_questions,
        })
    }

    async fn find_by_id_and_view(
        &self,
        id: ObjectId,
    ) -> Result<Option<InterviewQuestion>, AppError> {
        let mut questions = self.questions.lock().unwrap();
        for question in questions.iter_mut() {
            if question.id == Some(id) && question.is_active {
                question.views += 1;
                return Ok(Some(question.clone()));
            }
        }
        Ok(None)
    }

    async fn like(&self, id: ObjectId) -> Result<Option<i64>, AppError> {
        let mut questions = self.questions.lock().unwrap();
        for question in questions.iter_mut() {
            if question.id == Some(id) && question.is_active {
                question.likes += 1;
                return Ok(Some(question.likes));
            }
        }
        Ok(None)
    }

    async fn count_active(&self) -> Result<u64, AppError> {
        let questions = self.questions.lock().unwrap();
        Ok(questions.iter().filter(|q| q.is_active).count() as u64)
    }
}

/// Scripted chat client: echoes, or fails with a canned provider error.
pub struct ScriptedChat;

#[async_trait]
impl GenerativeClient for ScriptedChat {
    async fn generate(&self, message: &str) -> Result<String, ChatError> {
        if message.contains("trigger-key-error") {
            return Err(ChatError::classify("API key not valid"));
        }
        if message.contains("trigger-model-error") {
            return Err(ChatError::classify(
                "models/gemini-x is not found for API version v1beta",
            ));
        }
        Ok(format!("echo: {message}"))
    }
}

/// Router plus handles on the in-memory repositories behind it.
pub struct TestEnv {
    pub posts: Arc<MemoryPostRepository>,
    pub questions: Arc<MemoryQuestionRepository>,
    pub router: axum::Router,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_paginate_browse(true)
    }

    pub fn with_paginate_browse(paginate_browse: bool) -> Self {
        let posts = Arc::new(MemoryPostRepository::default());
        let questions = Arc::new(MemoryQuestionRepository::default());
        let state = AppState {
            posts: posts.clone(),
            questions: questions.clone(),
            chat: Arc::new(ScriptedChat),
            paginate_browse,
        };
        Self {
            posts,
            questions,
            router: router(state),
        }
    }

    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .expect_success_by_default()
            .build(self.router.clone())
            .expect("Failed to build TestServer")
    }

    /// A server that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .build(self.router.clone())
            .expect("Failed to build TestServer")
    }

    /// A server bound to a real local port (for the reqwest-based client).
    pub fn http_server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .http_transport()
            .build(self.router.clone())
            .expect("Failed to build TestServer")
    }

    /// Seed a published post; `age_minutes` pushes `published_at` into the
    /// past so ordering is deterministic.
    pub async fn seed_post(&self, title: &str, category: &str, age_minutes: i64) -> BlogPost {
        let now = Utc::now();
        let published_at = now - Duration::minutes(age_minutes);
        let post = BlogPost {
            id: None,
            title: title.to_string(),
            slug: techpath::models::post::slugify(title),
            excerpt: format!("About {title}"),
            content: "content".to_string(),
            author: techpath::models::post::Author {
                name: "Sam Rivera".to_string(),
                role: "Developer".to_string(),
                avatar: String::new(),
            },
            category: techpath::models::post::PostCategory::from_str_ci(category)
                .expect("valid category"),
            tags: vec![],
            featured_image: String::new(),
            read_time: "5 min read".to_string(),
            views: 0,
            likes: 0,
            bookmarks: 0,
            shares: 0,
            is_featured: false,
            is_trending: false,
            is_published: true,
            published_at,
            last_modified: published_at,
            created_at: published_at,
            updated_at: published_at,
        };
        self.posts.create(post).await.unwrap()
    }

    pub async fn seed_question(
        &self,
        question: &str,
        category: QuestionCategory,
        difficulty: Difficulty,
    ) -> InterviewQuestion {
        let now = Utc::now();
        let q = InterviewQuestion {
            id: None,
            question: question.to_string(),
            answer: format!("Answer to {question}"),
            category,
            difficulty,
            question_type: QuestionType::Conceptual,
            tags: vec![],
            popular: false,
            views: 0,
            likes: 0,
            bookmarks: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let mut stored = q.clone();
        stored.id = Some(ObjectId::new());
        self.questions.questions.lock().unwrap().push(stored.clone());
        stored
    }
}
