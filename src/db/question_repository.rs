use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Document};

use crate::error::AppError;
use crate::models::question::{
    BucketCount, CategoryViewCount, InterviewQuestion, QuestionDigest, QuestionStats,
};

/// Parameters for the question list endpoint. Unlike the blog list, this has
/// always been a single conjunctive predicate with uniform pagination.
#[derive(Debug, Clone)]
pub struct ListQuestionsQuery {
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub question_type: Option<String>,
    pub search: Option<String>,
    pub limit: i64,
    pub page: u64,
}

impl Default for ListQuestionsQuery {
    fn default() -> Self {
        Self {
            category: None,
            difficulty: None,
            question_type: None,
            search: None,
            limit: 50,
            page: 1,
        }
    }
}

impl ListQuestionsQuery {
    pub fn filter(&self) -> Document {
        let mut filter = doc! { "isActive": true };

        if let Some(category) = self.category.as_deref() {
            if category != "all" {
                filter.insert("category", category);
            }
        }
        if let Some(difficulty) = self.difficulty.as_deref() {
            filter.insert("difficulty", difficulty);
        }
        if let Some(question_type) = self.question_type.as_deref() {
            filter.insert("type", question_type);
        }
        if let Some(search) = self.search.as_deref() {
            filter.insert(
                "$or",
                vec![
                    doc! { "question": { "$regex": search, "$options": "i" } },
                    doc! { "answer": { "$regex": search, "$options": "i" } },
                    doc! { "tags": { "$elemMatch": { "$regex": search, "$options": "i" } } },
                ],
            );
        }

        filter
    }

    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1) * self.limit.max(0) as u64
    }
}

/// Repository trait for interview question operations.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn list(
        &self,
        query: &ListQuestionsQuery,
    ) -> Result<(Vec<InterviewQuestion>, u64), AppError>;

    /// Active-question count per category, sorted by category name.
    async fn category_counts(&self) -> Result<Vec<BucketCount>, AppError>;

    /// Aggregate statistics for the interview hub.
    async fn stats(&self) -> Result<QuestionStats, AppError>;

    /// Fetch an active question by id, atomically incrementing its view
    /// counter. Returns the post-increment document.
    async fn find_by_id_and_view(
        &self,
        id: ObjectId,
    ) -> Result<Option<InterviewQuestion>, AppError>;

    /// Atomically increment the like counter. Returns the new value, or None
    /// when the question is missing or inactive.
    async fn like(&self, id: ObjectId) -> Result<Option<i64>, AppError>;

    /// Number of active questions (home-page stats).
    async fn count_active(&self) -> Result<u64, AppError>;
}

/// MongoDB implementation of the QuestionRepository.
pub struct MongoQuestionRepository {
    collection: mongodb::Collection<InterviewQuestion>,
}

impl MongoQuestionRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("interviewquestions"),
        }
    }

    async fn collect_buckets(&self, pipeline: Vec<Document>) -> Result<Vec<Document>, AppError> {
        use futures::TryStreamExt;
        Ok(self.collection.aggregate(pipeline).await?.try_collect().await?)
    }
}

#[async_trait]
impl QuestionRepository for MongoQuestionRepository {
    async fn list(
        &self,
        query: &ListQuestionsQuery,
    ) -> Result<(Vec<InterviewQuestion>, u64), AppError> {
        use futures::TryStreamExt;
        use mongodb::options::FindOptions;

        let filter = query.filter();

        let options = FindOptions::builder()
            .sort(doc! { "popular": -1, "views": -1, "createdAt": -1 })
            .skip(query.skip())
            .limit(query.limit)
            .build();

        let questions: Vec<InterviewQuestion> = self
            .collection
            .find(filter.clone())
            .with_options(options)
            .await?
            .try_collect()
            .await?;

        let total = self.collection.count_documents(filter).await?;

        Ok((questions, total))
    }

    async fn category_counts(&self) -> Result<Vec<BucketCount>, AppError> {
        let raw = self
            .collect_buckets(vec![
                doc! { "$match": { "isActive": true } },
                doc! { "$group": { "_id": "$category", "count": { "$sum": 1 } } },
                doc! { "$sort": { "_id": 1 } },
            ])
            .await?;

        raw.into_iter()
            .map(|d| bson::from_document(d).map_err(|e| AppError::Database(e.to_string())))
            .collect()
    }

    async fn stats(&self) -> Result<QuestionStats, AppError> {
        use futures::TryStreamExt;
        use mongodb::options::FindOptions;

        let total_questions = self.count_active().await?;

        let distinct_categories = self
            .collection
            .distinct("category", doc! { "isActive": true })
            .await?;

        let popular_questions = self
            .collection
            .count_documents(doc! { "popular": true, "isActive": true })
            .await?;

        let total_views_raw = self
            .collect_buckets(vec![
                doc! { "$match": { "isActive": true } },
                doc! { "$group": { "_id": null, "totalViews": { "$sum": "$views" } } },
            ])
            .await?;
        let total_views = total_views_raw
            .first()
            .and_then(|d| d.get_i64("totalViews").ok().or_else(|| {
                d.get_i32("totalViews").ok().map(i64::from)
            }))
            .unwrap_or(0);

        let difficulty_distribution = self
            .collect_buckets(vec![
                doc! { "$match": { "isActive": true } },
                doc! { "$group": { "_id": "$difficulty", "count": { "$sum": 1 } } },
            ])
            .await?
            .into_iter()
            .map(|d| bson::from_document(d).map_err(|e| AppError::Database(e.to_string())))
            .collect::<Result<Vec<BucketCount>, _>>()?;

        let category_distribution = self
            .collect_buckets(vec![
                doc! { "$match": { "isActive": true } },
                doc! { "$group": {
                    "_id": "$category",
                    "count": { "$sum": 1 },
                    "totalViews": { "$sum": "$views" },
                } },
                doc! { "$sort": { "count": -1 } },
            ])
            .await?
            .into_iter()
            .map(|d| bson::from_document(d).map_err(|e| AppError::Database(e.to_string())))
            .collect::<Result<Vec<CategoryViewCount>, _>>()?;

        let digest_collection = self
            .collection
            .clone_with_type::<QuestionDigest>();
        let options = FindOptions::builder()
            .sort(doc! { "views": -1 })
            .limit(5)
            .projection(doc! { "question": 1, "category": 1, "difficulty": 1, "views": 1 })
            .build();
        let most_viewed_questions: Vec<QuestionDigest> = digest_collection
            .find(doc! { "isActive": true })
            .with_options(options)
            .await?
            .try_collect()
            .await?;

        Ok(QuestionStats {
            total_questions,
            total_categories: distinct_categories.len() as u64,
            popular_questions,
            total_views,
            difficulty_distribution,
            category_distribution,
            most_viewed_questions,
        })
    }

    async fn find_by_id_and_view(
        &self,
        id: ObjectId,
    ) -> Result<Option<InterviewQuestion>, AppError> {
        use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        Ok(self
            .collection
            .find_one_and_update(
                doc! { "_id": id, "isActive": true },
                doc! { "$inc": { "views": 1 } },
            )
            .with_options(options)
            .await?)
    }

    async fn like(&self, id: ObjectId) -> Result<Option<i64>, AppError> {
        use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(
                doc! { "_id": id, "isActive": true },
                doc! { "$inc": { "likes": 1 } },
            )
            .with_options(options)
            .await?;

        Ok(updated.map(|q| q.likes))
    }

    async fn count_active(&self) -> Result<u64, AppError> {
        Ok(self
            .collection
            .count_documents(doc! { "isActive": true })
            .await?)
    }
}
