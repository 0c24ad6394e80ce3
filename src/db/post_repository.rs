use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Document};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::post::{slugify, BlogPost, PostCounter, UpdatePost};

/// Parameters for the blog list endpoint.
#[derive(Debug, Clone)]
pub struct ListPostsQuery {
    /// `None` or `"all"` means no category clause.
    pub category: Option<String>,
    pub search: Option<String>,
    pub limit: i64,
    pub page: u64,
    /// When false, category browsing without a search term ignores `page`
    /// (the legacy single-page behavior). Searching always paginates.
    pub paginate_browse: bool,
}

impl Default for ListPostsQuery {
    fn default() -> Self {
        Self {
            category: None,
            search: None,
            limit: 20,
            page: 1,
            paginate_browse: true,
        }
    }
}

impl ListPostsQuery {
    /// Build the MongoDB predicate for this query. The same document is used
    /// for both the page fetch and the total count.
    pub fn filter(&self) -> Document {
        let mut filter = doc! { "isPublished": true };

        if let Some(category) = self.category.as_deref() {
            if category != "all" {
                filter.insert("category", category);
            }
        }

        if let Some(search) = self.search.as_deref() {
            filter.insert(
                "$or",
                vec![
                    doc! { "title": { "$regex": search, "$options": "i" } },
                    doc! { "excerpt": { "$regex": search, "$options": "i" } },
                    doc! { "author.name": { "$regex": search, "$options": "i" } },
                    doc! { "tags": { "$elemMatch": { "$regex": search, "$options": "i" } } },
                ],
            );
        }

        filter
    }

    /// Number of documents to skip for the requested page.
    pub fn skip(&self) -> u64 {
        if self.search.is_none() && !self.paginate_browse {
            return 0;
        }
        self.page.saturating_sub(1) * self.limit.max(0) as u64
    }
}

/// A `{_id, count}` bucket from the category aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCount {
    #[serde(rename = "_id")]
    pub id: String,
    pub count: u64,
}

/// A tag with the number of posts carrying it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicCount {
    pub name: String,
    pub posts: u64,
}

/// Repository trait for blog post operations.
///
/// This trait allows mocking the database layer in tests.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Filtered, sorted, paginated page of posts plus the unpaginated total.
    async fn list(&self, query: &ListPostsQuery) -> Result<(Vec<BlogPost>, u64), AppError>;

    /// Most recently published post flagged as featured.
    async fn find_featured(&self) -> Result<Option<BlogPost>, AppError>;

    /// Trending posts by views, then recency.
    async fn find_trending(&self, limit: i64) -> Result<Vec<BlogPost>, AppError>;

    /// Published-post count per category, sorted by category name.
    async fn category_counts(&self) -> Result<Vec<CategoryCount>, AppError>;

    /// Most used tags across published posts.
    async fn trending_topics(&self, limit: i64) -> Result<Vec<TopicCount>, AppError>;

    /// Fetch a published post by slug, atomically incrementing its view
    /// counter. Returns the post-increment document.
    async fn find_by_slug_and_view(&self, slug: &str) -> Result<Option<BlogPost>, AppError>;

    /// Atomically adjust a counter by +/-1, clamped at zero. Returns the new
    /// value, or None when the post is missing or unpublished.
    async fn adjust_counter(
        &self,
        id: ObjectId,
        counter: PostCounter,
        increment: bool,
    ) -> Result<Option<i64>, AppError>;

    async fn create(&self, post: BlogPost) -> Result<BlogPost, AppError>;

    /// Apply a partial update. Returns the updated post, or None when the id
    /// does not resolve.
    async fn update(&self, id: ObjectId, update: UpdatePost)
        -> Result<Option<BlogPost>, AppError>;

    /// Remove a post. Returns the deleted document, or None when absent.
    async fn delete(&self, id: ObjectId) -> Result<Option<BlogPost>, AppError>;

    /// Number of published posts (home-page stats).
    async fn count_published(&self) -> Result<u64, AppError>;
}

/// MongoDB implementation of the PostRepository.
pub struct MongoPostRepository {
    collection: mongodb::Collection<BlogPost>,
}

impl MongoPostRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("blogposts"),
        }
    }
}

#[async_trait]
impl PostRepository for MongoPostRepository {
    async fn list(&self, query: &ListPostsQuery) -> Result<(Vec<BlogPost>, u64), AppError> {
        use futures::TryStreamExt;
        use mongodb::options::FindOptions;

        let filter = query.filter();

        let options = FindOptions::builder()
            .sort(doc! { "publishedAt": -1 })
            .skip(query.skip())
            .limit(query.limit)
            .build();

        let posts: Vec<BlogPost> = self
            .collection
            .find(filter.clone())
            .with_options(options)
            .await?
            .try_collect()
            .await?;

        let total = self.collection.count_documents(filter).await?;

        Ok((posts, total))
    }

    async fn find_featured(&self) -> Result<Option<BlogPost>, AppError> {
        use mongodb::options::FindOneOptions;

        let options = FindOneOptions::builder()
            .sort(doc! { "publishedAt": -1 })
            .build();

        Ok(self
            .collection
            .find_one(doc! { "isFeatured": true, "isPublished": true })
            .with_options(options)
            .await?)
    }

    async fn find_trending(&self, limit: i64) -> Result<Vec<BlogPost>, AppError> {
        use futures::TryStreamExt;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder()
            .sort(doc! { "views": -1, "publishedAt": -1 })
            .limit(limit)
            .build();

        Ok(self
            .collection
            .find(doc! { "isTrending": true, "isPublished": true })
            .with_options(options)
            .await?
            .try_collect()
            .await?)
    }

    async fn category_counts(&self) -> Result<Vec<CategoryCount>, AppError> {
        use futures::TryStreamExt;

        let pipeline = vec![
            doc! { "$match": { "isPublished": true } },
            doc! { "$group": { "_id": "$category", "count": { "$sum": 1 } } },
            doc! { "$sort": { "_id": 1 } },
        ];

        let raw: Vec<Document> = self.collection.aggregate(pipeline).await?.try_collect().await?;
        raw.into_iter()
            .map(|d| bson::from_document(d).map_err(|e| AppError::Database(e.to_string())))
            .collect()
    }

    async fn trending_topics(&self, limit: i64) -> Result<Vec<TopicCount>, AppError> {
        use futures::TryStreamExt;

        let pipeline = vec![
            doc! { "$match": { "isPublished": true } },
            doc! { "$unwind": "$tags" },
            doc! { "$group": { "_id": "$tags", "posts": { "$sum": 1 } } },
            doc! { "$sort": { "posts": -1 } },
            doc! { "$limit": limit },
            doc! { "$project": { "name": "$_id", "posts": 1, "_id": 0 } },
        ];

        let raw: Vec<Document> = self.collection.aggregate(pipeline).await?.try_collect().await?;
        raw.into_iter()
            .map(|d| bson::from_document(d).map_err(|e| AppError::Database(e.to_string())))
            .collect()
    }

    async fn find_by_slug_and_view(&self, slug: &str) -> Result<Option<BlogPost>, AppError> {
        use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        Ok(self
            .collection
            .find_one_and_update(
                doc! { "slug": slug, "isPublished": true },
                doc! { "$inc": { "views": 1 } },
            )
            .with_options(options)
            .await?)
    }

    async fn adjust_counter(
        &self,
        id: ObjectId,
        counter: PostCounter,
        increment: bool,
    ) -> Result<Option<i64>, AppError> {
        use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

        let field = counter.field();
        let delta: i64 = if increment { 1 } else { -1 };

        // Pipeline update: a single atomic adjust-and-clamp, instead of the
        // lost-update-prone read-modify-write this replaces.
        let update = vec![doc! {
            "$set": { field: { "$max": [0, { "$add": [format!("${field}"), delta] }] } }
        }];

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": id, "isPublished": true }, update)
            .with_options(options)
            .await?;

        Ok(updated.map(|post| match counter {
            PostCounter::Likes => post.likes,
            PostCounter::Bookmarks => post.bookmarks,
        }))
    }

    async fn create(&self, mut post: BlogPost) -> Result<BlogPost, AppError> {
        let result = self.collection.insert_one(&post).await?;
        post.id = result.inserted_id.as_object_id();
        Ok(post)
    }

    async fn update(
        &self,
        id: ObjectId,
        update: UpdatePost,
    ) -> Result<Option<BlogPost>, AppError> {
        use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

        let now = chrono::Utc::now();
        let mut set = doc! {
            "lastModified": bson::to_bson(&now).map_err(|e| AppError::Internal(e.to_string()))?,
            "updatedAt": bson::to_bson(&now).map_err(|e| AppError::Internal(e.to_string()))?,
        };

        if let Some(title) = update.title {
            // Slug follows the title wherever it goes.
            set.insert("slug", slugify(&title));
            set.insert("title", title.trim());
        }
        if let Some(content) = update.content {
            set.insert("content", content);
        }
        if let Some(excerpt) = update.excerpt {
            set.insert("excerpt", excerpt);
        }
        if let Some(category) = update.category {
            set.insert("category", category.as_str());
        }
        if let Some(author) = update.author {
            let author = author.normalize();
            set.insert(
                "author",
                bson::to_bson(&author).map_err(|e| AppError::Internal(e.to_string()))?,
            );
        }
        if let Some(tags) = update.tags {
            let tags: Vec<String> = tags
                .into_iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect();
            set.insert("tags", tags);
        }
        if let Some(featured_image) = update.featured_image {
            set.insert("featuredImage", featured_image);
        }
        if let Some(read_time) = update.read_time {
            set.insert("readTime", read_time);
        }
        if let Some(is_featured) = update.is_featured {
            set.insert("isFeatured", is_featured);
        }
        if let Some(is_trending) = update.is_trending {
            set.insert("isTrending", is_trending);
        }
        if let Some(is_published) = update.is_published {
            set.insert("isPublished", is_published);
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        Ok(self
            .collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .with_options(options)
            .await?)
    }

    async fn delete(&self, id: ObjectId) -> Result<Option<BlogPost>, AppError> {
        Ok(self
            .collection
            .find_one_and_delete(doc! { "_id": id })
            .await?)
    }

    async fn count_published(&self) -> Result<u64, AppError> {
        Ok(self
            .collection
            .count_documents(doc! { "isPublished": true })
            .await?)
    }
}
