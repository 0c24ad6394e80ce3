use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of blog categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostCategory {
    Javascript,
    React,
    Nodejs,
    Cloud,
    Devops,
    Ai,
    Career,
    General,
}

impl PostCategory {
    /// Case-insensitive parse of a category name.
    pub fn from_str_ci(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "javascript" => Some(Self::Javascript),
            "react" => Some(Self::React),
            "nodejs" => Some(Self::Nodejs),
            "cloud" => Some(Self::Cloud),
            "devops" => Some(Self::Devops),
            "ai" => Some(Self::Ai),
            "career" => Some(Self::Career),
            "general" => Some(Self::General),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Javascript => "javascript",
            Self::React => "react",
            Self::Nodejs => "nodejs",
            Self::Cloud => "cloud",
            Self::Devops => "devops",
            Self::Ai => "ai",
            Self::Career => "career",
            Self::General => "general",
        }
    }
}

/// Structured author record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub avatar: String,
}

/// Author as accepted at the creation boundary: either a bare name or the
/// full record. Anything else fails deserialization and surfaces as a 400.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthorInput {
    Name(String),
    Full(Author),
}

impl AuthorInput {
    /// Normalize into the single structured shape stored in the database.
    pub fn normalize(self) -> Author {
        match self {
            AuthorInput::Name(name) => Author {
                name,
                role: "Developer".to_string(),
                avatar: String::new(),
            },
            AuthorInput::Full(author) => author,
        }
    }
}

/// A blog post as stored in the `blogposts` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    /// URL-safe identifier derived from the title.
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub author: Author,
    pub category: PostCategory,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured_image: String,
    pub read_time: String,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub bookmarks: i64,
    #[serde(default)]
    pub shares: i64,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_trending: bool,
    #[serde(default)]
    pub is_published: bool,
    pub published_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Derive a slug from a title: lowercase, strip punctuation, collapse
/// whitespace/underscore/hyphen runs into single hyphens, trim hyphens.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .collect();

    let mut slug = String::with_capacity(stripped.len());
    let mut pending_hyphen = false;
    for c in stripped.chars() {
        if c.is_whitespace() || c == '-' || c == '_' {
            pending_hyphen = !slug.is_empty();
        } else {
            if pending_hyphen {
                slug.push('-');
                pending_hyphen = false;
            }
            slug.push(c);
        }
    }
    slug
}

/// Creation payload. Every field is optional at the wire level so that
/// missing required fields produce a single 400 listing all of them.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreatePost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub author: Option<AuthorInput>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub read_time: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

impl CreatePost {
    /// Validate the payload and build the post to persist.
    ///
    /// Required fields mirror the original service: title, content, excerpt,
    /// category, author. Empty strings count as missing.
    pub fn into_post(self) -> Result<BlogPost, String> {
        let mut missing = Vec::new();
        if self.title.as_deref().is_none_or(|s| s.trim().is_empty()) {
            missing.push("title");
        }
        if self.content.as_deref().is_none_or(|s| s.is_empty()) {
            missing.push("content");
        }
        if self.excerpt.as_deref().is_none_or(|s| s.is_empty()) {
            missing.push("excerpt");
        }
        if self.category.as_deref().is_none_or(|s| s.is_empty()) {
            missing.push("category");
        }
        if self.author.is_none() {
            missing.push("author");
        }
        if !missing.is_empty() {
            return Err(format!(
                "Missing required fields: {} are required",
                missing.join(", ")
            ));
        }

        let title = self.title.unwrap().trim().to_string();
        if title.len() > 200 {
            return Err("title must be at most 200 characters".to_string());
        }
        let excerpt = self.excerpt.unwrap();
        if excerpt.len() > 500 {
            return Err("excerpt must be at most 500 characters".to_string());
        }
        let category = self.category.unwrap();
        let category = PostCategory::from_str_ci(&category)
            .ok_or_else(|| format!("Invalid category '{category}'"))?;

        let now = Utc::now();
        Ok(BlogPost {
            id: None,
            slug: slugify(&title),
            title,
            excerpt,
            content: self.content.unwrap(),
            author: self.author.unwrap().normalize(),
            category,
            tags: self
                .tags
                .into_iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            featured_image: String::new(),
            read_time: self.read_time.unwrap_or_else(|| "5 min read".to_string()),
            views: 0,
            likes: 0,
            bookmarks: 0,
            shares: 0,
            is_featured: self.featured,
            is_trending: false,
            is_published: true,
            published_at: now,
            last_modified: now,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update payload. Server-managed fields (id, creation timestamp) are
/// simply not representable here, which replaces the original's delete-keys
/// dance at the route boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<PostCategory>,
    pub author: Option<AuthorInput>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
    pub read_time: Option<String>,
    pub is_featured: Option<bool>,
    pub is_trending: Option<bool>,
    pub is_published: Option<bool>,
}

/// Counters a client can adjust on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostCounter {
    Likes,
    Bookmarks,
}

impl PostCounter {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Likes => "likes",
            Self::Bookmarks => "bookmarks",
        }
    }
}
