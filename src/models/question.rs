use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of interview-question categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionCategory {
    Frontend,
    Backend,
    Cloud,
    Devops,
    Mobile,
    Ai,
}

impl QuestionCategory {
    pub fn from_str_ci(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "frontend" => Some(Self::Frontend),
            "backend" => Some(Self::Backend),
            "cloud" => Some(Self::Cloud),
            "devops" => Some(Self::Devops),
            "mobile" => Some(Self::Mobile),
            "ai" => Some(Self::Ai),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frontend => "frontend",
            Self::Backend => "backend",
            Self::Cloud => "cloud",
            Self::Devops => "devops",
            Self::Mobile => "mobile",
            Self::Ai => "ai",
        }
    }

    /// Display metadata used by the category listing endpoint.
    pub fn display(&self) -> (&'static str, &'static str) {
        match self {
            Self::Frontend => ("Frontend Development", "Code"),
            Self::Backend => ("Backend Development", "Server"),
            Self::Cloud => ("Cloud Computing", "Cloud"),
            Self::Devops => ("DevOps & Security", "Shield"),
            Self::Mobile => ("Mobile Development", "Smartphone"),
            Self::Ai => ("AI & Machine Learning", "Brain"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionType {
    Conceptual,
    Implementation,
    #[serde(rename = "System Design")]
    SystemDesign,
    Performance,
    Debugging,
}

/// An interview question as stored in the `interviewquestions` collection.
///
/// `is_active` is the soft-delete flag: inactive records are excluded from
/// every list and detail query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewQuestion {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub question: String,
    pub answer: String,
    pub category: QuestionCategory,
    pub difficulty: Difficulty,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub popular: bool,
    #[serde(default)]
    pub views: i64,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub bookmarks: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl InterviewQuestion {
    /// Short form of the question text for list views.
    pub fn summary(&self) -> String {
        if self.question.chars().count() > 100 {
            let cut: String = self.question.chars().take(100).collect();
            format!("{cut}...")
        } else {
            self.question.clone()
        }
    }
}

/// Aggregate statistics for the interview hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionStats {
    pub total_questions: u64,
    pub total_categories: u64,
    pub popular_questions: u64,
    pub total_views: i64,
    pub difficulty_distribution: Vec<BucketCount>,
    pub category_distribution: Vec<CategoryViewCount>,
    pub most_viewed_questions: Vec<QuestionDigest>,
}

/// One `{_id, count}` bucket out of a group aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketCount {
    #[serde(rename = "_id")]
    pub id: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryViewCount {
    #[serde(rename = "_id")]
    pub id: String,
    pub count: u64,
    pub total_views: i64,
}

/// Projection of a question used by the most-viewed listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDigest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub question: String,
    pub category: QuestionCategory,
    pub difficulty: Difficulty,
    pub views: i64,
}
