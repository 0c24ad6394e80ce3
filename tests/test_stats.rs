mod common;

use common::TestEnv;
use serde_json::Value;
use techpath::models::question::{Difficulty, QuestionCategory};

#[tokio::test]
async fn home_stats_report_literal_counts_below_threshold() {
    let env = TestEnv::new();
    env.seed_post("One", "general", 1).await;
    env.seed_post("Two", "general", 2).await;
    env.seed_question("Q", QuestionCategory::Backend, Difficulty::Beginner)
        .await;

    let server = env.server();
    let body: Value = server.get("/api/stats/home").await.json();
    let stats = &body["data"];
    assert_eq!(stats["interviewQuestions"], "1");
    assert_eq!(stats["techArticles"], "2");
    assert_eq!(stats["aiSupport"], "24/7");
    assert_eq!(stats["rawCounts"]["questions"], 1);
    assert_eq!(stats["rawCounts"]["articles"], 2);
}

#[tokio::test]
async fn home_stats_cap_large_counts() {
    let env = TestEnv::new();
    for i in 0..101 {
        env.seed_post(&format!("Post {i}"), "general", i).await;
    }
    for i in 0..501 {
        env.seed_question(
            &format!("Q {i}"),
            QuestionCategory::Backend,
            Difficulty::Beginner,
        )
        .await;
    }

    let server = env.server();
    let body: Value = server.get("/api/stats/home").await.json();
    assert_eq!(body["data"]["interviewQuestions"], "500+");
    assert_eq!(body["data"]["techArticles"], "100+");
    assert_eq!(body["data"]["rawCounts"]["questions"], 501);
}

#[tokio::test]
async fn unpublished_and_inactive_records_are_excluded() {
    let env = TestEnv::new();
    env.seed_post("Visible", "general", 1).await;
    env.seed_post("Draft", "general", 2).await;
    env.posts.posts.lock().unwrap()[1].is_published = false;

    env.seed_question("Active", QuestionCategory::Backend, Difficulty::Beginner)
        .await;
    env.seed_question("Retired", QuestionCategory::Backend, Difficulty::Beginner)
        .await;
    env.questions.questions.lock().unwrap()[1].is_active = false;

    let server = env.server();
    let body: Value = server.get("/api/stats/home").await.json();
    assert_eq!(body["data"]["rawCounts"]["articles"], 1);
    assert_eq!(body["data"]["rawCounts"]["questions"], 1);
}
