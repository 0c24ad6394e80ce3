pub mod app;
pub mod config;
pub mod error;
pub mod models {
    pub mod post;
    pub mod question;
}
pub mod db {
    pub mod post_repository;
    pub mod question_repository;
}
pub mod api {
    pub mod chat;
    pub mod envelope;
    pub mod errors;
    pub mod posts;
    pub mod questions;
    pub mod stats;
}
pub mod genai {
    pub mod client;
}
pub mod client {
    pub mod api;
    pub mod store;
}
pub mod storage {
    pub mod profile;
}
