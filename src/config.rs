use anyhow::Context;

/// Runtime configuration, read from the environment at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub bind_addr: String,
    /// Key for the generative-AI provider. The chat route cannot work
    /// without it, so startup fails when it is missing.
    pub gemini_api_key: String,
    /// When false, category browsing without a search term keeps the legacy
    /// single-page behavior (`page` is ignored and the result is capped at
    /// `limit`). Defaults to true: both list paths paginate uniformly.
    pub paginate_browse: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let mongodb_uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let mongodb_database =
            std::env::var("MONGODB_DATABASE").unwrap_or_else(|_| "techpath".to_string());
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".to_string());
        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .context("GEMINI_API_KEY environment variable is not set")?;
        let paginate_browse = std::env::var("PAGINATE_BROWSE")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        Ok(Self {
            mongodb_uri,
            mongodb_database,
            bind_addr,
            gemini_api_key,
            paginate_browse,
        })
    }
}
