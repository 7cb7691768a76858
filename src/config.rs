use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Remote translation service
    pub client_id: String,
    pub client_secret: String,
    pub sandbox: bool,
    /// Override for the API base URL. Only used by tests; when unset the URL
    /// is derived from the sandbox flag.
    pub api_base_url: Option<String>,

    // Webhook
    pub callback_param: String,
    pub callback_secret: Option<String>,
    pub public_url: String,

    // Storage
    pub database_path: String,

    // Server
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            client_id: std::env::var("MW_CLIENT_ID").context("MW_CLIENT_ID not set")?,
            client_secret: std::env::var("MW_CLIENT_SECRET")
                .context("MW_CLIENT_SECRET not set")?,
            sandbox: std::env::var("MW_SANDBOX")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            api_base_url: std::env::var("MW_API_URL").ok(),

            callback_param: std::env::var("CALLBACK_PARAM")
                .unwrap_or_else(|_| "mw-callback".to_string()),
            callback_secret: std::env::var("CALLBACK_SECRET").ok(),
            public_url: std::env::var("PUBLIC_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),

            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/projects.db".to_string()),

            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        })
    }

    /// URL the remote service should POST completion notifications to,
    /// e.g. `http://example.com/?mw-callback=1`.
    pub fn callback_url(&self) -> String {
        format!(
            "{}/?{}=1",
            self.public_url.trim_end_matches('/'),
            self.callback_param
        )
    }
}
