//! Typed client for the remote translation service.
//!
//! Every call is one network round trip. Transport failures, non-2xx
//! statuses, malformed bodies and explicit `error` fields in a 2xx body all
//! surface as [`Error`], so callers never see a partially populated success
//! value.
//!
//! The client keeps a process-wide cache for the OAuth token and the language
//! list. Entries are keyed by environment (base URL + client id): language
//! lists, project ids and progress are environment-scoped, so a read cached
//! under sandbox must never answer a production call. [`ApiClient::clear_cache`]
//! drops the whole cache and is called whenever credentials change.

use crate::config::Config;
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, OnceLock};
use tracing::{debug, info};

const PRODUCTION_URL: &str = "https://api.motaword.com/v0";
const SANDBOX_URL: &str = "https://sandbox.motaword.com/v0";

/// Prefix convention for custom metadata fields in a [`FieldBundle`].
pub const CUSTOM_FIELD_PREFIX: &str = "CUSTOMFIELD_";
/// Prefix convention for attachment fields in a [`FieldBundle`].
pub const ATTACHMENT_PREFIX: &str = "ATTACHMENT_";

// ==================== Wire types ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteLanguage {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Price {
    pub amount: f64,
    pub currency: String,
}

/// A remote translation project as the service reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub source_language: String,
    pub target_languages: Vec<String>,
    #[serde(default = "unknown_status")]
    pub status: String,
    #[serde(default)]
    pub word_count: u64,
    pub price: Option<Price>,
}

fn unknown_status() -> String {
    "unknown".to_string()
}

/// Translation/proofreading percentages, both 0-100.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Progress {
    pub translation: u8,
    pub proofreading: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LaunchStatus {
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// The flat field mapping exchanged with the service: the three fixed fields
/// plus an open map of `CUSTOMFIELD_<key>` and `ATTACHMENT_<id>_<field>`
/// entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldBundle {
    #[serde(rename = "TITLE", default)]
    pub title: String,
    #[serde(rename = "CONTENT", default)]
    pub content: String,
    #[serde(rename = "EXCERPT", default)]
    pub excerpt: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl FieldBundle {
    pub fn new(title: impl Into<String>, content: impl Into<String>, excerpt: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            excerpt: excerpt.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Record a metadata field under the custom-field prefix convention.
    pub fn set_custom_field(&mut self, key: &str, value: impl Into<String>) {
        self.extra
            .insert(format!("{CUSTOM_FIELD_PREFIX}{key}"), value.into());
    }

    /// Record one attachment field, e.g. `ATTACHMENT_42_ALT`.
    pub fn set_attachment_field(&mut self, attachment_id: i64, field: &str, value: impl Into<String>) {
        self.extra
            .insert(format!("{ATTACHMENT_PREFIX}{attachment_id}_{field}"), value.into());
    }

    /// Iterate custom fields as (metadata key, value), with the prefix
    /// stripped so the key can be written back to the content store as-is.
    pub fn custom_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.extra.iter().filter_map(|(k, v)| {
            k.strip_prefix(CUSTOM_FIELD_PREFIX)
                .map(|suffix| (suffix, v.as_str()))
        })
    }
}

// ==================== Process-wide environment cache ====================

#[derive(Default)]
struct EnvCache {
    token: Option<String>,
    languages: Option<Vec<RemoteLanguage>>,
}

fn env_cache() -> &'static Mutex<HashMap<String, EnvCache>> {
    static CACHE: OnceLock<Mutex<HashMap<String, EnvCache>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

// ==================== Client ====================

pub struct ApiClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    base_url: String,
    /// Key into the process-wide cache. Two clients with the same key share
    /// cached state; a different environment is always a different key.
    env_key: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        if config.client_id.is_empty() || config.client_secret.is_empty() {
            return Err(Error::Credentials(
                "client id and secret must both be configured".to_string(),
            ));
        }

        let base_url = match &config.api_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None if config.sandbox => SANDBOX_URL.to_string(),
            None => PRODUCTION_URL.to_string(),
        };

        Ok(Self {
            http: reqwest::Client::new(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            env_key: format!("{}|{}", base_url, config.client_id),
            base_url,
        })
    }

    /// Drop all cached tokens and language lists, for every environment.
    /// Must be called when credentials or the sandbox flag change.
    pub fn clear_cache() {
        env_cache().lock().unwrap().clear();
        info!("Cleared environment-scoped API caches");
    }

    /// Fetch (or reuse) an OAuth client-credentials token for this
    /// environment.
    async fn token(&self) -> Result<String> {
        if let Some(cache) = env_cache().lock().unwrap().get(&self.env_key) {
            if let Some(token) = &cache.token {
                return Ok(token.clone());
            }
        }

        let response = self
            .http
            .post(format!("{}/token", self.base_url))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(Error::from_reqwest)?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Credentials(
                "the service rejected the client id/secret pair".to_string(),
            ));
        }

        let response = Self::check_status(response).await?;
        let token: TokenResponse = response.json().await.map_err(Error::from_reqwest)?;

        env_cache()
            .lock()
            .unwrap()
            .entry(self.env_key.clone())
            .or_default()
            .token = Some(token.access_token.clone());

        Ok(token.access_token)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    /// Parse a 2xx body, rejecting payloads that carry an explicit `error`
    /// field before deserializing into the target type.
    async fn parse_body<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let value: serde_json::Value = response.json().await.map_err(Error::from_reqwest)?;

        if let Some(error) = value.get("error") {
            let message = error
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(Error::Api { status: 200, message });
        }

        serde_json::from_value(value).map_err(|e| Error::Malformed(e.to_string()))
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let token = self.token().await?;
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(token)
            .send()
            .await
            .map_err(Error::from_reqwest)?;

        Self::parse_body(Self::check_status(response).await?).await
    }

    // ==================== Operations ====================

    /// Languages the service can translate between. Cached process-wide for
    /// this environment.
    pub async fn get_languages(&self) -> Result<Vec<RemoteLanguage>> {
        if let Some(cache) = env_cache().lock().unwrap().get(&self.env_key) {
            if let Some(languages) = &cache.languages {
                debug!("Serving language list from environment cache");
                return Ok(languages.clone());
            }
        }

        let languages: Vec<RemoteLanguage> = self.get("/languages").await?;

        env_cache()
            .lock()
            .unwrap()
            .entry(self.env_key.clone())
            .or_default()
            .languages = Some(languages.clone());

        Ok(languages)
    }

    /// Submit a document for a quote. The project is created remotely in a
    /// quoted state; nothing is billed until [`ApiClient::launch_project`].
    pub async fn submit_project(
        &self,
        source_language: &str,
        target_language: &str,
        bundle: &FieldBundle,
        callback_url: &str,
        custom: &[(String, String)],
    ) -> Result<Project> {
        let token = self.token().await?;

        let document = serde_json::to_vec(bundle)
            .map_err(|e| Error::Malformed(format!("could not serialize document: {e}")))?;
        let document_part = reqwest::multipart::Part::bytes(document)
            .file_name("document.json")
            .mime_str("application/json")
            .map_err(|e| Error::Malformed(e.to_string()))?;

        let mut form = reqwest::multipart::Form::new()
            .text("source_language", source_language.to_string())
            .text("target_languages[]", target_language.to_string())
            .text("callback_url", callback_url.to_string())
            .part("documents[]", document_part);

        for (key, value) in custom {
            form = form.text(format!("custom[{key}]"), value.clone());
        }

        let response = self
            .http
            .post(format!("{}/projects", self.base_url))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(Error::from_reqwest)?;

        let project: Project = Self::parse_body(Self::check_status(response).await?).await?;
        info!(
            project_id = project.id,
            word_count = project.word_count,
            "Submitted document for quote"
        );
        Ok(project)
    }

    /// Launch a quoted project. Billing starts when the response status is
    /// `started`.
    pub async fn launch_project(&self, id: i64) -> Result<LaunchStatus> {
        let token = self.token().await?;
        let response = self
            .http
            .post(format!("{}/projects/{}/launch", self.base_url, id))
            .bearer_auth(token)
            .send()
            .await
            .map_err(Error::from_reqwest)?;

        Self::parse_body(Self::check_status(response).await?).await
    }

    pub async fn get_project(&self, id: i64) -> Result<Project> {
        self.get(&format!("/projects/{id}")).await
    }

    pub async fn get_progress(&self, id: i64) -> Result<Progress> {
        self.get(&format!("/projects/{id}/progress")).await
    }

    /// Download the translated field bundle. Only meaningful once the remote
    /// project is completed.
    pub async fn download_project(&self, id: i64) -> Result<FieldBundle> {
        self.get(&format!("/projects/{id}/download")).await
    }
}
