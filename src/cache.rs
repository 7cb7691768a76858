//! Per-request memoization of remote reads.
//!
//! One [`RequestCache`] lives for exactly one operation (one admin render,
//! one aggregation pass) and is dropped with it. Within that lifetime,
//! repeated lookups for the same identifier return a single snapshot even if
//! the remote state changes mid-operation. Nothing here is ever persisted or
//! shared across operations.

use crate::api::{ApiClient, Progress, Project, RemoteLanguage};
use crate::errors::Result;
use std::collections::HashMap;

#[derive(Default)]
pub struct RequestCache {
    projects: HashMap<i64, Project>,
    progress: HashMap<i64, Progress>,
    languages: Option<Vec<RemoteLanguage>>,
}

impl RequestCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Project detail, fetched at most once per request.
    pub async fn project(&mut self, api: &ApiClient, id: i64) -> Result<Project> {
        if let Some(project) = self.projects.get(&id) {
            return Ok(project.clone());
        }
        let project = api.get_project(id).await?;
        self.projects.insert(id, project.clone());
        Ok(project)
    }

    /// Progress reading, fetched at most once per request.
    pub async fn progress(&mut self, api: &ApiClient, id: i64) -> Result<Progress> {
        if let Some(progress) = self.progress.get(&id) {
            return Ok(*progress);
        }
        let progress = api.get_progress(id).await?;
        self.progress.insert(id, progress);
        Ok(progress)
    }

    /// Supported language list, fetched at most once per request.
    pub async fn languages(&mut self, api: &ApiClient) -> Result<Vec<RemoteLanguage>> {
        if let Some(languages) = &self.languages {
            return Ok(languages.clone());
        }
        let languages = api.get_languages().await?;
        self.languages = Some(languages.clone());
        Ok(languages)
    }
}
