//! Completion webhook: the remote service POSTs here when a project
//! finishes, and the handler writes the translated content back.
//!
//! Per notification the flow is validate, download, apply, record, aborting
//! at the first failed step. Validation failures are "not for us" and
//! produce no side effects and no diagnostics for the caller: the sender is
//! an automated system, and its own retry/alerting is the recovery path.
//! The whole handler is idempotent, so replaying a completed notification
//! re-applies identical content and re-marks the same record.

use crate::api::ApiClient;
use crate::content::ContentStore;
use crate::errors::Result;
use crate::security::constant_time_compare;
use crate::server::AppState;
use crate::store::ProjectStore;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Header carrying the shared webhook secret, when one is configured.
pub const CALLBACK_SECRET_HEADER: &str = "x-callback-secret";

#[derive(Debug, Deserialize)]
pub struct CallbackPayload {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub action: Option<String>,
    pub project: Option<CallbackProject>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackProject {
    /// The service is inconsistent about sending the id as a number or a
    /// numeric string; accept both.
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub custom: HashMap<String, String>,
}

impl CallbackProject {
    fn numeric_id(&self) -> Option<i64> {
        match self.id.as_ref()? {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        }
        .filter(|&id| id > 0)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Content written and the project record marked completed.
    Applied,
    /// Notification was not valid or not ours; nothing happened.
    Ignored,
}

/// Core of the webhook, transport-independent.
pub async fn process_callback(
    api: &ApiClient,
    store: &ProjectStore,
    content: &dyn ContentStore,
    payload: &CallbackPayload,
) -> Result<CallbackOutcome> {
    if payload.action.as_deref() != Some("completed") {
        debug!(action = ?payload.action, "Ignoring callback with non-completion action");
        return Ok(CallbackOutcome::Ignored);
    }

    let Some(project_id) = payload.project.as_ref().and_then(CallbackProject::numeric_id) else {
        debug!("Ignoring callback without a numeric project id");
        return Ok(CallbackOutcome::Ignored);
    };

    let Some(content_id) = store.get_content_id(project_id)? else {
        debug!(project_id, "Ignoring callback for a project we do not track");
        return Ok(CallbackOutcome::Ignored);
    };

    let bundle = api.download_project(project_id).await?;

    content.apply_translation(content_id, &bundle.title, &bundle.content, &bundle.excerpt)?;
    for (key, value) in bundle.custom_fields() {
        content.set_meta(content_id, key, value)?;
    }

    store.update_project(content_id, "completed", 100, 100)?;

    info!(project_id, content_id, "Applied completed translation");
    Ok(CallbackOutcome::Applied)
}

/// Axum entry point. Answers `{"status":"success"}` only when a completion
/// was applied; everything else gets an empty 200, structured diagnostics
/// are deliberately withheld from the remote caller.
pub async fn handle_callback(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // The endpoint is a query flag on the site root, not a dedicated path.
    if !params.contains_key(&state.config.callback_param) {
        return ().into_response();
    }

    if let Some(secret) = &state.config.callback_secret {
        let presented = headers
            .get(CALLBACK_SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if !constant_time_compare(secret, presented) {
            warn!("Rejected callback with missing or wrong shared secret");
            return ().into_response();
        }
    }

    let Ok(payload) = serde_json::from_slice::<CallbackPayload>(&body) else {
        debug!("Ignoring callback with unparseable body");
        return ().into_response();
    };

    match process_callback(&state.api, &state.store, state.content.as_ref(), &payload).await {
        Ok(CallbackOutcome::Applied) => {
            Json(serde_json::json!({"status": "success"})).into_response()
        }
        Ok(CallbackOutcome::Ignored) => ().into_response(),
        Err(err) => {
            warn!(error = %err, "Callback processing failed");
            ().into_response()
        }
    }
}
