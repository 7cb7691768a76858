//! Submitting content for quotes and launching accepted quotes.
//!
//! The two phases have different failure policies. A quote batch is
//! all-or-nothing: a half-submitted batch would leave remote projects with no
//! local linkage, so the first failure aborts it. Launching is already billed
//! remotely, so one rejected launch must not block the rest of the batch;
//! rejections are counted and reported instead.

use crate::api::{ApiClient, FieldBundle, Project};
use crate::content::{ContentStore, NewContentRecord, RESERVED_META_KEYS};
use crate::errors::{Error, Result};
use crate::languages;
use crate::store::ProjectStore;
use tracing::{info, warn};

/// Custom-field key correlating a remote project back to its content record.
pub const CONTENT_ID_FIELD: &str = "content_id";

/// Aggregate quote for one submitted batch.
#[derive(Debug)]
pub struct Quote {
    /// (content record id, quoted remote project), submission order.
    pub projects: Vec<(i64, Project)>,
    pub word_count: u64,
    pub cost: f64,
    pub currency: String,
}

/// Outcome of a launch batch. `started + rejected` equals the batch size.
#[derive(Debug)]
pub struct LaunchReport {
    pub started: usize,
    pub rejected: usize,
    /// Last rejection payload, for diagnostics.
    pub last_error: Option<String>,
    /// (content record the project was recorded against, project id). The
    /// record differs from the submitted one when a language variant was
    /// created or resolved.
    pub recorded: Vec<(i64, i64)>,
}

/// Serialize a content record into the flat field shape the service accepts:
/// the three core fields, all non-reserved metadata, and attachment
/// title/excerpt/alt text.
pub fn build_field_bundle(content: &dyn ContentStore, record_id: i64) -> Result<FieldBundle> {
    let record = content
        .get_record(record_id)?
        .ok_or_else(|| Error::Validation(format!("no content record {record_id}")))?;

    let mut bundle = FieldBundle::new(record.title, record.body, record.excerpt);

    for (key, value) in content.get_meta(record_id)? {
        if RESERVED_META_KEYS.contains(&key.as_str()) {
            continue;
        }
        bundle.set_custom_field(&key, value);
    }

    for attachment in content.attachments(record_id)? {
        bundle.set_attachment_field(attachment.id, "TITLE", attachment.title);
        bundle.set_attachment_field(attachment.id, "EXCERPT", attachment.excerpt);
        if let Some(alt) = attachment.alt.filter(|alt| !alt.is_empty()) {
            bundle.set_attachment_field(attachment.id, "ALT", alt);
        }
    }

    Ok(bundle)
}

/// Submit every record in `content_ids` for a quote.
///
/// When `primary` is set, the document content is sourced from that canonical
/// record (variant pairing means several per-language records share one
/// source text), while the correlation field still carries each submitted id.
/// The first failed submission aborts the whole batch.
pub async fn submit_for_quote(
    api: &ApiClient,
    content: &dyn ContentStore,
    content_ids: &[i64],
    source_language: &str,
    target_language: &str,
    primary: Option<i64>,
    callback_url: &str,
) -> Result<Quote> {
    let mut quote = Quote {
        projects: Vec::with_capacity(content_ids.len()),
        word_count: 0,
        cost: 0.0,
        currency: String::new(),
    };

    for &content_id in content_ids {
        let source_id = primary.unwrap_or(content_id);
        let bundle = build_field_bundle(content, source_id)?;
        let custom = vec![(CONTENT_ID_FIELD.to_string(), content_id.to_string())];

        let project = api
            .submit_project(source_language, target_language, &bundle, callback_url, &custom)
            .await?;

        quote.word_count += project.word_count;
        if let Some(price) = &project.price {
            quote.cost += price.amount;
            quote.currency = price.currency.clone();
        }
        quote.projects.push((content_id, project));
    }

    info!(
        posts = quote.projects.len(),
        words = quote.word_count,
        "Collected quote for batch"
    );

    Ok(quote)
}

/// Launch previously quoted projects. Only a `started` response persists a
/// project record; anything else counts as rejected and the batch continues.
pub async fn launch_projects(
    api: &ApiClient,
    store: &ProjectStore,
    content: &dyn ContentStore,
    quoted: &[(i64, i64)],
    target_language: &str,
) -> Result<LaunchReport> {
    let mut report = LaunchReport {
        started: 0,
        rejected: 0,
        last_error: None,
        recorded: Vec::new(),
    };

    for &(content_id, project_id) in quoted {
        match api.launch_project(project_id).await {
            Ok(response) if response.status == "started" => {
                let record_id = resolve_target_record(store, content, content_id, target_language)?;
                store.add_project(record_id, project_id)?;
                report.started += 1;
                report.recorded.push((record_id, project_id));
                info!(project_id, content_id = record_id, "Project launched");
            }
            Ok(response) => {
                warn!(project_id, status = %response.status, "Launch rejected");
                report.last_error = Some(format!("unexpected launch status: {}", response.status));
                report.rejected += 1;
            }
            Err(err) => {
                warn!(project_id, error = %err, "Launch failed");
                report.last_error = Some(err.to_string());
                report.rejected += 1;
            }
        }
    }

    Ok(report)
}

/// Which record should carry the project? Without variant support (or with an
/// unmapped target code) the submitted record itself; otherwise the paired
/// record for the target language, created as a draft copy when missing.
fn resolve_target_record(
    store: &ProjectStore,
    content: &dyn ContentStore,
    content_id: i64,
    target_language: &str,
) -> Result<i64> {
    if !content.supports_variants() {
        return Ok(content_id);
    }

    let Some(target_host) = languages::to_host(target_language) else {
        warn!(
            target_language,
            "Target language has no platform mapping, recording against the source record"
        );
        return Ok(content_id);
    };

    if let Some(existing) = content.variant(content_id, target_host)? {
        return Ok(existing);
    }

    let source = content
        .get_record(content_id)?
        .ok_or_else(|| Error::Validation(format!("no content record {content_id}")))?;

    let variant_id = content.create_record(NewContentRecord {
        title: format!("{} (translating...)", source.title),
        body: source.body,
        excerpt: String::new(),
        status: "draft".to_string(),
        kind: source.kind,
    })?;
    content.set_language(variant_id, target_host)?;
    content.link_variants(content_id, variant_id)?;

    // The platform may have copied metadata from the source record into the
    // new draft; stale project records must not come along with it.
    store.delete_project(variant_id)?;

    info!(
        source = content_id,
        variant = variant_id,
        language = target_host,
        "Created draft variant for target language"
    );

    Ok(variant_id)
}
