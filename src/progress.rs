//! Per-content-record progress aggregation.
//!
//! A logical piece of content may be covered by several remote projects (one
//! per target language, plus historical ones). The aggregator resolves every
//! variant record, walks all of their project records and reports each one;
//! dropping a target language silently would misreport state.

use crate::api::{ApiClient, Progress};
use crate::cache::RequestCache;
use crate::content::ContentStore;
use crate::errors::Result;
use crate::store::{ProjectRecord, ProjectStore};

/// Markup-free classification of one project or of the whole record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectState {
    /// Translation still running, with its percentage.
    Translating(u8),
    /// Translated, proofreading running, with its percentage.
    Proofreading(u8),
    /// Both phases at 100% remotely, completion callback not yet processed.
    AwaitingFinalization,
    /// Locally marked completed.
    Completed,
}

/// One project's view, tagged with the languages it covers.
#[derive(Debug, Clone)]
pub struct LanguageProgress {
    pub project_id: i64,
    pub source_language: String,
    pub target_languages: Vec<String>,
    pub state: ProjectState,
}

/// Everything an admin view needs about one content record.
#[derive(Debug, Clone)]
pub struct ProgressSummary {
    /// One entry per associated project, insertion order.
    pub entries: Vec<LanguageProgress>,
    /// Overall classification across all projects.
    pub overall: ProjectState,
    /// Percentages averaged over all progress readings; `None` when every
    /// project is completed or no reading exists.
    pub average: Option<Progress>,
    /// Host language slugs that already have a project, for target-language
    /// filtering in the submission UI.
    pub host_languages: Vec<String>,
}

/// Summarize the translation state of `content_id`.
///
/// Returns `Ok(None)` when no project is associated, since "never submitted"
/// is not the same as "0% done". Remote reads go through `cache` so one
/// render never asks the service the same question twice.
pub async fn summarize(
    api: &ApiClient,
    store: &ProjectStore,
    content: &dyn ContentStore,
    cache: &mut RequestCache,
    content_id: i64,
) -> Result<Option<ProgressSummary>> {
    let (records, host_languages) = collect_records(store, content, content_id)?;

    if records.is_empty() {
        return Ok(None);
    }

    let mut entries = Vec::with_capacity(records.len());
    let mut readings: Vec<Progress> = Vec::new();

    for record in &records {
        let detail = cache.project(api, record.project_id).await?;
        let progress = cache.progress(api, record.project_id).await?;
        readings.push(progress);

        let state = if record.status == "completed" {
            ProjectState::Completed
        } else if progress.translation < 100 {
            ProjectState::Translating(progress.translation)
        } else if progress.proofreading < 100 {
            ProjectState::Proofreading(progress.proofreading)
        } else {
            ProjectState::AwaitingFinalization
        };

        entries.push(LanguageProgress {
            project_id: record.project_id,
            source_language: detail.source_language,
            target_languages: detail.target_languages,
            state,
        });
    }

    let all_completed = entries
        .iter()
        .all(|entry| entry.state == ProjectState::Completed);

    let average = if all_completed || readings.is_empty() {
        None
    } else {
        let count = readings.len() as u32;
        let translation: u32 = readings.iter().map(|r| r.translation as u32).sum();
        let proofreading: u32 = readings.iter().map(|r| r.proofreading as u32).sum();
        Some(Progress {
            translation: (translation / count) as u8,
            proofreading: (proofreading / count) as u8,
        })
    };

    let overall = classify(&entries);

    Ok(Some(ProgressSummary {
        entries,
        overall,
        average,
        host_languages,
    }))
}

/// All project records behind a logical content record: with variant support
/// every paired language record contributes its projects, otherwise only the
/// record itself.
fn collect_records(
    store: &ProjectStore,
    content: &dyn ContentStore,
    content_id: i64,
) -> Result<(Vec<ProjectRecord>, Vec<String>)> {
    let mut records = Vec::new();
    let mut host_languages = Vec::new();

    if content.supports_variants() {
        let mut saw_self = false;

        for language in content.languages() {
            let Some(variant_id) = content.variant(content_id, &language)? else {
                continue;
            };
            saw_self = saw_self || variant_id == content_id;
            let variant_records = store.get_projects(variant_id)?;
            if !variant_records.is_empty() {
                host_languages.push(language);
                records.extend(variant_records);
            }
        }

        // A record without an assigned language is invisible to variant
        // lookups but can still carry projects (launches against an
        // unmapped target record against the source directly).
        if !saw_self {
            records.extend(store.get_projects(content_id)?);
        }
    } else {
        records = store.get_projects(content_id)?;
    }

    Ok((records, host_languages))
}

/// Overall classification: any project still translating wins, then any
/// still proofreading, then awaiting finalization, and only a fully
/// completed set reports completed.
fn classify(entries: &[LanguageProgress]) -> ProjectState {
    for entry in entries {
        if let ProjectState::Translating(_) = entry.state {
            return entry.state;
        }
    }
    for entry in entries {
        if let ProjectState::Proofreading(_) = entry.state {
            return entry.state;
        }
    }
    if entries
        .iter()
        .any(|entry| entry.state == ProjectState::AwaitingFinalization)
    {
        return ProjectState::AwaitingFinalization;
    }
    ProjectState::Completed
}
