//! Console commands
//!
//! Each command works against the collaborator traits so it runs the same
//! over HTTP and in memory.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{EntityKind, LabelPreset, Record};
use spool_client::{EntitySource, PresetSession, PresetStore, SettingsStore};
use spool_label::{
    ExportFormat, ExportOptions, LinkContext, Page, RenderedItem, export, paginate, render_items,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::args::{JobArgs, PresetCommand};

/// Find a preset by id, then by name (case-insensitive)
pub fn find_preset<'a>(session: &'a PresetSession, key: &str) -> Option<&'a LabelPreset> {
    session.get(key).or_else(|| {
        session
            .presets()
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(key))
    })
}

/// Preset for a job: the named one, else the current one
fn job_preset(session: &PresetSession, job: &JobArgs) -> anyhow::Result<LabelPreset> {
    let preset = match &job.preset {
        Some(key) => find_preset(session, key).with_context(|| format!("no preset named {}", key))?,
        None => session.current(),
    };
    if preset.kind != job.kind {
        bail!(
            "preset {} is for {} labels, not {}",
            preset.name,
            preset.kind,
            job.kind
        );
    }
    Ok(preset.clone())
}

/// Records for `ids`, in order; ids that fail to load are reported and skipped
pub async fn fetch_records<E: EntitySource>(
    source: &E,
    kind: EntityKind,
    ids: &[i64],
    cancel: &CancellationToken,
) -> (Vec<Record>, Vec<String>) {
    let mut records = Vec::with_capacity(ids.len());
    let mut failures = Vec::new();
    for &id in ids {
        if cancel.is_cancelled() {
            break;
        }
        match source.get_entity(kind, id).await {
            Ok(record) => records.push(record),
            Err(e) => {
                let code = ErrorCode::from(&e);
                warn!(%kind, id, %code, error = %e, "Failed to load entity");
                failures.push(format!("{} {}: {} {}", kind, id, code, e));
            }
        }
    }
    (records, failures)
}

/// Handle a `presets` subcommand, returning lines to print
pub async fn run_presets<S: SettingsStore>(
    store: &PresetStore<S>,
    command: PresetCommand,
) -> anyhow::Result<Vec<String>> {
    let mut session = PresetSession::open(store, EntityKind::Spool).await?;

    let changed = match command {
        PresetCommand::List => {
            let current = session.current().id.clone();
            return Ok(session
                .presets()
                .iter()
                .map(|p| {
                    let marker = if p.id == current { '*' } else { ' ' };
                    format!("{} {}  {:<8} {}", marker, p.id, p.kind, p.name)
                })
                .collect());
        }
        PresetCommand::Create { name, kind } => session.create(name, kind).clone(),
        PresetCommand::Duplicate { id, name } => {
            let id = resolve_id(&session, &id)?;
            session.duplicate(&id, name).map_err(AppError::from)?.clone()
        }
        PresetCommand::SetTemplate { id, template } => {
            if template.trim().is_empty() {
                return Err(AppError::new(ErrorCode::TemplateEmpty).into());
            }
            let id = resolve_id(&session, &id)?;
            let preset = session
                .get(&id)
                .with_context(|| format!("no preset {}", id))?
                .clone()
                .with_template(template.replace("\\n", "\n"));
            session.replace(preset.clone()).map_err(AppError::from)?;
            preset
        }
        PresetCommand::Delete { id } => {
            let id = resolve_id(&session, &id)?;
            session.delete(&id).map_err(AppError::from)?
        }
        PresetCommand::Select { id } => {
            let id = resolve_id(&session, &id)?;
            session.select(&id).map_err(AppError::from)?.clone()
        }
    };

    session.save(store).await.map_err(AppError::from)?;
    info!(preset = %changed.id, "Presets updated");
    Ok(vec![format!("{} {}", changed.id, changed.name)])
}

fn resolve_id(session: &PresetSession, key: &str) -> anyhow::Result<String> {
    find_preset(session, key)
        .map(|p| p.id.clone())
        .with_context(|| format!("no preset named {}", key))
}

/// Rendered and paginated job
pub struct Job {
    pub preset: LabelPreset,
    pub items: Vec<RenderedItem>,
    pub pages: Vec<Page>,
    /// Entities that could not be loaded
    pub failures: Vec<String>,
}

/// Load the preset and records for `job`, then render and paginate
pub async fn prepare_job<E: EntitySource, S: SettingsStore>(
    source: &E,
    store: &PresetStore<S>,
    job: &JobArgs,
    link_base: &str,
    cancel: &CancellationToken,
) -> anyhow::Result<Job> {
    let session = PresetSession::open(store, job.kind).await?;
    let preset = job_preset(&session, job)?;
    let prefs = store.load_prefs().await?;

    let (records, failures) = fetch_records(source, job.kind, &job.ids, cancel).await;
    let links = LinkContext {
        base_url: Some(link_base.to_string()),
        use_full_url: prefs.use_full_url,
    };
    let items = render_items(&records, &preset, &links);
    let pages = paginate(&items, &preset.layout)
        .map_err(AppError::from)
        .with_context(|| format!("invalid layout in preset {}", preset.name))?;

    Ok(Job {
        preset,
        items,
        pages,
        failures,
    })
}

/// Page geometry as shown by a preview
#[derive(Debug, Serialize)]
pub struct Preview<'a> {
    pub preset: &'a str,
    pub pages: &'a [Page],
    pub failures: &'a [String],
}

pub fn preview_json(job: &Job) -> anyhow::Result<String> {
    let preview = Preview {
        preset: &job.preset.name,
        pages: &job.pages,
        failures: &job.failures,
    };
    Ok(serde_json::to_string_pretty(&preview)?)
}

/// Outcome of an export command
#[derive(Debug, Default)]
pub struct ExportSummary {
    pub written: Vec<PathBuf>,
    pub failures: Vec<String>,
    pub cancelled: bool,
}

/// Export request beyond the job itself
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub dpi: f32,
    pub per_page: bool,
    pub out_dir: PathBuf,
}

/// Rasterize `job` and write the artifacts into the output directory
#[instrument(skip_all, fields(preset = %job.preset.name, out = %request.out_dir.display()))]
pub async fn export_job(
    job: Job,
    request: &ExportRequest,
    cancel: &CancellationToken,
) -> anyhow::Result<ExportSummary> {
    let mut options = ExportOptions::from_preset(&job.preset, request.format, request.dpi);
    options.per_page |= request.per_page;

    let pages = job.pages;
    let token = cancel.clone();
    let report = tokio::task::spawn_blocking(move || export(&pages, &options, &token))
        .await
        .context("export task failed")?;

    std::fs::create_dir_all(&request.out_dir)
        .with_context(|| format!("cannot create {}", request.out_dir.display()))?;

    let mut summary = ExportSummary {
        failures: job.failures,
        cancelled: report.cancelled,
        ..ExportSummary::default()
    };
    for artifact in &report.artifacts {
        match artifact.write_to(&request.out_dir) {
            Ok(path) => summary.written.push(path),
            Err(e) => {
                warn!(file = %artifact.file_name, error = %e, "Failed to write label");
                summary.failures.push(format!("{}: {}", artifact.file_name, e));
            }
        }
    }
    for failure in report.failures {
        let code = ErrorCode::from(&failure.error);
        summary
            .failures
            .push(format!("{}: {} {}", failure.subject, code, failure.error));
    }

    info!(
        written = summary.written.len(),
        failures = summary.failures.len(),
        cancelled = summary.cancelled,
        "Labels exported"
    );
    Ok(summary)
}

/// Default output folder: `{base}/{kind}-{timestamp}`
pub fn timestamped_dir(base: &Path, kind: EntityKind) -> PathBuf {
    base.join(format!(
        "{}-{}",
        kind,
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    ))
}
