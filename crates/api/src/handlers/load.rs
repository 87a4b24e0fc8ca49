//! The load form: render it, validate submissions, and load fixtures.
//!
//! A submission names one action through its submit button. Validation
//! problems re-render the form with field errors and never touch the
//! database. Everything past validation ends in a flash message and a
//! redirect back to the form.

use std::path::{Path as FsPath, PathBuf};

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Response;
use smuggler_core::fixture::{FixtureError, FixtureRecord};
use smuggler_core::fixture_dir::{list_fixture_files, resolve_picked, sanitize_filename};
use smuggler_core::messages::Message;
use smuggler_db::fixtures::{FixtureLoad, LoadSummary};
use tempfile::NamedTempFile;

use crate::config::FixtureSettings;
use crate::error::AppResult;
use crate::extractors::Settings;
use crate::flash::{redirect_with_messages, render_page, PendingMessages};
use crate::middleware::rbac::RequireStaff;
use crate::state::AppState;
use crate::templates;
use crate::upload::{self, UploadError, UploadedFile};

pub const LOAD_DATA_URL: &str = "/admin/load-data/";

/// Prefix of every load failure message.
pub const LOAD_ERROR_PREFIX: &str = "An exception occurred while loading data: ";

const FIELD_REQUIRED: &str = "This field is required.";
const EMPTY_FILE: &str = "The submitted file is empty.";
const NO_FIXTURE_DIR: &str = "No fixture directory is configured.";

// ---------------------------------------------------------------------------
// Submission decoding
// ---------------------------------------------------------------------------

/// What the submit button asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadAction {
    /// No submit button named; nothing happens.
    None,
    /// Load the uploaded files.
    Load,
    /// Load files picked from the fixture directory.
    LoadFromDisk,
    /// Load the uploaded files and store them in the fixture directory.
    LoadAndSave,
}

impl LoadAction {
    /// Pick the action from the submit buttons present.
    ///
    /// `_loadfromdisk` wins over `_loadandsave`, which wins over `_load`.
    pub fn from_buttons(load: bool, load_from_disk: bool, load_and_save: bool) -> Self {
        if load_from_disk {
            Self::LoadFromDisk
        } else if load_and_save {
            Self::LoadAndSave
        } else if load {
            Self::Load
        } else {
            Self::None
        }
    }
}

/// A decoded multipart submission.
#[derive(Debug)]
struct Submission {
    action: LoadAction,
    files: Vec<UploadedFile>,
    picked: Vec<String>,
}

impl Submission {
    async fn read(mut multipart: Multipart, settings: &FixtureSettings) -> Result<Self, UploadError> {
        let (mut load, mut from_disk, mut and_save) = (false, false, false);
        let mut files = Vec::new();
        let mut picked = Vec::new();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "file" => {
                    let client_name = field.file_name().unwrap_or("").to_string();
                    let upload =
                        UploadedFile::receive(client_name.clone(), field, settings.upload_max_memory_size)
                            .await?;
                    // Browsers send an unnamed, empty part when no file was chosen.
                    if client_name.is_empty() && upload.is_empty() {
                        continue;
                    }
                    files.push(upload);
                }
                // Scripted clients post picks as `file_0`, `file_1`, ...
                name if name == "picked_file" || is_indexed_pick(name) => {
                    let value = field.text().await?;
                    if !value.trim().is_empty() {
                        picked.push(value);
                    }
                }
                "_load" => load = true,
                "_loadfromdisk" => from_disk = true,
                "_loadandsave" => and_save = true,
                _ => {}
            }
        }

        Ok(Self {
            action: LoadAction::from_buttons(load, from_disk, and_save),
            files,
            picked,
        })
    }
}

fn is_indexed_pick(name: &str) -> bool {
    name.strip_prefix("file_")
        .is_some_and(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
}

// ---------------------------------------------------------------------------
// Form rendering
// ---------------------------------------------------------------------------

/// Validation errors shown on the re-rendered form.
#[derive(Debug, Default)]
struct FormErrors {
    form: Vec<String>,
    file: Vec<String>,
    picked_file: Vec<String>,
}

impl FormErrors {
    fn is_empty(&self) -> bool {
        self.form.is_empty() && self.file.is_empty() && self.picked_file.is_empty()
    }
}

fn render_form(
    state: &AppState,
    settings: &FixtureSettings,
    messages: Vec<Message>,
    errors: &FormErrors,
    picked: &[String],
) -> AppResult<Response> {
    let consumed = !messages.is_empty();
    let mut ctx = templates::page_context("Load data", messages);

    let fixture_files = settings
        .fixture_dir
        .as_deref()
        .map(list_fixture_files)
        .unwrap_or_default();
    ctx.insert("has_fixture_dir", &settings.fixture_dir.is_some());
    ctx.insert(
        "fixture_dir",
        &settings
            .fixture_dir
            .as_deref()
            .map(|dir| dir.display().to_string()),
    );
    ctx.insert("fixture_files", &fixture_files);
    ctx.insert("picked", picked);
    ctx.insert("form_errors", &errors.form);
    ctx.insert("file_errors", &errors.file);
    ctx.insert("picked_file_errors", &errors.picked_file);

    render_page(state, StatusCode::OK, templates::LOAD_DATA_FORM, &ctx, consumed)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /admin/load-data/
pub async fn load_form(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    Settings(settings): Settings,
    PendingMessages(messages): PendingMessages,
) -> AppResult<Response> {
    render_form(&state, &settings, messages, &FormErrors::default(), &[])
}

/// POST /admin/load-data/
pub async fn load_submit(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Settings(settings): Settings,
    PendingMessages(messages): PendingMessages,
    multipart: Multipart,
) -> AppResult<Response> {
    let submission = match Submission::read(multipart, &settings).await {
        Ok(submission) => submission,
        Err(e) => {
            tracing::warn!(user_id = user.user_id, error = %e, "Load submission unreadable");
            let message = Message::error(format!("{LOAD_ERROR_PREFIX}{e}"));
            return Ok(redirect_with_messages(&state, LOAD_DATA_URL, &[message]));
        }
    };
    tracing::debug!(
        user_id = user.user_id,
        action = ?submission.action,
        files = submission.files.len(),
        picked = submission.picked.len(),
        "Load form submitted"
    );

    let sources = match validate(&settings, &submission) {
        Ok(Some(sources)) => sources,
        Ok(None) => {
            let errors = FormErrors::default();
            return render_form(&state, &settings, messages, &errors, &submission.picked);
        }
        Err(errors) => {
            return render_form(&state, &settings, messages, &errors, &submission.picked);
        }
    };

    let save_dir = match submission.action {
        LoadAction::LoadAndSave => settings.fixture_dir.as_deref(),
        _ => None,
    };

    let message = match run_load(&state, &sources, save_dir).await {
        Ok(summary) => {
            tracing::info!(
                user_id = user.user_id,
                objects = summary.objects,
                files = summary.files,
                "Fixtures loaded"
            );
            Message::info(format!(
                "{} object(s) from {} file(s) loaded with success.",
                summary.objects, summary.files
            ))
        }
        Err(e) => {
            tracing::warn!(user_id = user.user_id, error = %e, "Fixture load failed");
            Message::error(format!("{LOAD_ERROR_PREFIX}{e}"))
        }
    };

    Ok(redirect_with_messages(&state, LOAD_DATA_URL, &[message]))
}

// ---------------------------------------------------------------------------
// Validation and loading
// ---------------------------------------------------------------------------

/// Where the records of one fixture file come from.
enum Source<'a> {
    Upload(&'a UploadedFile),
    Disk(PathBuf),
}

impl Source<'_> {
    async fn records(&self) -> Result<Vec<FixtureRecord>, FixtureError> {
        match self {
            Source::Upload(upload) => upload.parse().await,
            Source::Disk(path) => upload::parse_file(path).await,
        }
    }
}

/// Check a submission against the form rules.
///
/// `Ok(None)` means no action was requested.
fn validate<'a>(
    settings: &FixtureSettings,
    submission: &'a Submission,
) -> Result<Option<Vec<Source<'a>>>, FormErrors> {
    let mut errors = FormErrors::default();

    let sources: Vec<Source<'a>> = match submission.action {
        LoadAction::None => return Ok(None),
        LoadAction::Load | LoadAction::LoadAndSave => {
            if submission.action == LoadAction::LoadAndSave && settings.fixture_dir.is_none() {
                errors.form.push(NO_FIXTURE_DIR.to_string());
            }
            if submission.files.is_empty() {
                errors.file.push(FIELD_REQUIRED.to_string());
            } else if submission.files.iter().any(UploadedFile::is_empty) {
                errors.file.push(EMPTY_FILE.to_string());
            }
            if submission.action == LoadAction::LoadAndSave
                && submission
                    .files
                    .iter()
                    .any(|f| sanitize_filename(f.name()).is_none())
            {
                errors.file.push(FIELD_REQUIRED.to_string());
            }
            submission.files.iter().map(Source::Upload).collect()
        }
        LoadAction::LoadFromDisk => match settings.fixture_dir.as_deref() {
            None => {
                errors.form.push(NO_FIXTURE_DIR.to_string());
                Vec::new()
            }
            Some(dir) => {
                if submission.picked.is_empty() {
                    errors.picked_file.push(FIELD_REQUIRED.to_string());
                }
                let mut sources = Vec::with_capacity(submission.picked.len());
                for name in &submission.picked {
                    match resolve_picked(dir, name) {
                        Some(path) => sources.push(Source::Disk(path)),
                        None => errors.picked_file.push(format!(
                            "Select a valid choice. {name} is not one of the available choices."
                        )),
                    }
                }
                sources
            }
        },
    };

    errors.file.dedup();
    if errors.is_empty() {
        Ok(Some(sources))
    } else {
        Err(errors)
    }
}

/// Load every source in one transaction.
///
/// With `save_dir`, uploads are first written to temporary files inside it; a
/// failed write rolls the load back. The temporary files replace their
/// targets only once the commit succeeded, so a failed load leaves existing
/// fixtures untouched.
async fn run_load(
    state: &AppState,
    sources: &[Source<'_>],
    save_dir: Option<&FsPath>,
) -> Result<LoadSummary, FixtureError> {
    let mut parsed = Vec::with_capacity(sources.len());
    for source in sources {
        parsed.push(source.records().await?);
    }

    let mut load = FixtureLoad::begin(&state.pool, &state.registry).await?;
    for records in &parsed {
        load.apply_file(records).await?;
    }

    let mut staged = Vec::new();
    if let Some(dir) = save_dir {
        for source in sources {
            let Source::Upload(upload) = source else {
                continue;
            };
            // Names were checked during validation.
            let Some(name) = sanitize_filename(upload.name()) else {
                continue;
            };
            staged.push((stage(upload, dir).await?, dir.join(name)));
        }
    }

    // Dropping the staged files on any error below deletes them.
    let summary = load.commit().await?;

    for (temp, dest) in staged {
        temp.persist(&dest).map_err(|e| FixtureError::Io(e.error))?;
        tracing::info!(path = %dest.display(), "Saved uploaded fixture");
    }
    Ok(summary)
}

/// Copy an upload into a hidden temporary file inside `dir`.
async fn stage(upload: &UploadedFile, dir: &FsPath) -> Result<NamedTempFile, FixtureError> {
    let temp = tempfile::Builder::new()
        .prefix(".smuggler-")
        .suffix(".part")
        .tempfile_in(dir)?;
    upload.save_to(temp.path()).await?;
    Ok(temp)
}
