//! Change creation

use crate::error::ChangeError;
use crate::metadata::{ensure_known_schema, write_change_metadata, ChangeMetadata};
use once_cell::sync::Lazy;
use openspec_schema::SchemaLocator;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

static KEBAB_CASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("kebab-case pattern is valid"));

/// `<projectRoot>/openspec/changes`
#[must_use]
pub fn changes_dir(project_root: &Path) -> PathBuf {
    project_root.join("openspec").join("changes")
}

/// Check that `name` is kebab-case (`add-user-auth`)
///
/// # Errors
/// [`ChangeError::InvalidName`] with the most specific reason available.
pub fn validate_change_name(name: &str) -> Result<(), ChangeError> {
    if KEBAB_CASE.is_match(name) {
        return Ok(());
    }

    let reason = if name.is_empty() {
        "name cannot be empty"
    } else if name.chars().any(char::is_uppercase) {
        "use lowercase letters only"
    } else if name.chars().any(char::is_whitespace) {
        "use hyphens instead of spaces"
    } else if name.contains('_') {
        "use hyphens instead of underscores"
    } else if name.starts_with('-') || name.ends_with('-') {
        "name cannot start or end with a hyphen"
    } else if name.contains("--") {
        "name cannot contain consecutive hyphens"
    } else {
        "use only lowercase letters, digits and single hyphens (e.g. add-user-auth)"
    };

    Err(ChangeError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

/// Create `openspec/changes/<name>/` bound to `schema`
///
/// The schema is checked before the directory is created, so an unknown
/// schema leaves nothing behind. A directory whose binding cannot be written
/// is removed again.
///
/// # Errors
/// Invalid name, existing change, unknown schema, or filesystem failure.
pub fn create_change(
    project_root: &Path,
    name: &str,
    schema: &str,
    locator: &SchemaLocator,
) -> Result<PathBuf, ChangeError> {
    validate_change_name(name)?;

    let dir = changes_dir(project_root).join(name);
    if dir.exists() {
        return Err(ChangeError::AlreadyExists {
            name: name.to_string(),
            path: dir,
        });
    }

    ensure_known_schema(schema, locator)?;

    std::fs::create_dir_all(&dir).map_err(|source| ChangeError::Io {
        path: dir.clone(),
        source,
    })?;
    bind_or_remove(&dir, schema, locator)?;

    info!(change = name, schema, path = %dir.display(), "created change");
    Ok(dir)
}

/// Write the binding into a freshly created `dir`; remove `dir` if that fails
fn bind_or_remove(dir: &Path, schema: &str, locator: &SchemaLocator) -> Result<(), ChangeError> {
    let Err(e) = write_change_metadata(dir, &ChangeMetadata::created_today(schema), locator) else {
        return Ok(());
    };
    if let Err(cleanup) = std::fs::remove_dir_all(dir) {
        warn!(path = %dir.display(), error = %cleanup, "could not remove partial change");
    }
    Err(e.into())
}
