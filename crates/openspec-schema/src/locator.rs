//! Three-tier schema location
//!
//! Schemas are looked up by name in a fixed priority order:
//!
//! ```text
//! project  <projectRoot>/openspec/schemas/<name>/schema.yaml   (only with a project root)
//! user     <dataHome>/openspec/schemas/<name>/schema.yaml
//! package  <packageRoot>/schemas/<name>/schema.yaml
//! ```
//!
//! The first existing file wins. The same name in several tiers is shadowing,
//! not an error. Without a project root the locator behaves exactly like a
//! two-tier (user, package) resolver.

use crate::error::SchemaError;
use crate::graph::ArtifactGraph;
use crate::schema::{load_schema, Artifact, Schema};
use crate::suggest::UnknownSchema;
use crate::template;
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// File name of a schema definition inside its directory
pub const SCHEMA_FILE: &str = "schema.yaml";

/// Per-tool directory name used under the project root and the data home
pub const TOOL_DIR: &str = "openspec";

/// Environment override for the package tier root
pub const PACKAGE_DIR_ENV: &str = "OPENSPEC_PACKAGE_DIR";

/// Storage tier a schema was found in, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaSource {
    /// `<projectRoot>/openspec/schemas`
    Project,
    /// `<dataHome>/openspec/schemas`
    User,
    /// Schemas bundled with the tool
    Package,
}

impl SchemaSource {
    /// Lowercase tier name
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::User => "user",
            Self::Package => "package",
        }
    }
}

impl fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project tier directory
#[must_use]
pub fn project_schemas_dir(project_root: &Path) -> PathBuf {
    project_root.join(TOOL_DIR).join("schemas")
}

/// User tier directory
#[must_use]
pub fn user_schemas_dir(data_home: &Path) -> PathBuf {
    data_home.join(TOOL_DIR).join("schemas")
}

/// Package tier directory
#[must_use]
pub fn package_schemas_dir(package_root: &Path) -> PathBuf {
    package_root.join("schemas")
}

/// `<home>/.local/share`
#[must_use]
pub fn default_data_home(home: &Path) -> PathBuf {
    home.join(".local").join("share")
}

/// Root of the schemas bundled with this crate
#[must_use]
pub fn bundled_package_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// One candidate location for a schema name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaLocation {
    /// Tier of this candidate
    pub source: SchemaSource,
    /// Path to `schema.yaml`
    pub path: PathBuf,
    /// Whether the file exists
    pub exists: bool,
}

/// Listing entry for a visible schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaInfo {
    /// Schema name (directory name)
    pub name: String,
    /// Winning tier
    pub source: SchemaSource,
    /// Path to the winning `schema.yaml`
    pub path: PathBuf,
    /// Lower-priority tiers that also provide this name
    pub shadows: Vec<SchemaSource>,
    /// Description from the winning file, if it parses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Artifact ids from the winning file, if it parses
    pub artifacts: Vec<String>,
}

/// A located and validated schema
#[derive(Debug, Clone)]
pub struct ResolvedSchema {
    /// Parsed schema
    pub schema: Schema,
    /// Tier it came from
    pub source: SchemaSource,
    /// Path to `schema.yaml`
    pub path: PathBuf,
}

impl ResolvedSchema {
    /// Directory containing `schema.yaml` and its templates
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Dependency graph of the schema
    #[must_use]
    pub fn graph(&self) -> ArtifactGraph {
        ArtifactGraph::from_schema(&self.schema)
    }

    /// Look up an artifact, failing with the valid ids
    ///
    /// # Errors
    /// [`SchemaError::UnknownArtifact`] if `id` is not defined.
    pub fn artifact(&self, id: &str) -> Result<&Artifact, SchemaError> {
        self.schema
            .artifact(id)
            .ok_or_else(|| SchemaError::UnknownArtifact {
                artifact: id.to_string(),
                schema: self.schema.name.clone(),
                valid: self.schema.sorted_artifact_ids(),
            })
    }

    /// Read the template for artifact `id`
    ///
    /// # Errors
    /// Unknown artifact, missing template, or unreadable template file.
    pub fn load_template(&self, id: &str) -> Result<String, SchemaError> {
        let artifact = self.artifact(id)?;
        template::load_template(self.dir(), artifact)
    }
}

/// Ordered schema lookup across project, user and package tiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaLocator {
    project_root: Option<PathBuf>,
    data_home: PathBuf,
    package_root: PathBuf,
}

impl SchemaLocator {
    /// Two-tier locator (user, package)
    #[must_use]
    pub fn new(package_root: impl Into<PathBuf>, data_home: impl Into<PathBuf>) -> Self {
        Self {
            project_root: None,
            data_home: data_home.into(),
            package_root: package_root.into(),
        }
    }

    /// Locator rooted in the current environment
    ///
    /// Data home is `$XDG_DATA_HOME`, else `$HOME/.local/share`. Package root
    /// is `$OPENSPEC_PACKAGE_DIR`, else the schemas bundled with this crate.
    #[must_use]
    pub fn from_env() -> Self {
        let data_home = non_empty_env("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| non_empty_env("HOME").map(|home| default_data_home(Path::new(&home))))
            .unwrap_or_else(|| PathBuf::from(".local").join("share"));
        let package_root = non_empty_env(PACKAGE_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(bundled_package_root);
        Self::new(package_root, data_home)
    }

    /// Enable the project tier
    #[must_use]
    pub fn with_project_root(mut self, project_root: impl Into<PathBuf>) -> Self {
        self.project_root = Some(project_root.into());
        self
    }

    /// Project root, if the project tier is enabled
    #[inline]
    #[must_use]
    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Tier directories in priority order
    #[must_use]
    pub fn tiers(&self) -> Vec<(SchemaSource, PathBuf)> {
        let mut tiers = Vec::with_capacity(3);
        if let Some(root) = &self.project_root {
            tiers.push((SchemaSource::Project, project_schemas_dir(root)));
        }
        tiers.push((SchemaSource::User, user_schemas_dir(&self.data_home)));
        tiers.push((SchemaSource::Package, package_schemas_dir(&self.package_root)));
        tiers
    }

    /// Every candidate location for `name`, in priority order
    #[must_use]
    pub fn locations(&self, name: &str) -> Vec<SchemaLocation> {
        if !is_valid_schema_name(name) {
            return Vec::new();
        }
        self.tiers()
            .into_iter()
            .map(|(source, dir)| {
                let path = dir.join(name).join(SCHEMA_FILE);
                let exists = path.is_file();
                SchemaLocation {
                    source,
                    path,
                    exists,
                }
            })
            .collect()
    }

    /// Path of the highest-priority existing `schema.yaml` for `name`
    #[must_use]
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        self.find(name).map(|loc| loc.path)
    }

    fn find(&self, name: &str) -> Option<SchemaLocation> {
        self.locations(name).into_iter().find(|loc| loc.exists)
    }

    /// Names visible in each tier
    #[must_use]
    pub fn catalog(&self) -> BTreeMap<SchemaSource, Vec<String>> {
        self.tiers()
            .into_iter()
            .map(|(source, dir)| (source, schema_names_in(&dir)))
            .collect()
    }

    /// All visible schema names
    #[must_use]
    pub fn names(&self) -> BTreeSet<String> {
        self.catalog().into_values().flatten().collect()
    }

    /// Every visible schema once, with winning tier and shadowed tiers
    #[must_use]
    pub fn list_all(&self) -> Vec<SchemaInfo> {
        let mut infos: BTreeMap<String, SchemaInfo> = BTreeMap::new();

        for (source, dir) in self.tiers() {
            for name in schema_names_in(&dir) {
                match infos.entry(name) {
                    Entry::Vacant(entry) => {
                        let path = dir.join(entry.key()).join(SCHEMA_FILE);
                        let name = entry.key().clone();
                        entry.insert(SchemaInfo {
                            name,
                            source,
                            path,
                            shadows: Vec::new(),
                            description: None,
                            artifacts: Vec::new(),
                        });
                    }
                    Entry::Occupied(mut entry) => entry.get_mut().shadows.push(source),
                }
            }
        }

        infos
            .into_values()
            .map(|mut info| {
                match load_schema(&info.path) {
                    Ok(schema) => {
                        info.description = Some(schema.description);
                        info.artifacts = schema.artifacts.into_iter().map(|a| a.id).collect();
                    }
                    Err(e) => debug!(schema = %info.name, error = %e, "listing unparseable schema"),
                }
                info
            })
            .collect()
    }

    /// Locate and load `name`
    ///
    /// # Errors
    /// [`SchemaError::NotFound`] with suggestions when no tier has it; load
    /// errors from the winning file otherwise.
    pub fn resolve(&self, name: &str) -> Result<ResolvedSchema, SchemaError> {
        let Some(location) = self.find(name) else {
            return Err(SchemaError::NotFound(Box::new(UnknownSchema::new(
                name,
                self.catalog(),
            ))));
        };

        debug!(
            schema = name,
            source = %location.source,
            path = %location.path.display(),
            "resolved schema"
        );
        let schema = load_schema(&location.path)?;
        Ok(ResolvedSchema {
            schema,
            source: location.source,
            path: location.path,
        })
    }
}

/// Schema names must be a single plain path component
#[must_use]
pub fn is_valid_schema_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

fn schema_names_in(dir: &Path) -> Vec<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "schema tier not readable");
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().join(SCHEMA_FILE).is_file())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();
    names
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
