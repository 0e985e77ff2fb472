//! Project context
//!
//! Ties a project root to a schema locator with the project tier enabled, so
//! callers pass one value instead of threading the root through every call.

use crate::change::{self, changes_dir};
use crate::error::{ChangeError, InstructionError};
use crate::resolution::{resolve_schema, SchemaResolution};
use openspec_config::{load_project_config, ConfigError, ProjectConfig, Warnings};
use openspec_schema::SchemaLocator;
use std::path::{Component, Path, PathBuf};

/// An OpenSpec project rooted at a directory
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    locator: SchemaLocator,
}

impl Project {
    /// Create project; `locator` gains the project tier for `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, locator: SchemaLocator) -> Self {
        let root = root.into();
        let locator = locator.with_project_root(root.clone());
        Self { root, locator }
    }

    /// Project using the environment-derived user and package tiers
    #[must_use]
    pub fn from_env(root: impl Into<PathBuf>) -> Self {
        Self::new(root, SchemaLocator::from_env())
    }

    /// Project root
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Three-tier schema locator
    #[inline]
    #[must_use]
    pub fn locator(&self) -> &SchemaLocator {
        &self.locator
    }

    /// `<root>/openspec/changes`
    #[must_use]
    pub fn changes_dir(&self) -> PathBuf {
        changes_dir(&self.root)
    }

    /// `<root>/openspec/changes/<name>`, whether or not it exists
    #[must_use]
    pub fn change_dir(&self, name: &str) -> PathBuf {
        self.changes_dir().join(name)
    }

    /// Directory of an existing change
    ///
    /// # Errors
    /// [`InstructionError::ChangeNotFound`] if `name` is not a plain directory
    /// name or the directory does not exist.
    pub fn existing_change_dir(&self, name: &str) -> Result<PathBuf, InstructionError> {
        let dir = self.change_dir(name);
        let mut components = Path::new(name).components();
        let plain = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if plain && dir.is_dir() {
            Ok(dir)
        } else {
            Err(InstructionError::ChangeNotFound {
                name: name.to_string(),
                path: dir,
            })
        }
    }

    /// Load the project config, fresh from disk
    ///
    /// # Errors
    /// [`ConfigError::Io`] if the config file exists but cannot be read.
    pub fn load_config(
        &self,
        warnings: &mut Warnings,
    ) -> Result<Option<ProjectConfig>, ConfigError> {
        load_project_config(&self.root, warnings)
    }

    /// Effective schema for `change` (or for a new change when `None`)
    pub fn resolve_schema(
        &self,
        change: Option<&str>,
        explicit: Option<&str>,
        warnings: &mut Warnings,
    ) -> SchemaResolution {
        let change_dir = change.map(|name| self.change_dir(name));
        resolve_schema(change_dir.as_deref(), explicit, &self.root, &self.locator, warnings)
    }

    /// Create a change bound to the schema chosen by precedence
    /// (explicit, then project config, then default)
    ///
    /// # Errors
    /// See [`change::create_change`].
    pub fn create_change(
        &self,
        name: &str,
        explicit: Option<&str>,
        warnings: &mut Warnings,
    ) -> Result<(PathBuf, SchemaResolution), ChangeError> {
        let resolution = self.resolve_schema(None, explicit, warnings);
        let dir = change::create_change(&self.root, name, &resolution.name, &self.locator)?;
        Ok((dir, resolution))
    }
}
