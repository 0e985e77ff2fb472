//! Testing utilities for the OpenSpec workspace
//!
//! [`TestEnv`] lays out an isolated project root, data home and package root
//! in a temp directory so tests can populate any tier independently.

#![allow(missing_docs)]

use openspec_schema::locator::{package_schemas_dir, project_schemas_dir, user_schemas_dir};
use openspec_schema::{SchemaLocator, SchemaSource};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestEnv {
    _tmp: TempDir,
    pub project: PathBuf,
    pub data_home: PathBuf,
    pub package: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let project = tmp.path().join("project");
        let data_home = tmp.path().join("data");
        let package = tmp.path().join("package");
        for dir in [&project, &data_home, &package] {
            fs::create_dir_all(dir).expect("create fixture dir");
        }
        Self {
            _tmp: tmp,
            project,
            data_home,
            package,
        }
    }

    /// Locator over this environment with the project tier enabled
    pub fn locator(&self) -> SchemaLocator {
        self.two_tier_locator().with_project_root(&self.project)
    }

    /// Locator over this environment without a project root
    pub fn two_tier_locator(&self) -> SchemaLocator {
        SchemaLocator::new(&self.package, &self.data_home)
    }

    pub fn tier_dir(&self, source: SchemaSource) -> PathBuf {
        match source {
            SchemaSource::Project => project_schemas_dir(&self.project),
            SchemaSource::User => user_schemas_dir(&self.data_home),
            SchemaSource::Package => package_schemas_dir(&self.package),
        }
    }

    /// Write `schema.yaml` for `name` into a tier, returning the schema dir
    pub fn write_schema(&self, source: SchemaSource, name: &str, yaml: &str) -> PathBuf {
        let dir = self.tier_dir(source).join(name);
        fs::create_dir_all(&dir).expect("create schema dir");
        fs::write(dir.join("schema.yaml"), yaml).expect("write schema.yaml");
        dir
    }

    /// Write a minimal valid schema plus templates for `artifacts` (ids in order,
    /// each requiring the previous one)
    pub fn write_simple_schema(
        &self,
        source: SchemaSource,
        name: &str,
        artifacts: &[&str],
    ) -> PathBuf {
        let dir = self.write_schema(source, name, &simple_schema_yaml(name, artifacts));
        for id in artifacts {
            let template = dir.join("templates").join(format!("{id}.md"));
            write_file(&template, &format!("# {id} template\n"));
        }
        dir
    }

    pub fn write_config(&self, file_name: &str, yaml: &str) -> PathBuf {
        let path = self.project.join("openspec").join(file_name);
        write_file(&path, yaml);
        path
    }

    pub fn change_dir(&self, name: &str) -> PathBuf {
        self.project.join("openspec").join("changes").join(name)
    }

    pub fn make_change(&self, name: &str) -> PathBuf {
        let dir = self.change_dir(name);
        fs::create_dir_all(&dir).expect("create change dir");
        dir
    }

    pub fn write_binding(&self, change: &str, yaml: &str) -> PathBuf {
        let path = self.make_change(change).join(".openspec.yaml");
        write_file(&path, yaml);
        path
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

pub fn simple_schema_yaml(name: &str, artifacts: &[&str]) -> String {
    let mut out = format!("name: {name}\nversion: 1\ndescription: {name} workflow\nartifacts:\n");
    let mut previous: Option<&str> = None;
    for id in artifacts {
        out.push_str(&format!(
            "  - id: {id}\n    generates: {id}.md\n    template: {id}.md\n    description: {id} doc\n"
        ));
        if let Some(prev) = previous {
            out.push_str(&format!("    requires: [{prev}]\n"));
        }
        previous = Some(id);
    }
    out
}

pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, content).expect("write fixture file");
}
