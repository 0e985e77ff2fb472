//! Template lookup relative to a schema directory

use crate::error::SchemaError;
use crate::schema::Artifact;
use std::path::{Path, PathBuf};

/// Subdirectory searched after the schema directory itself
pub const TEMPLATES_DIR: &str = "templates";

/// Candidate paths for a template, in lookup order
#[must_use]
pub fn template_candidates(schema_dir: &Path, template: &str) -> [PathBuf; 2] {
    [
        schema_dir.join(template),
        schema_dir.join(TEMPLATES_DIR).join(template),
    ]
}

/// First existing candidate for `template`
#[must_use]
pub fn resolve_template_path(schema_dir: &Path, template: &str) -> Option<PathBuf> {
    template_candidates(schema_dir, template)
        .into_iter()
        .find(|p| p.is_file())
}

/// Read the template of `artifact`, verbatim
///
/// # Errors
/// [`SchemaError::TemplateNotFound`] when neither candidate exists,
/// [`SchemaError::Io`] when the file cannot be read.
pub fn load_template(schema_dir: &Path, artifact: &Artifact) -> Result<String, SchemaError> {
    let Some(path) = resolve_template_path(schema_dir, &artifact.template) else {
        return Err(SchemaError::TemplateNotFound {
            artifact: artifact.id.clone(),
            template: artifact.template.clone(),
            candidates: template_candidates(schema_dir, &artifact.template).to_vec(),
        });
    };
    std::fs::read_to_string(&path).map_err(|e| SchemaError::io_error(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(template: &str) -> Artifact {
        Artifact {
            id: "proposal".into(),
            generates: "proposal.md".into(),
            template: template.into(),
            description: "p".into(),
            requires: vec![],
            instruction: None,
        }
    }

    #[test]
    fn direct_path_wins_over_templates_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(TEMPLATES_DIR)).unwrap();
        std::fs::write(dir.path().join("proposal.md"), "direct").unwrap();
        std::fs::write(dir.path().join("templates/proposal.md"), "nested").unwrap();

        assert_eq!(load_template(dir.path(), &artifact("proposal.md")).unwrap(), "direct");
    }

    #[test]
    fn falls_back_to_templates_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(TEMPLATES_DIR)).unwrap();
        std::fs::write(dir.path().join("templates/proposal.md"), "nested\n").unwrap();

        assert_eq!(load_template(dir.path(), &artifact("proposal.md")).unwrap(), "nested\n");
    }

    #[test]
    fn missing_template_lists_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_template(dir.path(), &artifact("nope.md")).unwrap_err();
        match err {
            SchemaError::TemplateNotFound { candidates, .. } => assert_eq!(candidates.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }
}
