//! OpenSpec project configuration
//!
//! Loads `openspec/config.yaml` (or `config.yml`) from a project root. The
//! file is optional and every field is validated on its own: a bad field is
//! reported through [`Warnings`] and dropped, its valid siblings survive.
//!
//! ```rust,ignore
//! use openspec_config::{load_project_config, Warnings};
//!
//! let mut warnings = Warnings::new();
//! if let Some(config) = load_project_config(project_root, &mut warnings)? {
//!     println!("default schema: {:?}", config.schema);
//! }
//! ```

#![warn(unreachable_pub)]

pub mod error;
pub mod project;
pub mod warnings;

pub use error::{ConfigError, ConfigResult};
pub use project::{
    config_dir, find_config_file, load_project_config, parse_project_config, ProjectConfig,
    MAX_CONTEXT_BYTES,
};
pub use warnings::Warnings;
