//! Build-time generator for class-tag.
//!
//! This crate provides tools for:
//! - Extracting class/base relations from a C++ header (tree-sitter)
//! - Skipping work when the generated header is already up to date
//! - Emitting the tag constants as an include-guarded C++ enum
//!
//! # Usage in a build step
//!
//! ```ignore
//! use class_tag_build::{generate_project, GeneratorConfig};
//!
//! // include/PhysicsEngine2D/Shapes.hpp -> include/PhysicsEngine2D/Constants.hpp
//! generate_project(".", "PhysicsEngine2D", &GeneratorConfig::default(), false)?;
//! ```
//!
//! # Staleness
//!
//! If the output header was modified strictly after the input header, the
//! whole pipeline is skipped and [`Outcome::UpToDate`] is returned. Pass
//! `force = true` to regenerate regardless.
//!
//! # Failure
//!
//! Every stage runs before the first byte is written, and the header is
//! written through a temporary file, so a failed generation leaves the
//! previous header untouched.

mod config;
mod emit;
mod extract;
mod staleness;

pub use config::{ConfigError, GeneratorConfig, HeaderOptions};
pub use emit::{emit_header, render_header};
pub use extract::{CppHeader, ExtractError};
pub use staleness::should_regenerate;

use std::path::{Path, PathBuf};

use class_tag::{tag_hierarchy, Hierarchy, HierarchyError, TagTable};
use tracing::{debug, info, warn};

/// Result of a successful generation.
#[derive(Debug)]
pub enum Outcome {
    /// The output was newer than the input; nothing was done.
    UpToDate,
    /// The header was rewritten.
    Written(TagTable),
}

/// Input and output header paths for `project` under `root_dir`.
///
/// `<root_dir>/include/<project>/<input_file>` and `.../<output_file>`.
pub fn project_paths(
    root_dir: impl AsRef<Path>,
    project: &str,
    config: &GeneratorConfig,
) -> (PathBuf, PathBuf) {
    let dir = root_dir.as_ref().join("include").join(project);
    (dir.join(&config.input_file), dir.join(&config.output_file))
}

/// Main entry point: generate the constants header for `project`.
pub fn generate_project(
    root_dir: impl AsRef<Path>,
    project: &str,
    config: &GeneratorConfig,
    force: bool,
) -> Result<Outcome, GenerateError> {
    let (input, output) = project_paths(root_dir, project, config);
    generate(&input, &output, config, force)
}

/// Generate with explicit input and output paths.
pub fn generate(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &GeneratorConfig,
    force: bool,
) -> Result<Outcome, GenerateError> {
    let input = input.as_ref();
    let output = output.as_ref();

    // 1. Staleness gate
    if !force && !should_regenerate(input, output)? {
        info!(output = %output.display(), "up to date, skipped");
        return Ok(Outcome::UpToDate);
    }

    // 2. Relation stream
    let header = CppHeader::from_file(input).map_err(|e| match e {
        ExtractError::Read { path, .. } => GenerateError::MissingInput { path },
        other => other.into(),
    })?;
    let classes = header
        .include_structs(config.include_structs)
        .classes()?;
    debug!(classes = classes.len(), input = %input.display(), "extracted declarations");

    // 3. Build, resolve, assign
    let hierarchy = Hierarchy::from_classes(&classes, config.inheritance)?;
    let tags = tag_hierarchy(&hierarchy, config.root_policy, config.root.as_deref())?;

    for entry in tags.entries() {
        debug!(class = %entry.name, tag = entry.tag, depth = entry.depth, "assigned tag");
    }
    for edge in tags.stale_edges() {
        warn!(
            class = %edge.class,
            base = %edge.base,
            "class has several bases; only the last one is kept"
        );
    }
    if !tags.unreached().is_empty() {
        warn!(
            classes = %tags.unreached().join(", "),
            "classes outside the root's tree are left untagged"
        );
    }

    // 4. Emit
    emit_header(&tags, &config.header, output)?;
    info!(output = %output.display(), entries = tags.len(), "wrote constants header");

    Ok(Outcome::Written(tags))
}

/// Errors that can occur during generation.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The input header does not exist or cannot be inspected
    #[error("input header {path} is missing or unreadable")]
    MissingInput { path: String },
    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),
    #[error("Hierarchy error: {0}")]
    Hierarchy(#[from] HierarchyError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
