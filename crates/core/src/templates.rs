//! Built-in workflow templates.
//!
//! Templates are shipped as `templates/workflows.yaml` at the project root
//! and embedded into the binary with `rust-embed`. A template is selected by
//! keyword from a free-form command ("auto reply to my emails") and applied
//! to the editor with [`PipelineStore::apply_template`].
//!
//! [`PipelineStore::apply_template`]: crate::editor::PipelineStore::apply_template

use pe_protocol::template_models::WorkflowTemplate;
use rust_embed::RustEmbed;
use thiserror::Error;

/// Embedded files from the project root `templates/` directory.
///
/// - `CARGO_MANIFEST_DIR` = `crates/core`
/// - `../../templates` = project root `templates/`
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../templates"]
pub struct TemplateAssets;

const WORKFLOWS_FILE: &str = "workflows.yaml";

/// Errors raised while loading templates.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// A required template file was not found in embedded assets.
    #[error("Template file not found: {0}")]
    NotFound(String),

    #[error("Failed to parse template file {file}: {source}")]
    Parse {
        file: String,
        source: serde_yaml::Error,
    },
}

/// An ordered set of workflow templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateLibrary {
    templates: Vec<WorkflowTemplate>,
}

impl TemplateLibrary {
    /// Load the embedded built-in templates.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError` if the embedded file is missing or malformed.
    pub fn builtin() -> Result<Self, TemplateError> {
        let file = TemplateAssets::get(WORKFLOWS_FILE)
            .ok_or_else(|| TemplateError::NotFound(WORKFLOWS_FILE.to_string()))?;
        let content = String::from_utf8_lossy(file.data.as_ref());
        Self::from_yaml(&content).map_err(|source| TemplateError::Parse {
            file: WORKFLOWS_FILE.to_string(),
            source,
        })
    }

    /// Parse a YAML list of templates.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        Ok(Self {
            templates: serde_yaml::from_str(content)?,
        })
    }

    /// First template with a keyword contained in `transcript`.
    ///
    /// Matching is case-insensitive and follows file order.
    pub fn find_matching(&self, transcript: &str) -> Option<&WorkflowTemplate> {
        let transcript = transcript.to_lowercase();
        self.templates.iter().find(|template| {
            template
                .keywords
                .iter()
                .any(|keyword| transcript.contains(&keyword.to_lowercase()))
        })
    }

    pub fn by_id(&self, id: &str) -> Option<&WorkflowTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn names(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn templates(&self) -> &[WorkflowTemplate] {
        &self.templates
    }
}
