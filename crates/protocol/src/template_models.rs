//! Workflow template definitions.
//!
//! A template is a ready-made pipeline (for instance "reply to every incoming
//! email") that can be dropped into the editor in one step.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One block of a template.
///
/// `title` and `description` override the catalog defaults when present.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct TemplateBlock {
    #[serde(alias = "type")]
    pub subtype: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TemplateBlock {
    /// A template block that keeps the catalog defaults.
    pub fn subtype(subtype: impl Into<String>) -> Self {
        Self {
            subtype: subtype.into(),
            title: None,
            description: None,
        }
    }
}

/// A named, keyword-addressable workflow template.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct WorkflowTemplate {
    pub id: String,

    pub name: String,

    /// Phrases that select this template when found in a spoken command.
    #[serde(default)]
    pub keywords: Vec<String>,

    pub blocks: Vec<TemplateBlock>,

    /// Confirmation shown to the user once the template is applied.
    #[serde(default)]
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
