//! Structured report rendering.
//!
//! Some upstreams answer with a JSON report nested inside their envelope
//! (for example `{"review_result": "<json>"}`). The renderers here turn those
//! reports into markdown. Rendering is fail-open: whenever a report cannot be
//! rendered, the caller gets the raw input text back instead of an error, so
//! a malformed report never breaks the answer stream.

mod code_review;
mod test_generation;

pub use code_review::CodeReviewRenderer;
pub use test_generation::{TestGenerationRenderer, SUGGESTED_NUMERIC_BOUNDARIES};

use serde_json::Value;
use thiserror::Error;

/// Known report shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    CodeReview,
    TestGeneration,
}

impl ReportKind {
    /// Identifies a report by the fields it carries.
    pub fn detect(document: &Value) -> Option<Self> {
        let obj = document.as_object()?;
        if ["designPatterns", "designIssues", "qualityScore"]
            .iter()
            .any(|k| obj.contains_key(*k))
        {
            return Some(ReportKind::CodeReview);
        }
        if ["boundaryValues", "testCode"]
            .iter()
            .any(|k| obj.contains_key(*k))
        {
            return Some(ReportKind::TestGeneration);
        }
        None
    }
}

/// Why a report could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("report is not valid JSON: {0}")]
    NotJson(String),

    #[error("report shape not recognized")]
    UnknownShape,

    #[error("report is malformed: {0}")]
    Malformed(String),
}

/// Renders one kind of structured report into markdown.
pub trait ReportRenderer: Send + Sync {
    fn kind(&self) -> ReportKind;

    fn render(&self, document: &Value) -> Result<String, RenderError>;
}

/// Returns the renderer for a report kind.
pub fn renderer_for(kind: ReportKind) -> &'static dyn ReportRenderer {
    match kind {
        ReportKind::CodeReview => &CodeReviewRenderer,
        ReportKind::TestGeneration => &TestGenerationRenderer,
    }
}

/// Renders a nested report value, returning the raw input on any failure.
///
/// `nested` is usually a string holding JSON, but an inline object is
/// accepted too. `hint` is used when the document does not identify itself.
pub fn render_nested(nested: &Value, hint: Option<ReportKind>) -> String {
    match try_render_nested(nested, hint) {
        Ok(rendered) => rendered,
        Err(err) => {
            tracing::debug!(error = %err, "report left unrendered");
            raw_text(nested)
        }
    }
}

fn try_render_nested(nested: &Value, hint: Option<ReportKind>) -> Result<String, RenderError> {
    let document = match nested {
        Value::String(text) => serde_json::from_str::<Value>(strip_code_fence(text))
            .map_err(|e| RenderError::NotJson(e.to_string()))?,
        Value::Object(_) => nested.clone(),
        _ => return Err(RenderError::UnknownShape),
    };

    let kind = ReportKind::detect(&document)
        .or(hint)
        .ok_or(RenderError::UnknownShape)?;

    let renderer = renderer_for(kind);
    tracing::debug!(kind = ?renderer.kind(), "rendering nested report");
    renderer.render(&document)
}

fn raw_text(nested: &Value) -> String {
    match nested {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Models often wrap JSON in a ```json fence despite being told not to.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };
    match body.find('\n') {
        Some(newline) => &body[newline + 1..],
        None => body,
    }
}

/// Formats a class list for inline display.
fn join_classes(classes: &[String]) -> String {
    if classes.is_empty() {
        "no classes listed".to_string()
    } else {
        classes.join(", ")
    }
}

const NONE_FOUND: &str = "- None found.";
