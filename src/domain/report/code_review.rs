//! Markdown template for code-review reports.

use serde::Deserialize;
use serde_json::Value;
use std::fmt::Write;

use super::{join_classes, RenderError, ReportKind, ReportRenderer, NONE_FOUND};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CodeReviewReport {
    design_patterns: Vec<DesignPattern>,
    design_issues: Vec<DesignIssue>,
    quality_score: f64,
    suggestions: Vec<String>,
    #[serde(default)]
    graphviz: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DesignPattern {
    pattern: String,
    #[serde(default)]
    classes: Vec<String>,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct DesignIssue {
    issue: String,
    #[serde(default)]
    classes: Vec<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    severity: Option<String>,
}

/// Renders `designPatterns` / `designIssues` / `qualityScore` / `suggestions`
/// reports, with an optional graphviz class diagram.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodeReviewRenderer;

impl ReportRenderer for CodeReviewRenderer {
    fn kind(&self) -> ReportKind {
        ReportKind::CodeReview
    }

    fn render(&self, document: &Value) -> Result<String, RenderError> {
        let report = CodeReviewReport::deserialize(document)
            .map_err(|e| RenderError::Malformed(e.to_string()))?;

        let mut out = String::new();

        out.push_str("## Design Patterns\n\n");
        if report.design_patterns.is_empty() {
            out.push_str(NONE_FOUND);
            out.push('\n');
        }
        for p in &report.design_patterns {
            let _ = write!(out, "- **{}** ({})", p.pattern, join_classes(&p.classes));
            if !p.description.is_empty() {
                let _ = write!(out, ": {}", p.description);
            }
            out.push('\n');
        }

        out.push_str("\n## Design Issues\n\n");
        if report.design_issues.is_empty() {
            out.push_str(NONE_FOUND);
            out.push('\n');
        }
        for i in &report.design_issues {
            let _ = write!(out, "- **{}**", i.issue);
            if let Some(severity) = i.severity.as_deref().filter(|s| !s.is_empty()) {
                let _ = write!(out, " [{}]", severity);
            }
            let _ = write!(out, " ({})", join_classes(&i.classes));
            if !i.description.is_empty() {
                let _ = write!(out, ": {}", i.description);
            }
            out.push('\n');
        }

        let _ = write!(
            out,
            "\n## Quality Score\n\n**{}/100**\n",
            report.quality_score.round() as i64
        );

        out.push_str("\n## Suggestions\n\n");
        if report.suggestions.is_empty() {
            out.push_str(NONE_FOUND);
            out.push('\n');
        }
        for (n, suggestion) in report.suggestions.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", n + 1, suggestion);
        }

        if let Some(dot) = report.graphviz.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let _ = write!(out, "\n## Class Diagram\n\n```dot\n{}\n```\n", dot);
        }

        Ok(out)
    }
}
