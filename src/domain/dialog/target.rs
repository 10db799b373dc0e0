//! Static description of an upstream helper service.

use serde_json::{Map, Value};
use std::time::Duration;

use crate::domain::report::ReportKind;

/// Wire framing an upstream uses for its response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeStyle {
    /// Incremental plain text; every byte is content.
    PlainText,
    /// One JSON document per line.
    Ndjson,
    /// The whole body is a single JSON document.
    SingleDocument,
}

/// How the outbound call is issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamKind {
    /// OpenAI-compatible chat completion with SSE streaming.
    LocalModel,
    /// Plain JSON POST to a helper service.
    RemoteForward,
}

/// Configuration value identifying one upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamTarget {
    /// Human-readable name shown in the connecting notice.
    pub name: String,
    pub kind: UpstreamKind,
    /// Full URL (remote forward) or API base URL (local model).
    pub address: String,
    /// JSON field the question is sent under.
    pub payload_field: String,
    pub envelope: EnvelopeStyle,
    pub timeout: Duration,
    /// Report kind to assume when a nested report does not identify itself.
    pub report_hint: Option<ReportKind>,
    /// Fields merged into every outbound payload.
    pub static_fields: Map<String, Value>,
}

impl UpstreamTarget {
    /// Creates a remote-forward target.
    pub fn remote(
        name: impl Into<String>,
        address: impl Into<String>,
        payload_field: impl Into<String>,
        envelope: EnvelopeStyle,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            kind: UpstreamKind::RemoteForward,
            address: address.into(),
            payload_field: payload_field.into(),
            envelope,
            timeout,
            report_hint: None,
            static_fields: Map::new(),
        }
    }

    /// Creates a chat-completion target rooted at `base_url`.
    pub fn local_model(
        name: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            kind: UpstreamKind::LocalModel,
            address: base_url.into(),
            payload_field: "content".to_string(),
            envelope: EnvelopeStyle::PlainText,
            timeout,
            report_hint: None,
            static_fields: Map::new(),
        }
    }

    pub fn with_report_hint(mut self, kind: ReportKind) -> Self {
        self.report_hint = Some(kind);
        self
    }

    pub fn with_static_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.static_fields.insert(key.into(), value.into());
        self
    }

    /// Builds the outbound JSON body for a remote forward.
    ///
    /// Static fields go in first, then caller extras, and the question last
    /// so it can never be overridden.
    pub fn build_payload(&self, question: &str, extras: &Map<String, Value>) -> Value {
        let mut body = self.static_fields.clone();
        for (key, value) in extras {
            body.insert(key.clone(), value.clone());
        }
        body.insert(self.payload_field.clone(), Value::String(question.to_string()));
        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_places_question_under_field() {
        let target = UpstreamTarget::remote(
            "story",
            "http://localhost:8003/story",
            "user_story",
            EnvelopeStyle::PlainText,
            Duration::from_secs(60),
        );
        let body = target.build_payload("As a user...", &Map::new());
        assert_eq!(body, json!({"user_story": "As a user..."}));
    }

    #[test]
    fn payload_merges_static_and_extra_fields() {
        let target = UpstreamTarget::remote(
            "unittest",
            "http://localhost:8004/generate",
            "code",
            EnvelopeStyle::SingleDocument,
            Duration::from_secs(120),
        )
        .with_static_field("language", "java");

        let mut extras = Map::new();
        extras.insert("targetClass".to_string(), json!("Calculator"));
        extras.insert("methodName".to_string(), json!("add"));

        let body = target.build_payload("class Calculator {}", &extras);
        assert_eq!(
            body,
            json!({
                "language": "java",
                "targetClass": "Calculator",
                "methodName": "add",
                "code": "class Calculator {}"
            })
        );
    }

    #[test]
    fn extras_cannot_override_question() {
        let target = UpstreamTarget::remote(
            "agent",
            "http://localhost:8001/ask",
            "question",
            EnvelopeStyle::Ndjson,
            Duration::from_secs(60),
        );
        let mut extras = Map::new();
        extras.insert("question".to_string(), json!("smuggled"));

        let body = target.build_payload("real", &extras);
        assert_eq!(body["question"], "real");
    }
}
