//! Stream normalizer - raw upstream chunks to canonical text fragments.
//!
//! Each envelope style frames its body differently:
//!
//! - `PlainText` - every byte is content, decoded as soon as it is valid UTF-8
//! - `Ndjson` - one JSON unit per line; blank lines are separators
//! - `SingleDocument` - the whole body is one unit, interpreted at the end
//!
//! Units are interpreted by [`interpret_unit`]. Notices pass through
//! verbatim, and a `Failed` chunk becomes the last fragment.

use async_stream::stream;
use futures::{Stream, StreamExt};
use serde_json::Value;
use std::pin::Pin;

use super::framing::{LineFramer, Utf8Carry};
use crate::domain::dialog::EnvelopeStyle;
use crate::domain::report::{render_nested, ReportKind};
use crate::ports::{RawChunk, RawChunkStream, UpstreamError};

/// Lazy sequence of canonical output text.
pub type FragmentStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// Review-service control frames whose content has already been streamed.
const SILENT_STATUSES: [&str; 2] = ["stream_started", "completed"];

/// Normalizes an upstream's raw output into canonical fragments.
///
/// Empty fragments are never emitted. The stream ends after the first
/// `Failed` chunk, or when the raw stream ends.
pub fn normalize(
    raw: RawChunkStream,
    style: EnvelopeStyle,
    hint: Option<ReportKind>,
) -> FragmentStream {
    Box::pin(stream! {
        let mut raw = raw;
        let mut framer = Framer::new(style);

        while let Some(chunk) = raw.next().await {
            match chunk {
                RawChunk::Notice(text) => {
                    for fragment in framer.flush(hint) {
                        yield fragment;
                    }
                    yield text;
                }
                RawChunk::Data(bytes) => {
                    for fragment in framer.push(&bytes, hint) {
                        yield fragment;
                    }
                }
                RawChunk::Failed(err) => {
                    for fragment in framer.flush(hint) {
                        yield fragment;
                    }
                    tracing::warn!(error = %err, "upstream stream failed");
                    yield interrupted_fragment(&err);
                    return;
                }
            }
        }

        for fragment in framer.flush(hint) {
            yield fragment;
        }
    })
}

/// Trailing fragment for a failed upstream call.
pub fn interrupted_fragment(err: &UpstreamError) -> String {
    format!("\n[stream interrupted: {}]\n", err)
}

/// Fragment for an `{"error": ...}` unit.
pub fn upstream_error_fragment(message: &str) -> String {
    format!("\n[upstream error] {}\n", message)
}

/// Interprets one framed unit of an Ndjson or SingleDocument body.
///
/// Returns `None` for units that contribute no text.
pub fn interpret_unit(unit: &str, hint: Option<ReportKind>) -> Option<String> {
    if unit.trim().is_empty() {
        return None;
    }

    let value: Value = match serde_json::from_str(unit.trim()) {
        Ok(value) => value,
        Err(_) => return Some(unit.to_string()),
    };

    if let Value::Object(obj) = &value {
        if let Some(chunk) = obj.get("chunk") {
            return Some(text_of(chunk));
        }
        if let Some(nested) = obj.get("review_result") {
            return Some(render_nested(nested, hint));
        }
        if let Some(error) = obj.get("error") {
            return Some(upstream_error_fragment(&text_of(error)));
        }
        if let Some(status) = obj.get("status").and_then(Value::as_str) {
            if SILENT_STATUSES.contains(&status) {
                return None;
            }
        }
    }

    let pretty = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
    Some(format!("{}\n", pretty))
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Per-envelope framing state.
enum Framer {
    Plain(Utf8Carry),
    Lines(LineFramer),
    Document(Vec<u8>),
}

impl Framer {
    fn new(style: EnvelopeStyle) -> Self {
        match style {
            EnvelopeStyle::PlainText => Framer::Plain(Utf8Carry::new()),
            EnvelopeStyle::Ndjson => Framer::Lines(LineFramer::new()),
            EnvelopeStyle::SingleDocument => Framer::Document(Vec::new()),
        }
    }

    fn push(&mut self, bytes: &[u8], hint: Option<ReportKind>) -> Vec<String> {
        match self {
            Framer::Plain(carry) => non_empty(carry.push(bytes)),
            Framer::Lines(lines) => lines
                .push(bytes)
                .iter()
                .filter_map(|line| interpret_unit(line, hint))
                .filter(|f| !f.is_empty())
                .collect(),
            Framer::Document(buf) => {
                buf.extend_from_slice(bytes);
                Vec::new()
            }
        }
    }

    fn flush(&mut self, hint: Option<ReportKind>) -> Vec<String> {
        match self {
            Framer::Plain(carry) => non_empty(carry.finish()),
            Framer::Lines(lines) => lines
                .flush()
                .and_then(|line| interpret_unit(&line, hint))
                .into_iter()
                .filter(|f| !f.is_empty())
                .collect(),
            Framer::Document(buf) => {
                let body = std::mem::take(buf);
                interpret_unit(&String::from_utf8_lossy(&body), hint)
                    .into_iter()
                    .filter(|f| !f.is_empty())
                    .collect()
            }
        }
    }
}

fn non_empty(text: String) -> Vec<String> {
    if text.is_empty() {
        Vec::new()
    } else {
        vec![text]
    }
}
