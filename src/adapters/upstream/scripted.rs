//! Scripted upstream for testing.
//!
//! Replays pre-configured chunks instead of calling a real service, and
//! records every request it was opened with.
//!
//! # Example
//!
//! ```ignore
//! let upstream = ScriptedUpstream::new();
//! upstream.script(vec![RawChunk::Data(b"{\"chunk\":\"hi\"}\n".to_vec())]);
//!
//! let chunks: Vec<RawChunk> = upstream.open(&target, request).collect().await;
//! assert_eq!(chunks[0], RawChunk::connecting(&target.name));
//! ```

use futures::stream;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::domain::dialog::UpstreamTarget;
use crate::ports::{RawChunk, RawChunkStream, UpstreamAdapter, UpstreamError, UpstreamRequest};

#[derive(Debug, Clone)]
enum Script {
    /// Connect successfully, then replay these chunks.
    Chunks(Vec<RawChunk>),
    /// Fail before connecting.
    Refuse(UpstreamError),
}

/// Upstream adapter that replays scripts in order.
///
/// When no script is queued, the upstream connects and sends nothing.
#[derive(Debug, Clone, Default)]
pub struct ScriptedUpstream {
    scripts: Arc<Mutex<VecDeque<Script>>>,
    requests: Arc<Mutex<Vec<UpstreamRequest>>>,
}

impl ScriptedUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful response made of `chunks`.
    pub fn script(&self, chunks: Vec<RawChunk>) -> &Self {
        self.push(Script::Chunks(chunks));
        self
    }

    /// Queues a response that fails before the connected notice.
    pub fn refuse(&self, error: UpstreamError) -> &Self {
        self.push(Script::Refuse(error));
        self
    }

    /// Requests seen so far, oldest first.
    pub fn requests(&self) -> Vec<UpstreamRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn open_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    fn push(&self, script: Script) {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts.push_back(script);
        }
    }

    fn next_script(&self) -> Script {
        self.scripts
            .lock()
            .ok()
            .and_then(|mut s| s.pop_front())
            .unwrap_or(Script::Chunks(Vec::new()))
    }
}

impl UpstreamAdapter for ScriptedUpstream {
    fn open(&self, target: &UpstreamTarget, request: UpstreamRequest) -> RawChunkStream {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        let mut chunks = vec![RawChunk::connecting(&target.name)];
        match self.next_script() {
            Script::Chunks(scripted) => {
                chunks.push(RawChunk::connected());
                chunks.extend(scripted);
            }
            Script::Refuse(error) => chunks.push(RawChunk::Failed(error)),
        }
        Box::pin(stream::iter(chunks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dialog::EnvelopeStyle;
    use futures::StreamExt;
    use std::time::Duration;

    fn target() -> UpstreamTarget {
        UpstreamTarget::remote("story", "http://story", "user_story", EnvelopeStyle::PlainText, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn replays_scripts_in_order() {
        let upstream = ScriptedUpstream::new();
        upstream
            .script(vec![RawChunk::Data(b"one".to_vec())])
            .refuse(UpstreamError::transport("down"));

        let first: Vec<RawChunk> = upstream.open(&target(), UpstreamRequest::new("a")).collect().await;
        let second: Vec<RawChunk> = upstream.open(&target(), UpstreamRequest::new("b")).collect().await;
        let third: Vec<RawChunk> = upstream.open(&target(), UpstreamRequest::new("c")).collect().await;

        assert_eq!(first.len(), 3);
        assert_eq!(second[1], RawChunk::Failed(UpstreamError::transport("down")));
        assert_eq!(third, vec![RawChunk::connecting("story"), RawChunk::connected()]);
        assert_eq!(upstream.open_count(), 3);
        assert_eq!(upstream.requests()[1].question, "b");
    }
}
