//! Remote forward adapter.
//!
//! POSTs `{<payload field>: question, ...}` to the target's address and
//! relays the response body byte-for-byte. Framing is left to the
//! normalizer.

use async_stream::stream;
use futures::StreamExt;
use reqwest::Client;

use super::{check_status, classify_error};
use crate::domain::dialog::UpstreamTarget;
use crate::ports::{RawChunk, RawChunkStream, UpstreamAdapter, UpstreamRequest};

/// Forwards a question to an HTTP helper service.
#[derive(Debug, Clone)]
pub struct RemoteForwardAdapter {
    client: Client,
}

impl RemoteForwardAdapter {
    /// Creates an adapter sharing the process-wide HTTP client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl UpstreamAdapter for RemoteForwardAdapter {
    fn open(&self, target: &UpstreamTarget, request: UpstreamRequest) -> RawChunkStream {
        let client = self.client.clone();
        let target = target.clone();

        Box::pin(stream! {
            yield RawChunk::connecting(&target.name);

            let payload = target.build_payload(&request.question, &request.extras);
            let sent = client
                .post(&target.address)
                .timeout(target.timeout)
                .json(&payload)
                .send()
                .await;

            let response = match sent {
                Ok(response) => response,
                Err(e) => {
                    yield RawChunk::Failed(classify_error(&e, target.timeout));
                    return;
                }
            };
            let response = match check_status(response).await {
                Ok(response) => response,
                Err(e) => {
                    yield RawChunk::Failed(e);
                    return;
                }
            };

            yield RawChunk::connected();

            let mut body = response.bytes_stream();
            while let Some(item) = body.next().await {
                match item {
                    Ok(bytes) if bytes.is_empty() => {}
                    Ok(bytes) => {
                        yield RawChunk::Data(bytes.to_vec());
                    }
                    Err(e) => {
                        yield RawChunk::Failed(classify_error(&e, target.timeout));
                        return;
                    }
                }
            }
        })
    }
}
