//! Track streamer: one object's bytes, chunked into the pipeline
//!
//! Fetches the whole object, then pushes fixed-size chunks into the
//! pipeline sink in order, watching the per-chunk flow status. Any
//! failure (fetch or flow) aborts only this track; the caller advances
//! the cursor regardless. The streamer never starts or stops the
//! pipeline session itself.

use crate::error::{Error, Result};
use crate::pipeline::{FlowStatus, PipelineSink};
use crate::storage::ObjectStore;
use bytes::Bytes;
use std::sync::Arc;
use tracing::debug;

pub struct TrackStreamer {
    storage: Arc<dyn ObjectStore>,
    sink: Arc<dyn PipelineSink>,
    bucket: String,
    chunk_size: usize,
}

impl TrackStreamer {
    pub fn new(
        storage: Arc<dyn ObjectStore>,
        sink: Arc<dyn PipelineSink>,
        bucket: String,
        chunk_size: usize,
    ) -> Self {
        Self {
            storage,
            sink,
            bucket,
            chunk_size,
        }
    }

    /// Push one track through the pipeline sink.
    ///
    /// `Err(Retrieval)` when the fetch fails, `Err(Flow)` when the
    /// pipeline refuses a chunk mid-track. A zero-length object ends
    /// normally without pushing anything.
    pub async fn stream(&self, track: &str) -> Result<()> {
        debug!(track, "downloading");
        let data = self
            .storage
            .get_object(&self.bucket, track)
            .await
            .map_err(|e| Error::Retrieval(format!("{track}: {e}")))?;

        debug!(track, bytes = data.len(), "pushing to pipeline");
        let data = Bytes::from(data);
        let mut offset = 0;
        while offset < data.len() {
            let end = usize::min(offset + self.chunk_size, data.len());
            match self.sink.push(data.slice(offset..end)).await {
                FlowStatus::Accepted => {}
                FlowStatus::Rejected(reason) => {
                    return Err(Error::Flow(format!("{track}: {reason}")));
                }
            }
            offset = end;
        }

        debug!(track, "track complete");
        Ok(())
    }
}
