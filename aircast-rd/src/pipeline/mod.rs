//! Transport pipeline adapter
//!
//! The external transcode/transport pipeline is reframed here as a
//! synchronous-looking sink: `push` a chunk, read back a [`FlowStatus`].
//! The adapter absorbs all pipeline event-loop mechanics so the playback
//! loop stays a plain sequential state machine. `push` may block under
//! backpressure; the pipeline's blocking, time-based ingestion endpoint is
//! what throttles the push rate to real-time playback, not explicit
//! sleeps.
//!
//! The real implementation lives in [`gst`] behind the `gstreamer` cargo
//! feature; without it the daemon cannot run (constructing the pipeline is
//! the one fatal error path) but the crate still builds and its tests run
//! against fake sinks.

use crate::config::StreamConfig;
use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

#[cfg(feature = "gstreamer")]
pub mod gst;

/// Per-chunk acceptance signal from the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowStatus {
    /// Chunk accepted into the ingestion endpoint
    Accepted,
    /// Chunk refused; the current track should be abandoned
    Rejected(String),
}

/// Ingestion endpoint of the live pipeline session.
///
/// Thread-safe: this is the only resource shared between the playback
/// loop and the pipeline's internal thread.
#[async_trait]
pub trait PipelineSink: Send + Sync {
    /// Enqueue one chunk of raw source bytes, blocking under backpressure
    async fn push(&self, chunk: Bytes) -> FlowStatus;

    /// Signal that no further payload will arrive (end-of-stream)
    async fn finish(&self);
}

/// Construct the process-wide pipeline session.
///
/// Failure here is fatal: the player cannot run without a pipeline.
#[cfg(feature = "gstreamer")]
pub fn build(config: &StreamConfig) -> Result<Arc<dyn PipelineSink>> {
    Ok(Arc::new(gst::GstPipeline::start(config)?))
}

/// Construct the process-wide pipeline session.
///
/// This build carries no pipeline engine, so construction always fails;
/// enable the `gstreamer` feature to produce the RTP transmitter.
#[cfg(not(feature = "gstreamer"))]
pub fn build(config: &StreamConfig) -> Result<Arc<dyn PipelineSink>> {
    let _ = config;
    Err(crate::error::Error::Pipeline(
        "built without the `gstreamer` feature; no transport pipeline available".to_string(),
    ))
}
