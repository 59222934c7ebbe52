//! GStreamer pipeline: appsrc → decode → opus → RTP → UDP
//!
//! One pipeline session per process lifetime. Tracks are concatenated
//! into the same appsrc; decodebin handles the track boundaries
//! implicitly, so downstream listeners simply hear one track end and the
//! next begin.
//!
//! The GStreamer bus is serviced on a dedicated thread, independent of
//! the playback loop; the two meet only at `push_buffer`, which is
//! thread-safe and blocks when the live source's internal queue is full.

use crate::config::StreamConfig;
use crate::error::{Error, Result};
use crate::pipeline::{FlowStatus, PipelineSink};
use async_trait::async_trait;
use bytes::Bytes;
use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use std::sync::Mutex;
use std::thread::JoinHandle;
use tracing::{error, info, warn};

pub struct GstPipeline {
    pipeline: gst::Pipeline,
    appsrc: gst_app::AppSrc,
    bus_thread: Mutex<Option<JoinHandle<()>>>,
}

impl GstPipeline {
    /// Build and activate the transport pipeline.
    ///
    /// Any failure here is fatal to the daemon.
    pub fn start(config: &StreamConfig) -> Result<Self> {
        gst::init().map_err(|e| Error::Pipeline(format!("GStreamer init failed: {e}")))?;

        let launch = format!(
            "appsrc name=src is-live=true format=time block=true \
             ! decodebin \
             ! audioconvert \
             ! audioresample \
             ! opusenc \
             ! rtpopuspay pt=111 \
             ! udpsink host={} port={}",
            config.host, config.port
        );

        let pipeline = gst::parse::launch(&launch)
            .map_err(|e| Error::Pipeline(format!("parse_launch failed: {e}")))?
            .downcast::<gst::Pipeline>()
            .map_err(|_| Error::Pipeline("launch string did not yield a pipeline".to_string()))?;

        let appsrc = pipeline
            .by_name("src")
            .and_then(|element| element.downcast::<gst_app::AppSrc>().ok())
            .ok_or_else(|| Error::Pipeline("appsrc element not found".to_string()))?;

        let bus = pipeline
            .bus()
            .ok_or_else(|| Error::Pipeline("pipeline has no bus".to_string()))?;

        pipeline
            .set_state(gst::State::Playing)
            .map_err(|e| Error::Pipeline(format!("cannot set pipeline to PLAYING: {e}")))?;

        // Service bus messages on a dedicated thread; iteration ends when
        // the bus is flushed on teardown.
        let bus_thread = std::thread::Builder::new()
            .name("gst-bus".to_string())
            .spawn(move || {
                for msg in bus.iter_timed(gst::ClockTime::NONE) {
                    use gst::MessageView;
                    match msg.view() {
                        MessageView::Eos(_) => {
                            info!("pipeline reached end of stream");
                            break;
                        }
                        MessageView::Error(err) => {
                            error!(
                                source = ?err.src().map(|s| s.path_string()),
                                error = %err.error(),
                                "pipeline error"
                            );
                            break;
                        }
                        _ => {}
                    }
                }
            })
            .map_err(|e| Error::Pipeline(format!("cannot spawn bus thread: {e}")))?;

        info!(
            host = %config.host,
            port = config.port,
            "transport pipeline playing"
        );

        Ok(Self {
            pipeline,
            appsrc,
            bus_thread: Mutex::new(Some(bus_thread)),
        })
    }
}

#[async_trait]
impl PipelineSink for GstPipeline {
    async fn push(&self, chunk: Bytes) -> FlowStatus {
        let appsrc = self.appsrc.clone();
        // push_buffer blocks while the live source's queue is full; keep
        // that off the async worker threads.
        let result = tokio::task::block_in_place(move || {
            appsrc.push_buffer(gst::Buffer::from_slice(chunk))
        });
        match result {
            Ok(_) => FlowStatus::Accepted,
            Err(flow) => FlowStatus::Rejected(flow.to_string()),
        }
    }

    async fn finish(&self) {
        if let Err(flow) = self.appsrc.end_of_stream() {
            warn!(status = %flow, "end-of-stream signal refused");
        }
    }
}

impl Drop for GstPipeline {
    fn drop(&mut self) {
        if let Err(e) = self.pipeline.set_state(gst::State::Null) {
            warn!(error = %e, "failed to tear down pipeline");
        }
        if let Ok(mut guard) = self.bus_thread.lock() {
            if let Some(handle) = guard.take() {
                let _ = handle.join();
            }
        }
    }
}
