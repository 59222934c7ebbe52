//! Playback loop: the unattended control loop of the radio
//!
//! Owns the playlist cursor and the current catalog snapshot, drives
//! catalog refreshes, now-playing announcements, and track streams. The
//! loop runs until its cooperative stop flag is cleared; no per-track or
//! per-publish error ever unwinds past one iteration.
//!
//! State machine, evaluated once per iteration:
//! - stop flag cleared → signal end-of-stream, exit
//! - empty snapshot → timed idle, then refresh and retry
//! - cursor past the end → refresh, cursor back to 0 (the playlist
//!   restarts from the top whether or not the listing changed)
//! - otherwise → announce, stream (failures logged and skipped), advance

use crate::catalog::{Catalog, CatalogSnapshot};
use crate::pipeline::PipelineSink;
use crate::streamer::TrackStreamer;
use aircast_common::events::NowPlayingBus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Cooperative stop handle for a running [`PlayerEngine`]
#[derive(Clone)]
pub struct PlayerHandle {
    running: Arc<AtomicBool>,
}

impl PlayerHandle {
    /// Ask the loop to stop. The in-flight track finishes its current
    /// chunk loop before the flag is rechecked.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// The continuous player: playlist position plus everything it drives
pub struct PlayerEngine {
    catalog: Catalog,
    streamer: TrackStreamer,
    bus: Arc<NowPlayingBus>,
    sink: Arc<dyn PipelineSink>,
    snapshot: CatalogSnapshot,
    cursor: usize,
    running: Arc<AtomicBool>,
    idle_wait: Duration,
}

impl PlayerEngine {
    /// Construct the engine, taking the initial catalog snapshot
    pub async fn new(
        catalog: Catalog,
        streamer: TrackStreamer,
        bus: Arc<NowPlayingBus>,
        sink: Arc<dyn PipelineSink>,
        idle_wait: Duration,
    ) -> Self {
        let snapshot = catalog.list().await;
        info!(tracks = snapshot.len(), "initial catalog snapshot");
        Self {
            catalog,
            streamer,
            bus,
            sink,
            snapshot,
            cursor: 0,
            running: Arc::new(AtomicBool::new(true)),
            idle_wait,
        }
    }

    /// Handle used to stop the loop from outside
    pub fn handle(&self) -> PlayerHandle {
        PlayerHandle {
            running: Arc::clone(&self.running),
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }

    /// Run until stopped, then signal end-of-stream downstream so the
    /// transport terminates cleanly for listeners
    pub async fn run(mut self) {
        info!("playback loop started");
        while self.running.load(Ordering::SeqCst) {
            // A pass over a warm catalog may never hit a pending await;
            // yield so stop signals and timers on this worker still run
            tokio::task::yield_now().await;
            self.step().await;
        }
        info!("playback loop stopping; signalling end of stream");
        self.sink.finish().await;
    }

    /// One iteration of the playback state machine.
    ///
    /// Public so tests can drive the loop deterministically.
    pub async fn step(&mut self) {
        if self.snapshot.is_empty() {
            info!("no tracks in catalog; waiting");
            sleep(self.idle_wait).await;
            self.refresh().await;
            return;
        }

        if self.cursor >= self.snapshot.len() {
            self.refresh().await;
            // Restart from the top even when the listing is unchanged
            self.cursor = 0;
            return;
        }

        let track = self.snapshot.tracks()[self.cursor].clone();
        self.bus.announce(&track);
        if let Err(e) = self.streamer.stream(&track).await {
            warn!(track = %track, error = %e, "track failed; skipping");
        }
        self.cursor += 1;
    }

    /// Refresh the snapshot; a changed listing replaces it and rewinds
    /// the cursor
    async fn refresh(&mut self) {
        let (snapshot, changed) = self.catalog.refresh_if_changed(&self.snapshot).await;
        if changed {
            self.snapshot = snapshot;
            self.cursor = 0;
        }
    }
}
