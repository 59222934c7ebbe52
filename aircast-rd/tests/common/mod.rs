//! In-memory fakes shared by the integration tests
#![allow(dead_code)]

use aircast_common::events::NowPlayingBus;
use aircast_rd::error::{Error, Result};
use aircast_rd::pipeline::{FlowStatus, PipelineSink};
use aircast_rd::storage::ObjectStore;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Single-bucket in-memory object store with switchable failures
pub struct FakeStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    fail_gets: Mutex<HashSet<String>>,
    fail_listing: AtomicBool,
}

impl FakeStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            objects: Mutex::new(BTreeMap::new()),
            fail_gets: Mutex::new(HashSet::new()),
            fail_listing: AtomicBool::new(false),
        })
    }

    pub fn put(&self, key: &str, data: Vec<u8>) {
        self.objects.lock().unwrap().insert(key.to_string(), data);
    }

    pub fn remove(&self, key: &str) {
        self.objects.lock().unwrap().remove(key);
    }

    /// Make every fetch of `key` fail while the object stays listed
    pub fn fail_get(&self, key: &str) {
        self.fail_gets.lock().unwrap().insert(key.to_string());
    }

    pub fn set_fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn list_objects(&self, _bucket: &str) -> Result<Vec<String>> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(Error::Storage("listing backend down".to_string()));
        }
        Ok(self.objects.lock().unwrap().keys().cloned().collect())
    }

    async fn get_object(&self, _bucket: &str, key: &str) -> Result<Vec<u8>> {
        if self.fail_gets.lock().unwrap().contains(key) {
            return Err(Error::Storage(format!("connection reset fetching {key}")));
        }
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| Error::Storage(format!("no such object: {key}")))
    }
}

/// One observed push attempt
#[derive(Debug, Clone)]
pub struct PushRecord {
    /// Now-playing value at the moment of the push
    pub now_playing: Option<String>,
    pub chunk: Vec<u8>,
    pub accepted: bool,
}

/// Pipeline sink that records every push along with the now-playing
/// state observed at push time
pub struct RecordingSink {
    bus: Arc<NowPlayingBus>,
    pushes: Mutex<Vec<PushRecord>>,
    reject_track: Mutex<Option<String>>,
    finished: AtomicBool,
}

impl RecordingSink {
    pub fn new(bus: Arc<NowPlayingBus>) -> Arc<Self> {
        Arc::new(Self {
            bus,
            pushes: Mutex::new(Vec::new()),
            reject_track: Mutex::new(None),
            finished: AtomicBool::new(false),
        })
    }

    /// Reject every chunk pushed while `track` is the announced track
    pub fn reject_track(&self, track: &str) {
        *self.reject_track.lock().unwrap() = Some(track.to_string());
    }

    pub fn pushes(&self) -> Vec<PushRecord> {
        self.pushes.lock().unwrap().clone()
    }

    /// Accepted bytes pushed while `track` was announced, concatenated
    pub fn bytes_for(&self, track: &str) -> Vec<u8> {
        self.pushes
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.accepted && p.now_playing.as_deref() == Some(track))
            .flat_map(|p| p.chunk.iter().copied())
            .collect()
    }

    pub fn accepted_count(&self) -> usize {
        self.pushes.lock().unwrap().iter().filter(|p| p.accepted).count()
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PipelineSink for RecordingSink {
    async fn push(&self, chunk: Bytes) -> FlowStatus {
        let now_playing = self.bus.current();
        let rejected = self
            .reject_track
            .lock()
            .unwrap()
            .as_deref()
            .map(|t| now_playing.as_deref() == Some(t))
            .unwrap_or(false);

        self.pushes.lock().unwrap().push(PushRecord {
            now_playing,
            chunk: chunk.to_vec(),
            accepted: !rejected,
        });

        if rejected {
            FlowStatus::Rejected("downstream not negotiated".to_string())
        } else {
            FlowStatus::Accepted
        }
    }

    async fn finish(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }
}
