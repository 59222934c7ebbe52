//! Now-playing event bus
//!
//! The playback loop announces each track here before pushing its first
//! byte. Two sinks hold the state:
//! - a current-value slot (last-write-wins, queryable at any time)
//! - a broadcast topic (at-least-once while subscribed, no replay)
//!
//! Announcing is best-effort: a topic with no subscribers is not an error,
//! and no failure here may ever reach the playback loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use tokio::sync::broadcast;
use tracing::debug;

/// Events published on the now-playing topic
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RadioEvent {
    /// A new track began streaming into the transport pipeline
    TrackStarted {
        /// Object key of the track (e.g. `song.mp3`)
        track: String,
        timestamp: DateTime<Utc>,
    },
}

impl RadioEvent {
    /// Event type string used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            RadioEvent::TrackStarted { .. } => "TrackStarted",
        }
    }
}

/// Shared now-playing state: current-value slot plus broadcast topic
///
/// Single writer (the playback loop), many readers (HTTP handlers, SSE
/// relays). The slot uses a std RwLock because writes are rare and the
/// critical section never awaits.
pub struct NowPlayingBus {
    current: RwLock<Option<String>>,
    topic: broadcast::Sender<RadioEvent>,
}

impl NowPlayingBus {
    /// Create a bus buffering up to `capacity` undelivered events per
    /// subscriber
    pub fn new(capacity: usize) -> Self {
        let (topic, _) = broadcast::channel(capacity);
        Self {
            current: RwLock::new(None),
            topic,
        }
    }

    /// Announce the track that is about to stream.
    ///
    /// Updates the current-value slot first, then emits on the topic.
    /// Never fails: a lagging or absent subscriber is not the playback
    /// loop's problem.
    pub fn announce(&self, track: &str) {
        if let Ok(mut slot) = self.current.write() {
            *slot = Some(track.to_string());
        }
        let event = RadioEvent::TrackStarted {
            track: track.to_string(),
            timestamp: Utc::now(),
        };
        // Ignore send errors (no subscribers is OK)
        let _ = self.topic.send(event);
        debug!(track, "announced now-playing");
    }

    /// Last announced track, if any
    pub fn current(&self) -> Option<String> {
        self.current.read().ok().and_then(|slot| slot.clone())
    }

    /// Subscribe to the now-playing topic
    pub fn subscribe(&self) -> broadcast::Receiver<RadioEvent> {
        self.topic.subscribe()
    }

    /// Number of active topic subscribers
    pub fn subscriber_count(&self) -> usize {
        self.topic.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn announce_without_subscribers_does_not_fail() {
        let bus = NowPlayingBus::new(16);
        bus.announce("a.mp3");
        assert_eq!(bus.current(), Some("a.mp3".to_string()));
    }

    #[test]
    fn slot_is_last_write_wins() {
        let bus = NowPlayingBus::new(16);
        assert_eq!(bus.current(), None);
        bus.announce("a.mp3");
        bus.announce("b.mp3");
        assert_eq!(bus.current(), Some("b.mp3".to_string()));
    }

    #[tokio::test]
    async fn subscribers_receive_announcements_in_order() {
        let bus = NowPlayingBus::new(16);
        let mut rx = bus.subscribe();

        bus.announce("a.mp3");
        bus.announce("b.mp3");

        for expected in ["a.mp3", "b.mp3"] {
            let RadioEvent::TrackStarted { track, .. } = rx.recv().await.unwrap();
            assert_eq!(track, expected);
        }
    }

    #[test]
    fn slot_is_updated_before_topic_emission() {
        let bus = NowPlayingBus::new(16);
        let rx = bus.subscribe();

        bus.announce("a.mp3");

        // By the time the event is observable the slot already holds it
        assert_eq!(bus.current(), Some("a.mp3".to_string()));
        drop(rx);
    }

    #[test]
    fn event_serializes_with_tag() {
        let event = RadioEvent::TrackStarted {
            track: "a.mp3".to_string(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"track_started\""));
        assert!(json.contains("\"track\":\"a.mp3\""));
        assert_eq!(event.event_type(), "TrackStarted");
    }
}
