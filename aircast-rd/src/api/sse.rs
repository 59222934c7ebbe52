//! Server-Sent Events relay of now-playing changes
//!
//! Streams every announcement from the now-playing topic, plus a fallback
//! poll of the current-value slot every 500 ms: a client that connects
//! between announcements still converges on the true current track within
//! one poll interval.

use crate::api::AppState;
use aircast_common::events::RadioEvent;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use chrono::Utc;
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

const FALLBACK_POLL: Duration = Duration::from_millis(500);

enum Relay {
    Emit(RadioEvent),
    Skip,
    Done,
}

/// GET /api/v1/track-updates - SSE event stream
pub async fn track_updates(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("new SSE client connected");

    let bus = state.bus.clone();
    let mut rx = bus.subscribe();

    let stream = async_stream::stream! {
        // Start with nothing seen: the first poll tick then delivers the
        // in-flight track to a client that connected mid-track
        let mut last_seen: Option<String> = None;
        let mut poll = tokio::time::interval(FALLBACK_POLL);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let relay = tokio::select! {
                received = rx.recv() => match received {
                    Ok(event) => {
                        let RadioEvent::TrackStarted { track, .. } = &event;
                        last_seen = Some(track.clone());
                        Relay::Emit(event)
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Missed announcements; the fallback poll catches
                        // the client up with the current value
                        warn!(skipped, "SSE relay lagged behind the topic");
                        Relay::Skip
                    }
                    Err(broadcast::error::RecvError::Closed) => Relay::Done,
                },
                _ = poll.tick() => {
                    let current = bus.current();
                    if current != last_seen {
                        last_seen = current.clone();
                        match current {
                            Some(track) => Relay::Emit(RadioEvent::TrackStarted {
                                track,
                                timestamp: Utc::now(),
                            }),
                            None => Relay::Skip,
                        }
                    } else {
                        Relay::Skip
                    }
                }
            };

            match relay {
                Relay::Emit(event) => match serde_json::to_string(&event) {
                    Ok(json) => {
                        yield Ok::<Event, Infallible>(
                            Event::default().event(event.event_type()).data(json),
                        );
                    }
                    Err(e) => warn!(error = %e, "failed to serialize event"),
                },
                Relay::Skip => {}
                Relay::Done => break,
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
