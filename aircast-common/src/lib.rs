//! # aircast common library
//!
//! Shared code for the aircast radio service: the now-playing event bus
//! and its event types.

pub mod events;

pub use events::{NowPlayingBus, RadioEvent};
