//! # aircast radio daemon (aircast-rd)
//!
//! Unattended radio service: streams audio objects from an S3/MinIO bucket
//! into a live transcode/RTP pipeline in an endless loop, publishes the
//! currently playing track, and serves a small HTTP API for observers.
//!
//! **Architecture:** the playback loop owns the playlist cursor and drives
//! catalog refreshes, now-playing announcements, and chunked pushes into
//! the pipeline sink; the pipeline runs its own event loop on a separate
//! thread behind the `pipeline` adapter.

pub mod api;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod pipeline;
pub mod player;
pub mod storage;
pub mod streamer;

pub use error::{Error, Result};
