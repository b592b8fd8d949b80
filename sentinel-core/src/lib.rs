//! # Sentinel Core
//!
//! Client-side monitoring core for the Sentinel traffic camera network.
//!
//! ## Overview
//!
//! - **Event fan-out**: [`bus::EventMultiplexer`] delivers one inbound feed to
//!   any number of per-camera and wildcard subscribers.
//! - **Ingress**: [`ingress`] connects the multiplexer to a live SSE or
//!   WebSocket feed, or to a synthetic generator for offline use.
//! - **Stream playback**: [`player::StreamPlayer`] keeps one camera stream
//!   alive with capped exponential backoff.
//! - **Overlays**: [`overlay::OverlayRenderer`] paints normalized detection
//!   boxes onto whatever size the player is rendered at.
//! - **Triage**: [`triage::TriageSession`] drives single-flight human
//!   validation of low-confidence detections.
//!
//! ## Example
//!
//! ```no_run
//! use sentinel_core::bus::{EventMultiplexer, Topic};
//! use sentinel_core::ingress::{IngressHandle, SyntheticConfig, SyntheticIngress};
//! use sentinel_model::Camera;
//!
//! # async fn demo() {
//! let mux = EventMultiplexer::new();
//! let _sub = mux.subscribe(Topic::camera("cam_01"), |event| {
//!     println!("{} {}", event.kind(), event.id());
//! });
//!
//! let cameras = vec![Camera::new("cam_01", "Main St")];
//! let ingress = SyntheticIngress::new(&cameras, SyntheticConfig::default());
//! let handle = IngressHandle::spawn(Box::new(ingress), mux.clone());
//! handle.shutdown().await;
//! # }
//! ```
#![allow(missing_docs)]

pub mod api;
pub mod backoff;
pub mod bus;
pub mod error;
pub mod ingress;
pub mod monitor;
pub mod overlay;
pub mod player;
pub mod triage;

pub use backoff::Backoff;
pub use error::{MonitorError, Result};
