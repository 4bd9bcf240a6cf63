//! An unbalanced-mode (FT 1.2) IEC 60870-5-101 slave/controlled-station
//! implementation.
//!
//! A controlling station (master) polls the server for monitoring data
//! about points — discrete (single-point) indications and measured
//! (short-float) values — and the server answers with FT 1.2 frames
//! carrying ASDUs that encode spontaneous changes, a general-interrogation
//! sweep, a background scan, or link-layer status.
//!
//! ## Layout
//!
//! - [`codec`] — stateless FT 1.2 frame + ASDU wire encoding/decoding.
//! - [`types`], [`time`], [`info`] — domain types: type/COT identifiers,
//!   the CP56-style timestamp, and information-object payloads.
//! - [`point`], [`event`], [`registry`] — the point/event fan-out model.
//! - [`link`] — the FT 1.2 unbalanced link-layer state machine.
//! - [`dispatcher`] — EventPack → response-frame construction.
//! - [`server`] — per-connection protocol state and its builder.
//! - [`driver`] — the read/decode/dispatch/write loop for one connection.
//! - [`grinder`] — fault-injection postprocess hook.
//! - [`config`], [`error`] — configuration loading.
//! - [`sim`] (feature `sim`) — the demo process-data simulator.
//!
//! ## Features
//!
//! - `sim` — enables the bundled random-walk process-data simulator and
//!   the `iec101-server` binary that uses it.

pub mod asdu;
pub mod codec;
pub mod config;
pub mod dispatcher;
pub mod driver;
pub mod error;
pub mod event;
pub mod grinder;
pub mod info;
pub mod link;
pub mod point;
pub mod registry;
pub mod server;
pub mod time;
pub mod types;

#[cfg(feature = "sim")]
pub mod sim;

pub use codec::Frame;
pub use event::{Event, EventPack};
pub use point::{Point, PointValue};
pub use registry::{PointRegistry, ServerId};
pub use server::{Server, ServerBuilder};
