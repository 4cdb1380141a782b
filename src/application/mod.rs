//! Application layer orchestrating the payer verification flow.
//!
//! `FlowController` is the state machine. `FlowSession` runs one controller
//! in an actor-like task fed by a `tokio` channel, so intents are processed
//! strictly one at a time. `SurfaceDispatcher` picks the rendering surface in
//! front of the flow.

pub mod address;
pub mod controller;
pub mod dispatch;
pub mod profile_store;
pub mod session;
