//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` pushes appointment snapshots to an
//! authenticated participant. A client either subscribes to its full
//! list or watches individual appointments; every change re-queries
//! storage and pushes the current state.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
