//! Broadcast hub fanning store change events out to live client streams.
//!
//! The hub owns the registry of connected stream handles. The HTTP layer
//! registers one handle per streaming client; the notification processor
//! drives [`BroadcastHub::broadcast`]. Fan-out iterates a snapshot of the
//! registry, so clients may connect and disconnect mid-broadcast.

mod client;
mod registry;

pub use client::StreamClient;
pub use registry::{BroadcastHub, RegistryFull};
