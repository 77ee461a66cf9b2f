//! Background Tasks Module
//!
//! Houses the optional TTL sweep task that proactively removes expired
//! entries from a shared cache.

mod cleanup;

pub use cleanup::spawn_sweep_task;
