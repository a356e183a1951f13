//! Background workers
//!
//! Network work runs in spawned tasks that report back to the UI loop over one channel

pub mod core;
pub mod loader;
pub mod periodic;
