//! Debug session memory bridge.
//!
//! Keeps binary editor views in sync with debuggee memory: observes the debug adapter
//! message stream, refreshes views when memory may have changed, and navigates views
//! to typed offsets or to the addresses of variables.

pub mod bridge;
pub mod config;
pub mod editor;
pub mod error;
pub mod interceptor;
pub mod memory_view;
pub mod navigator;
pub mod offset;
pub mod protocol;
pub mod registry;
pub mod scheduler;
pub mod transport;
