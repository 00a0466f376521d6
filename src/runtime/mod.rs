//! Application lifecycle
//!
//! - `lifetime`: startup wiring and graceful shutdown
//! - `modes`: execution modes (currently only the HTTP server)

pub mod lifetime;
pub mod modes;

pub use modes::run_server;
