//! urlx - URL shortener with batched log shipping
//!
//! Every request is logged locally and, through a bounded queue and a
//! background flush thread, pushed to Grafana Loki in batches.
//!
//! # Architecture
//! - `shipping`: bounded log queue, flush thread, Loki transport
//! - `logging`: local tracing sink and the `Logger` handle
//! - `store`: short code -> URL storage (memory or database)
//! - `shortener`: short code generation
//! - `api`: HTTP routes and middleware
//! - `config`: layered static configuration
//! - `runtime`: server lifecycle

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod runtime;
pub mod shipping;
pub mod shortener;
pub mod store;
