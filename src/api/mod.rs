//! HTTP surface
//!
//! - `GET /healthz`
//! - `POST /shorten`
//! - `DELETE /delete/{short}`
//! - `GET /` (UI page)
//! - `GET /{short}` (redirect)

pub mod middleware;
pub mod services;

pub use services::configure;
