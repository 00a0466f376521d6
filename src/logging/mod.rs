//! Logging
//!
//! - `init_logging`: local tracing sink (stdout or rolling file)
//! - `Logger`: handle used by request handlers; writes locally and ships
//!   a JSON copy through the log shipper

mod init;
mod logger;

pub use init::init_logging;
pub use logger::Logger;
