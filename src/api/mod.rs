//! HTTP API: server, response types, and the log stream.

pub mod logs;
pub mod server;
pub mod types;
