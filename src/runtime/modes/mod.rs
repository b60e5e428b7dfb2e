//! Mode routing
//!
//! 目前只有 HTTP server 一种运行模式

#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "server")]
pub use server::run_server;
