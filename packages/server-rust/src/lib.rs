//! Workforce Server: worker registration with atomic id allocation, durable
//! storage, and best-effort event publication behind an HTTP API.

pub mod config;
pub mod network;
pub mod publish;
pub mod server;
pub mod service;
pub mod storage;

pub use config::{Cli, WorkforceConfig};
pub use server::build_server;
