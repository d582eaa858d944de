//! qws - in-memory queue web server.
//!
//! Named FIFO queues of typed records with long-poll dequeue, a type
//! filter, TTL expiry and a cooperative read lock, served over HTTP.
//!
//! - [`queue`] - The queue engine ([`queue::QueueContainer`])
//! - [`http`] - axum routes, rendering and token authentication
//! - [`sweeper`] - Periodic expiration sweep
//! - [`server`] - Process wiring and graceful shutdown
//! - [`config`] - TOML + CLI configuration

pub mod config;
pub mod constants;
pub mod http;
pub mod queue;
pub mod server;
pub mod sweeper;
