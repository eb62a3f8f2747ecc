//! CDP (Chrome DevTools Protocol) layer
//!
//! WebSocket JSON-RPC plumbing to a DevTools target plus a typed client for
//! the handful of domains this service drives (Page, Runtime).

pub mod types;
pub mod traits;
pub mod connection;
pub mod client;

pub use client::CdpClientImpl;
pub use connection::CdpWebSocketConnection;
pub use traits::{CdpClient, CdpConnection, EvaluationResult, NavigationResult};
