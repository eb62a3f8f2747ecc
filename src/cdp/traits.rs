//! CDP layer traits
//!
//! Abstract interfaces for CDP communication, kept narrow: this service only
//! needs navigation, script evaluation and screenshots.

use async_trait::async_trait;
use serde_json::Value;

use super::types::CdpErrorDetail;

/// CDP connection trait
///
/// Represents a JSON-RPC connection to one DevTools target.
#[async_trait]
pub trait CdpConnection: Send + Sync + std::fmt::Debug {
    /// Send a CDP command and wait for its response payload
    async fn send_command(&self, method: &str, params: Value) -> Result<CdpCommandResult, crate::Error>;

    /// Close the connection
    async fn close(&self) -> Result<(), crate::Error>;

    /// Check if connection is active
    fn is_active(&self) -> bool;
}

/// Result of one CDP command
#[derive(Debug, Clone)]
pub struct CdpCommandResult {
    /// Response result payload
    pub result: Value,
    /// Protocol-level error, if the browser rejected the command
    pub error: Option<CdpErrorDetail>,
}

/// CDP client trait
///
/// High-level client that provides typed methods for the operations this
/// service performs against a page target.
#[async_trait]
pub trait CdpClient: Send + Sync + std::fmt::Debug {
    /// Navigate to a URL and wait for the document to settle
    async fn navigate(&self, url: &str) -> Result<NavigationResult, crate::Error>;

    /// Evaluate JavaScript in the page
    async fn evaluate(&self, script: &str, await_promise: bool) -> Result<EvaluationResult, crate::Error>;

    /// Capture a full-page PNG screenshot
    async fn screenshot(&self) -> Result<Vec<u8>, crate::Error>;

    /// Enable a CDP domain
    async fn enable_domain(&self, domain: &str) -> Result<(), crate::Error>;

    /// Call a raw CDP method (returns JSON Value)
    async fn call_method(&self, method: &str, params: Value) -> Result<Value, crate::Error>;

    /// Close the underlying connection
    async fn close(&self) -> Result<(), crate::Error>;
}

/// Navigation result
#[derive(Debug, Clone)]
pub struct NavigationResult {
    /// URL after navigation
    pub url: String,
    /// Whether the document reached readyState "complete" within the poll window
    pub is_loaded: bool,
}

/// JavaScript evaluation result
#[derive(Debug, Clone)]
pub enum EvaluationResult {
    /// String value
    String(String),
    /// Number value
    Number(f64),
    /// Boolean value
    Bool(bool),
    /// Null value
    Null,
    /// Object/Array (as JSON)
    Object(Value),
}
