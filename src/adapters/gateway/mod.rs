//! Payment gateway adapters.
//!
//! - `HttpGatewayClient` - JSON over HTTP to a real gateway
//! - `SimulatedGatewayClient` - latency and failure injection for development
//! - `MockGatewayClient` - scripted outcomes with call tracking for tests

mod http;
mod mock;
mod simulated;

pub use http::{HttpGatewayClient, HttpGatewayConfig};
pub use mock::MockGatewayClient;
pub use simulated::SimulatedGatewayClient;
