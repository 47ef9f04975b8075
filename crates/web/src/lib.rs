//! MCPBench Web Harness
//!
//! Pages and API endpoints for browser-automation scenarios: a customer
//! form backed by SQLite, mock logins, mock downloads and static demo pages.

pub mod config;
pub mod downloads;
pub mod echo;
pub mod error;
pub mod latency;
pub mod mock_auth;
pub mod pages;
pub mod request;
pub mod server;
pub mod submissions;

pub use config::{Credentials, HarnessConfig};
pub use error::ApiError;
pub use latency::Latency;
pub use server::{AppState, SharedState, WebServer};
