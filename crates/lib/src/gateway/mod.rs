//! Gateway: local HTTP front for the adapter.
//!
//! Single port serves a health probe on `/` and the chat endpoint (default `/chatbot`).
//! Each POST is wrapped into the same proxy event shape the function runtime delivers.

mod server;

pub use server::{run_server, run_server_with, GatewayState};
