//! HTTP API: server, routing, and request/response mapping for booking wizards.

pub mod app;
pub mod context;
pub mod middleware;
