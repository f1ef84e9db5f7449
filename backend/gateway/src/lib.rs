//! SnapSolve Gateway HTTP API Server
//!
//! Provides the REST API for submitting equation photos, polling results,
//! and serving stored media.

pub mod auth;
pub mod health_api;
pub mod problems_api;
pub mod rate_limit;
pub mod server;

pub use rate_limit::RateLimiter;
pub use server::{GatewayState, build_router, start_server};
