//! HTTP API for the Fitness Video Planner
//!
//! Exposes the two resolution entry points over JSON. Resolution never fails
//! at the HTTP level: every resolve response is `200 OK` carrying a
//! [`ResolutionResult`](crate::plan::ResolutionResult), errors included.

pub mod handlers;
pub mod models;
pub mod server;

pub use server::{router, start_http_server, AppState};
