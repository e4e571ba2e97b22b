//! API 模块
//!
//! 负责所有与后端服务的交互

pub mod admin;
pub mod auth;
pub mod backend;
pub mod client;
pub mod envelope;
pub mod favorites;
pub mod records;
pub mod solve;

pub use backend::SolveBackend;
pub use client::ApiClient;
pub use envelope::{ApiEnvelope, Page};
