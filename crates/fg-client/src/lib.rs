//! HTTP adapter for the remote face-generation service.
//!
//! The service answers status checks on a single channel: a JSON body means
//! "still running" or "failed", anything else is the finished image. That
//! rule lives in [`response`] and nowhere else.

mod client;
mod config;
pub mod response;
mod schemas;

pub use client::HttpFaceApi;
pub use config::{ClientConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT};
