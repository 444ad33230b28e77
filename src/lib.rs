//! inset - cached remote-content embedding
//!
//! Fetches remote HTML or Markdown through a jittered-TTL cache, converts
//! Markdown via a remote rendering endpoint with its own provenance-gated
//! cache, and delivers the result to a renderer.

pub mod cache;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod render;
pub mod source;
pub mod store;
pub mod transport;

pub use error::{InsetError, InsetResult};
