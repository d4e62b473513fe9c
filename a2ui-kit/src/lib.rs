//! # Description
//!
//! A2UI Kit is a Rust crate for consuming and producing A2UI, the JSONL
//! protocol AI agents use to describe user interfaces.
//!
//! # Features
//!
//! - Incremental framing and decoding of chunked agent output.
//! - A component registry with overwrite semantics and a structural renderer.
//! - A coordinator that runs several agents concurrently and merges their
//!   output in a fixed order.
//! - Built-in scripted and HTTP streaming agents.
//! - Event-stream (SSE) framing for serving the merged stream.

pub mod a2ui;
