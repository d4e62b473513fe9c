//! A2UI Streaming Protocol Engine
//!
//! A2UI (Agent-to-UI) is a declarative JSONL protocol for AI agents to
//! generate UIs. This module consumes agent output in arbitrary text chunks,
//! maintains the resulting component graph, and fans a request out to
//! several agents while merging their output into one deterministic stream.
//!
//! # Architecture
//!
//! ```text
//! raw text fragments
//!        ↓
//!   LineFramer ──→ decode / decode_many
//!        ↓
//!  ProtocolMessage
//!        ↓
//! ┌──────┴──────────────┐
//! │                     │
//! ComponentRegistry   Coordinator ← AgentRunner × N
//! │                     │
//! render / RenderNode   JSONL or SSE frames
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use a2ui_kit::a2ui::*;
//!
//! let mut decoder = StreamDecoder::new();
//! let mut registry = ComponentRegistry::new();
//! for chunk in chunks {
//!     for message in decoder.push(chunk) {
//!         registry.apply(&message);
//!     }
//! }
//! if let Some(tree) = render(&registry) {
//!     println!("{}", tree.outline());
//! }
//! ```

mod agent;
mod coordinator;
mod decoder;
mod framer;
mod message;
mod registry;
mod render;
mod sse;
mod value;

pub use agent::*;
pub use coordinator::*;
pub use decoder::*;
pub use framer::*;
pub use message::*;
pub use registry::*;
pub use render::*;
pub use sse::*;
pub use value::*;
