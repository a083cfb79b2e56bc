//! # slate-client — Shared Whiteboard Client
//!
//! Connects once to a slate host and keeps a local replica of its canvas
//! by applying every command it receives, in order. The client never
//! sends anything upstream.

pub mod config;
pub mod session;
