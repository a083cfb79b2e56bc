//! # slate-host — Shared Whiteboard Host
//!
//! Owns the authoritative canvas. Accepts any number of clients over
//! TCP and replicates every drawing command to them as newline-delimited
//! JSON, in the order the operator issued them.
//!
//! The operator draws through a line-oriented console on stdin (see
//! [`console`]). Clients that join later only see what is drawn after
//! they connect.

pub mod config;
pub mod console;
pub mod service;
