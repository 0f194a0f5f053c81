//! Client runtime for the CirqueTask project tracker.
//!
//! Owns the signed-in session, sends every REST call through an ordered
//! request pipeline, wraps each backend resource in a typed client, and keeps
//! a single STOMP-over-WebSocket connection for live board events.

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod forms;
pub mod http;
pub mod i18n;
pub mod models;
pub mod navigation;
pub mod notice;
pub mod pipeline;
pub mod realtime;
pub mod resources;
pub mod session;
pub mod storage;
pub mod theme;
pub mod views;

#[cfg(test)]
pub mod testing;

pub use client::{CirqueClient, ClientParts};
pub use error::ClientError;
