//! Backend for a chat assistant that streams LLM completions and can brief
//! the user on aggregated RSS headlines.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Streaming chat pipeline: transcript, LLM client, token stream consumer.
pub mod chat;
/// Externalized application configuration.
pub mod config;
/// RSS aggregation pipeline: fetch with retry, cache, parse, prompt formatting.
pub mod feeds;
/// HTTP server and API routes.
pub mod server;
/// Entry helpers to start the newsbrief server.
pub mod startup;
