//! Infrastructure layer for the Smart Chatbot.
//!
//! Contains the implementations of the port traits defined in
//! `smartchat-core`: the Ollama inference client and the GitHub code-hosting
//! client, both over `reqwest`. Also loads [`RelayConfig`] from file, `.env`
//! and environment.
//!
//! [`RelayConfig`]: smartchat_types::config::RelayConfig

pub mod config;
pub mod github;
pub mod http;
pub mod ollama;
