//! Shared domain types for the Smart Chatbot relay.
//!
//! Inference models, repository descriptors, websocket frames, configuration
//! and the error taxonomy shared by every other crate in the workspace.
//!
//! Zero infrastructure dependencies -- only serde, uuid, thiserror.

pub mod config;
pub mod error;
pub mod frame;
pub mod inference;
pub mod repository;
