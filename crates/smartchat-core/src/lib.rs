//! Relay pipeline and port definitions for the Smart Chatbot.
//!
//! This crate defines the "ports" the infrastructure layer implements
//! ([`inference::InferenceBackend`], [`codehost::CodeHost`]) and the logic
//! built on top of them: model selection, the context-trigger gate, the
//! active repository slot, context assembly, session management and the
//! chat / connect orchestrators. It never depends on `smartchat-infra` or
//! any HTTP crate.

pub mod chat;
pub mod codehost;
pub mod connect;
pub mod context;
pub mod inference;
pub mod keywords;
pub mod prompt;
pub mod registry;
pub mod relay;
pub mod replies;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;
