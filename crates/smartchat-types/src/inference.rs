//! Inference service data shapes.

use serde::{Deserialize, Serialize};

/// A model advertised by the inference service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceModel {
    pub name: String,
    /// Size on disk in bytes.
    #[serde(default)]
    pub size: u64,
}

impl InferenceModel {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// Events emitted by a streaming generation.
///
/// A well-formed stream is zero or more `TextDelta`s followed by exactly one
/// `Done`. Concatenating every delta in order yields the full response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationEvent {
    TextDelta(String),
    Done,
}
