//! Ollama wire types for `/api/tags` and `/api/generate`.

use serde::{Deserialize, Serialize};

use smartchat_types::inference::InferenceModel;

#[derive(Debug, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
pub struct TagModel {
    pub name: String,
    #[serde(default)]
    pub size: u64,
}

impl From<TagModel> for InferenceModel {
    fn from(model: TagModel) -> Self {
        InferenceModel::new(model.name, model.size)
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
}

/// One line of a streamed generate response, or the whole blocking response.
#[derive(Debug, Deserialize)]
pub struct GenerateChunk {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}
