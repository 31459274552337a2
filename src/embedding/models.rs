//! Data models for Gemini requests/responses and embedding results

use serde::{Deserialize, Serialize};

/// Body of an `embedContent` call, also one entry of a batch call
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedContentRequest {
    /// Fully qualified model name, `models/<name>`
    pub model: String,

    pub content: Content,

    pub output_dimensionality: usize,
}

/// Body of a `batchEmbedContents` call
#[derive(Debug, Clone, Serialize)]
pub struct BatchEmbedContentsRequest {
    pub requests: Vec<EmbedContentRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Part {
    pub text: String,
}

/// Response of an `embedContent` call
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedContentResponse {
    pub embedding: ContentEmbedding,
}

/// Response of a `batchEmbedContents` call
#[derive(Debug, Clone, Deserialize)]
pub struct BatchEmbedContentsResponse {
    #[serde(default)]
    pub embeddings: Vec<ContentEmbedding>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentEmbedding {
    pub values: Vec<f32>,
}

impl EmbedContentRequest {
    /// Create a request for a single text
    pub fn new(model: &str, text: impl Into<String>, dimensions: usize) -> Self {
        Self {
            model: format!("models/{}", model),
            content: Content {
                parts: vec![Part { text: text.into() }],
            },
            output_dimensionality: dimensions,
        }
    }
}

impl BatchEmbedContentsRequest {
    /// Create a request embedding every text in one call
    pub fn new(model: &str, texts: &[String], dimensions: usize) -> Self {
        Self {
            requests: texts
                .iter()
                .map(|text| EmbedContentRequest::new(model, text.as_str(), dimensions))
                .collect(),
        }
    }
}

/// One generated embedding, as returned by `/embed`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingResult {
    /// The original input text
    pub text: String,

    pub embedding: Vec<f32>,

    /// Length of `embedding`
    pub dimension: usize,

    pub normalized: bool,

    pub model: String,
}

/// Cosine similarity between two texts, as returned by `/similarity`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub text1: String,
    pub text2: String,

    /// Score in `[-1, 1]`
    pub similarity: f32,

    pub embedding1: Vec<f32>,
    pub embedding2: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_request_wire_format() {
        let req = EmbedContentRequest::new("gemini-embedding-001", "hello", 768);
        let value = serde_json::to_value(&req).unwrap();

        assert_eq!(
            value,
            json!({
                "model": "models/gemini-embedding-001",
                "content": { "parts": [{ "text": "hello" }] },
                "outputDimensionality": 768
            })
        );
    }

    #[test]
    fn test_batch_response_parsing() {
        let body = json!({
            "embeddings": [
                { "values": [0.1, 0.2] },
                { "values": [0.3, 0.4] }
            ]
        });
        let parsed: BatchEmbedContentsResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.embeddings.len(), 2);
        assert_eq!(parsed.embeddings[1].values, vec![0.3, 0.4]);
    }
}
