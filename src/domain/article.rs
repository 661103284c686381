use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub source: Option<String>,
    pub author: Option<String>,
    pub title: String,
    pub description: String,
    pub url: String,
    pub image_url: Option<String>,
    /// Publication time in epoch milliseconds
    pub published_at: i64,
}

impl Article {
    /// Generate a deterministic ID from the article URL
    pub fn generate_id(url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn display_source(&self) -> &str {
        self.source.as_deref().unwrap_or("(Unknown source)")
    }
}
