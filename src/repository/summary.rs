use std::collections::HashMap;
use std::sync::Arc;

use async_stream::stream;
use futures::StreamExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::app::NewsflowError;
use crate::gateway::SummaryGateway;
use crate::repository::{SummaryRepository, SummaryStream};

/// Forwards summary fragments as they arrive and caches the assembled text.
///
/// Only a stream that runs to completion with non-empty output is cached.
/// A failed stream, or one dropped by its consumer, leaves the cache alone.
pub struct CachedSummaryRepository {
    gateway: Arc<dyn SummaryGateway>,
    cache: Arc<Mutex<HashMap<String, String>>>,
}

impl CachedSummaryRepository {
    pub fn new(gateway: Arc<dyn SummaryGateway>) -> Self {
        Self {
            gateway,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl SummaryRepository for CachedSummaryRepository {
    fn summarize_article(&self, url: &str) -> SummaryStream {
        let gateway = self.gateway.clone();
        let cache = self.cache.clone();
        let url = url.to_string();

        Box::pin(stream! {
            let cached = cache.lock().await.get(&url).cloned();
            if let Some(summary) = cached {
                debug!("Summary cache hit for {}", url);
                yield Ok(summary);
                return;
            }

            info!(url = %url, "Requesting summary");
            let mut fragments = gateway.summarize(&url);
            let mut summary = String::new();

            while let Some(fragment) = fragments.next().await {
                match fragment {
                    Ok(text) => {
                        summary.push_str(&text);
                        yield Ok(text);
                    }
                    Err(e) => {
                        yield Err(NewsflowError::from(e));
                        return;
                    }
                }
            }

            if summary.is_empty() {
                debug!("Empty summary for {}, not caching", url);
            } else {
                info!("Cached summary for {} ({} chars)", url, summary.len());
                cache.lock().await.insert(url, summary);
            }
        })
    }
}
