//! Cache-coordinated access to the two gateways.
//!
//! Every cache is in-memory and lives as long as the repository value.

pub mod news;
pub mod summary;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::app::Result;
use crate::domain::{Article, Category, SearchFilters};

pub use news::CachedNewsRepository;
pub use summary::CachedSummaryRepository;

/// Summary text as it is generated. A failed stream ends with one `Err` item.
pub type SummaryStream = BoxStream<'static, Result<String>>;

#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// Headlines for `category`, served from cache unless `force_refresh` is set.
    async fn fetch_headlines(&self, category: Category, force_refresh: bool) -> Result<Vec<Article>>;

    /// Look an article up in the cached headlines and search results. Never
    /// touches the network.
    async fn get_article_by_id(&self, id: &str) -> Result<Article>;

    async fn search_articles(&self, query: &str, filters: &SearchFilters) -> Result<Vec<Article>>;
}

pub trait SummaryRepository: Send + Sync {
    fn summarize_article(&self, url: &str) -> SummaryStream;
}
