//! Validating entry points the screens call into.

use std::sync::Arc;

use futures::stream;
use url::Url;

use crate::app::{NewsflowError, Result};
use crate::domain::{Article, Category, SearchFilters};
use crate::repository::{NewsRepository, SummaryRepository, SummaryStream};

#[derive(Clone)]
pub struct FetchTopHeadlines {
    repository: Arc<dyn NewsRepository>,
}

impl FetchTopHeadlines {
    pub fn new(repository: Arc<dyn NewsRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, category: Category, force_refresh: bool) -> Result<Vec<Article>> {
        self.repository.fetch_headlines(category, force_refresh).await
    }
}

#[derive(Clone)]
pub struct GetArticleById {
    repository: Arc<dyn NewsRepository>,
}

impl GetArticleById {
    pub fn new(repository: Arc<dyn NewsRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, id: &str) -> Result<Article> {
        self.repository.get_article_by_id(id).await
    }
}

#[derive(Clone)]
pub struct SearchArticles {
    repository: Arc<dyn NewsRepository>,
}

impl SearchArticles {
    pub fn new(repository: Arc<dyn NewsRepository>) -> Self {
        Self { repository }
    }

    /// Search with a trimmed query. Blank queries are rejected before any
    /// request is made.
    pub async fn execute(&self, query: &str, filters: &SearchFilters) -> Result<Vec<Article>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(NewsflowError::invalid_parameter(
                "Search query cannot be empty",
            ));
        }
        self.repository.search_articles(query, filters).await
    }
}

#[derive(Clone)]
pub struct SummarizeArticle {
    repository: Arc<dyn SummaryRepository>,
}

impl SummarizeArticle {
    pub fn new(repository: Arc<dyn SummaryRepository>) -> Self {
        Self { repository }
    }

    pub fn execute(&self, url: &str) -> SummaryStream {
        if let Err(e) = Url::parse(url) {
            let error = NewsflowError::invalid_parameter(format!("Invalid URL {}: {}", url, e));
            return Box::pin(stream::once(async move { Err::<String, _>(error) }));
        }
        self.repository.summarize_article(url)
    }
}

/// Every use case a screen may need, sharing one pair of repositories.
#[derive(Clone)]
pub struct UseCases {
    pub fetch_top_headlines: FetchTopHeadlines,
    pub get_article_by_id: GetArticleById,
    pub search_articles: SearchArticles,
    pub summarize_article: SummarizeArticle,
}

impl UseCases {
    pub fn new(news: Arc<dyn NewsRepository>, summary: Arc<dyn SummaryRepository>) -> Self {
        Self {
            fetch_top_headlines: FetchTopHeadlines::new(news.clone()),
            get_article_by_id: GetArticleById::new(news.clone()),
            search_articles: SearchArticles::new(news),
            summarize_article: SummarizeArticle::new(summary),
        }
    }
}
