use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::app::{NewsflowError, Result};
use crate::domain::{Article, Category, SearchFilters};
use crate::gateway::NewsGateway;
use crate::normalizer;
use crate::repository::NewsRepository;

#[derive(Default)]
struct Caches {
    headlines: HashMap<Category, Vec<Article>>,
    searches: HashMap<String, Vec<Article>>,
}

impl Caches {
    fn find(&self, id: &str) -> Option<&Article> {
        self.headlines
            .values()
            .chain(self.searches.values())
            .flatten()
            .find(|a| a.id == id)
    }
}

/// Memoizes headlines per category and results per search query.
///
/// One lock covers both maps and is held from the cache check through the
/// gateway call to the cache write, so concurrent callers asking for the same
/// category trigger a single request.
pub struct CachedNewsRepository {
    gateway: Arc<dyn NewsGateway>,
    caches: Mutex<Caches>,
}

impl CachedNewsRepository {
    pub fn new(gateway: Arc<dyn NewsGateway>) -> Self {
        Self {
            gateway,
            caches: Mutex::new(Caches::default()),
        }
    }
}

#[async_trait]
impl NewsRepository for CachedNewsRepository {
    async fn fetch_headlines(&self, category: Category, force_refresh: bool) -> Result<Vec<Article>> {
        let mut caches = self.caches.lock().await;

        if !force_refresh {
            if let Some(articles) = caches.headlines.get(&category) {
                debug!("Headline cache hit for {}", category);
                return Ok(articles.clone());
            }
        }

        info!(%category, force_refresh, "Fetching top headlines");
        match self.gateway.fetch_top_headlines(category).await {
            Ok(response) => {
                let articles = normalizer::to_articles(response);
                info!("Cached {} headlines for {}", articles.len(), category);
                caches.headlines.insert(category, articles.clone());
                Ok(articles)
            }
            Err(e) => {
                if caches.headlines.remove(&category).is_some() {
                    debug!("Evicted headlines for {} after failed refresh", category);
                }
                Err(NewsflowError::from(e))
            }
        }
    }

    async fn get_article_by_id(&self, id: &str) -> Result<Article> {
        let caches = self.caches.lock().await;
        caches
            .find(id)
            .cloned()
            .ok_or_else(|| NewsflowError::article_not_found(id))
    }

    async fn search_articles(&self, query: &str, filters: &SearchFilters) -> Result<Vec<Article>> {
        let mut caches = self.caches.lock().await;

        info!(query, "Searching articles");
        let response = self.gateway.search(query, filters).await?;
        let articles = normalizer::to_articles(response);
        caches.searches.insert(query.to_string(), articles.clone());
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::error::{InternalError, NetworkError};
    use crate::gateway::GatewayError;
    use crate::testing::{article, headline_urls, search_urls, FakeNewsGateway};
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn repository(gateway: FakeNewsGateway) -> (Arc<FakeNewsGateway>, CachedNewsRepository) {
        let gateway = Arc::new(gateway);
        let repo = CachedNewsRepository::new(gateway.clone());
        (gateway, repo)
    }

    fn server_down() -> GatewayError {
        GatewayError::Status {
            status: 503,
            message: "unavailable".into(),
        }
    }

    #[tokio::test]
    async fn test_cache_hit() {
        let (gateway, repo) = repository(FakeNewsGateway::new());

        for category in Category::ALL {
            let first = assert_ok!(repo.fetch_headlines(category, false).await);
            let second = assert_ok!(repo.fetch_headlines(category, false).await);
            assert_eq!(first, second);
            assert_eq!(gateway.headline_call_count(category), 1);
        }
    }

    #[tokio::test]
    async fn test_forced_refresh_replaces_entry() {
        let (gateway, repo) = repository(FakeNewsGateway::new());

        let first = repo.fetch_headlines(Category::Sports, false).await.unwrap();
        let refreshed = repo.fetch_headlines(Category::Sports, true).await.unwrap();
        let cached = repo.fetch_headlines(Category::Sports, false).await.unwrap();

        assert_eq!(gateway.headline_call_count(Category::Sports), 2);
        assert_ne!(first, refreshed);
        assert_eq!(refreshed, cached);
        assert_eq!(refreshed[0].url, headline_urls(Category::Sports, 2)[0]);
    }

    #[tokio::test]
    async fn test_failed_refresh_evicts_entry() {
        let (gateway, repo) = repository(FakeNewsGateway::new());

        repo.fetch_headlines(Category::Health, false).await.unwrap();
        gateway.fail_next_headlines(server_down());

        let err = assert_err!(repo.fetch_headlines(Category::Health, true).await);
        assert!(matches!(
            err,
            NewsflowError::Network(NetworkError::ServerError(_))
        ));

        let articles = assert_ok!(repo.fetch_headlines(Category::Health, false).await);
        assert_eq!(gateway.headline_call_count(Category::Health), 3);
        assert_eq!(articles[0].url, headline_urls(Category::Health, 3)[0]);
    }

    #[tokio::test]
    async fn test_failed_first_fetch_caches_nothing() {
        let (gateway, repo) = repository(FakeNewsGateway::new());
        gateway.fail_next_headlines(GatewayError::Transport("offline".into()));

        assert_err!(repo.fetch_headlines(Category::General, false).await);
        assert_ok!(repo.fetch_headlines(Category::General, false).await);
        assert_eq!(gateway.headline_call_count(Category::General), 2);
    }

    #[tokio::test]
    async fn test_categories_are_isolated() {
        let (gateway, repo) = repository(FakeNewsGateway::new());

        let business = repo.fetch_headlines(Category::Business, false).await.unwrap();
        let science = repo.fetch_headlines(Category::Science, false).await.unwrap();
        let business_again = repo.fetch_headlines(Category::Business, false).await.unwrap();

        assert_eq!(
            gateway.headline_calls(),
            vec![Category::Business, Category::Science]
        );
        assert_eq!(business, business_again);
        assert_ne!(business, science);
        assert_eq!(science[0].url, headline_urls(Category::Science, 1)[0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_request() {
        let (gateway, repo) =
            repository(FakeNewsGateway::new().with_latency(Duration::from_millis(200)));
        let repo = Arc::new(repo);

        let a = tokio::spawn({
            let repo = repo.clone();
            async move { repo.fetch_headlines(Category::Technology, false).await }
        });
        let b = tokio::spawn({
            let repo = repo.clone();
            async move { repo.fetch_headlines(Category::Technology, false).await }
        });

        let a = a.await.unwrap().unwrap();
        let b = b.await.unwrap().unwrap();
        assert_eq!(a, b);
        assert_eq!(gateway.headline_call_count(Category::Technology), 1);
    }

    #[tokio::test]
    async fn test_lookup_in_headlines_and_searches() {
        let (_, repo) = repository(FakeNewsGateway::new());

        repo.fetch_headlines(Category::General, false).await.unwrap();
        repo.search_articles("rust", &SearchFilters::default())
            .await
            .unwrap();

        let headline = article(&headline_urls(Category::General, 1)[1]);
        let found = repo.get_article_by_id(&headline.id).await.unwrap();
        assert_eq!(found, headline);

        let result = article(&search_urls("rust")[0]);
        let found = repo.get_article_by_id(&result.id).await.unwrap();
        assert_eq!(found, result);
    }

    #[tokio::test]
    async fn test_lookup_miss() {
        let (gateway, repo) = repository(FakeNewsGateway::new());

        let err = assert_err!(repo.get_article_by_id("missing").await);
        assert!(matches!(
            err,
            NewsflowError::Internal(InternalError::ArticleNotFound(_))
        ));

        repo.fetch_headlines(Category::General, false).await.unwrap();
        assert_err!(repo.get_article_by_id("missing").await);
        assert_eq!(gateway.headline_calls().len(), 1);
        assert!(gateway.search_calls().is_empty());
    }

    #[tokio::test]
    async fn test_search_always_hits_gateway() {
        let (gateway, repo) = repository(FakeNewsGateway::new());
        let filters = SearchFilters {
            language: Some("en".into()),
            ..Default::default()
        };

        repo.search_articles("rust", &filters).await.unwrap();
        repo.search_articles("rust", &filters).await.unwrap();

        let calls = gateway.search_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], ("rust".to_string(), filters));
    }

    #[tokio::test]
    async fn test_search_failure_keeps_previous_results() {
        let (gateway, repo) = repository(FakeNewsGateway::new());

        repo.search_articles("rust", &SearchFilters::default())
            .await
            .unwrap();
        gateway.fail_next_search(GatewayError::Status {
            status: 429,
            message: "slow down".into(),
        });

        let err = assert_err!(repo.search_articles("rust", &SearchFilters::default()).await);
        assert_eq!(err, NewsflowError::rate_limit_exceeded());

        let cached = article(&search_urls("rust")[0]);
        assert_ok!(repo.get_article_by_id(&cached.id).await);
    }
}
