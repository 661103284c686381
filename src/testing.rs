//! Fakes and fixtures shared by the unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_stream::stream;
use async_trait::async_trait;

use crate::domain::{Article, Category, SearchFilters};
use crate::gateway::model::{ArticleResponse, NewsResponse, SourceResponse};
use crate::gateway::{
    FragmentStream, GatewayError, GatewayResult, NewsGateway, SummaryGateway,
};
use crate::repository::{CachedNewsRepository, CachedSummaryRepository};
use crate::usecase::UseCases;

pub fn article_response(url: &str) -> ArticleResponse {
    ArticleResponse {
        source: SourceResponse {
            id: None,
            name: "Test Source".into(),
        },
        author: Some("Test Author".into()),
        title: format!("Title of {}", url),
        description: Some("Description".into()),
        url: url.into(),
        url_to_image: None,
        published_at: "2024-01-01T00:00:00Z".into(),
        content: None,
    }
}

pub fn article(url: &str) -> Article {
    Article {
        id: Article::generate_id(url),
        source: Some("Test Source".into()),
        author: Some("Test Author".into()),
        title: format!("Title of {}", url),
        description: "Description".into(),
        url: url.into(),
        image_url: None,
        published_at: 1_704_067_200_000,
    }
}

fn response(urls: &[String]) -> NewsResponse {
    NewsResponse {
        status: "ok".into(),
        total_results: urls.len() as u32,
        articles: urls.iter().map(|u| article_response(u)).collect(),
        code: None,
        message: None,
    }
}

/// URLs the fake returns for the `call`-th headline request of `category` (1-based).
pub fn headline_urls(category: Category, call: usize) -> Vec<String> {
    vec![
        format!("https://example.com/{}/{}/1", category, call),
        format!("https://example.com/{}/{}/2", category, call),
    ]
}

pub fn search_urls(query: &str) -> Vec<String> {
    vec![format!("https://example.com/search/{}", query.replace(' ', "-"))]
}

/// Headline gateway that records calls and answers with generated articles.
#[derive(Default)]
pub struct FakeNewsGateway {
    headline_calls: Mutex<Vec<Category>>,
    search_calls: Mutex<Vec<(String, SearchFilters)>>,
    headline_failures: Mutex<VecDeque<GatewayError>>,
    search_failures: Mutex<VecDeque<GatewayError>>,
    latency: Option<Duration>,
}

impl FakeNewsGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn fail_next_headlines(&self, error: GatewayError) {
        self.headline_failures.lock().unwrap().push_back(error);
    }

    pub fn fail_next_search(&self, error: GatewayError) {
        self.search_failures.lock().unwrap().push_back(error);
    }

    pub fn headline_calls(&self) -> Vec<Category> {
        self.headline_calls.lock().unwrap().clone()
    }

    pub fn headline_call_count(&self, category: Category) -> usize {
        self.headline_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == category)
            .count()
    }

    pub fn search_calls(&self) -> Vec<(String, SearchFilters)> {
        self.search_calls.lock().unwrap().clone()
    }

    async fn wait(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl NewsGateway for FakeNewsGateway {
    async fn fetch_top_headlines(&self, category: Category) -> GatewayResult<NewsResponse> {
        let call = {
            let mut calls = self.headline_calls.lock().unwrap();
            calls.push(category);
            calls.iter().filter(|c| **c == category).count()
        };
        self.wait().await;

        if let Some(error) = self.headline_failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        Ok(response(&headline_urls(category, call)))
    }

    async fn search(&self, query: &str, filters: &SearchFilters) -> GatewayResult<NewsResponse> {
        self.search_calls
            .lock()
            .unwrap()
            .push((query.to_string(), filters.clone()));
        self.wait().await;

        if let Some(error) = self.search_failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        Ok(response(&search_urls(query)))
    }
}

/// Summary gateway replaying scripted fragment sequences.
///
/// Without a script every call streams `["Summary ", "text"]`.
#[derive(Default)]
pub struct FakeSummaryGateway {
    scripts: Mutex<VecDeque<Vec<GatewayResult<String>>>>,
    calls: Mutex<Vec<String>>,
    fragment_delay: Option<Duration>,
}

impl FakeSummaryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fragment_delay(mut self, delay: Duration) -> Self {
        self.fragment_delay = Some(delay);
        self
    }

    pub fn script(&self, fragments: Vec<GatewayResult<String>>) {
        self.scripts.lock().unwrap().push_back(fragments);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl SummaryGateway for FakeSummaryGateway {
    fn summarize(&self, url: &str) -> FragmentStream {
        self.calls.lock().unwrap().push(url.to_string());
        let fragments = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| vec![Ok("Summary ".into()), Ok("text".into())]);
        let delay = self.fragment_delay;

        Box::pin(stream! {
            for fragment in fragments {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                yield fragment;
            }
        })
    }
}

/// Use cases wired to fresh fakes, plus handles to inspect them.
pub struct Harness {
    pub news: Arc<FakeNewsGateway>,
    pub summary: Arc<FakeSummaryGateway>,
    pub use_cases: UseCases,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(FakeNewsGateway::new(), FakeSummaryGateway::new())
    }

    pub fn with(news: FakeNewsGateway, summary: FakeSummaryGateway) -> Self {
        let news = Arc::new(news);
        let summary = Arc::new(summary);
        let use_cases = UseCases::new(
            Arc::new(CachedNewsRepository::new(news.clone())),
            Arc::new(CachedSummaryRepository::new(summary.clone())),
        );
        Self {
            news,
            summary,
            use_cases,
        }
    }
}
