use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, error};

use crate::app::NewsflowError;
use crate::config::ScreenConfig;
use crate::domain::{Article, Category};
use crate::mvi::{ensure_minimum_loading_time, StateContainer, UiStateObserver};
use crate::screen::{collect_summary, SummaryState, TaskGroup, TaskSlot};
use crate::usecase::UseCases;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HomeStatus {
    #[default]
    Idle,
    Loading,
    Stable,
    Error,
}

#[derive(Debug, Clone, Default)]
pub struct HomeViewModelState {
    pub status: HomeStatus,
    pub current_category: Category,
    pub articles_by_category: BTreeMap<Category, Vec<Article>>,
    pub overview_article: Option<Article>,
    pub is_loading: bool,
    pub is_refreshing: bool,
    pub is_summarizing: bool,
    pub summary: String,
    pub error: Option<NewsflowError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HomeUiState {
    Idle,
    Loading,
    Stable {
        current_category: Category,
        articles_by_category: BTreeMap<Category, Vec<Article>>,
        overview_article: Option<Article>,
        is_loading: bool,
        is_refreshing: bool,
        is_summarizing: bool,
        summary: String,
    },
    Error(NewsflowError),
}

impl HomeViewModelState {
    fn to_ui_state(&self) -> HomeUiState {
        match self.status {
            HomeStatus::Idle => HomeUiState::Idle,
            HomeStatus::Loading => HomeUiState::Loading,
            HomeStatus::Stable => HomeUiState::Stable {
                current_category: self.current_category,
                articles_by_category: self.articles_by_category.clone(),
                overview_article: self.overview_article.clone(),
                is_loading: self.is_loading,
                is_refreshing: self.is_refreshing,
                is_summarizing: self.is_summarizing,
                summary: self.summary.clone(),
            },
            HomeStatus::Error => HomeUiState::Error(
                self.error
                    .clone()
                    .unwrap_or_else(|| NewsflowError::unknown(None)),
            ),
        }
    }
}

impl SummaryState for HomeViewModelState {
    fn start_summary(self) -> Self {
        Self {
            is_summarizing: true,
            summary: String::new(),
            ..self
        }
    }

    fn append_summary(mut self, fragment: &str) -> Self {
        self.summary.push_str(fragment);
        self
    }

    fn finish_summary(self) -> Self {
        Self {
            is_summarizing: false,
            ..self
        }
    }
}

#[derive(Debug, Clone)]
pub enum HomeIntent {
    SelectArticle(Article),
    ChangeCategory(Category),
    ShowArticleOverview(Article),
    DismissArticleOverview,
    CopyArticleUrl,
    ShareArticle,
    RetryLoad,
    RefreshArticles,
    NavigateSearch,
    SummarizeArticle,
    DismissSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HomeEffect {
    NavigateViewer(String),
    NavigateSearch,
    CopyUrl(String),
    ShareArticle { title: String, url: String },
    SummaryError(NewsflowError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchMode {
    Load,
    Refresh,
}

struct HomeInner {
    container: StateContainer<HomeViewModelState, HomeUiState, HomeEffect>,
    use_cases: UseCases,
    config: ScreenConfig,
    tasks: TaskGroup,
    summary_task: TaskSlot,
}

/// Categorized headlines with an article overview sheet and inline summaries.
pub struct HomeScreen {
    inner: Arc<HomeInner>,
}

impl HomeScreen {
    /// Create the screen and start loading the default category.
    pub fn new(use_cases: UseCases, config: ScreenConfig) -> Self {
        let container = StateContainer::new(
            HomeViewModelState::default(),
            Arc::new(HomeViewModelState::to_ui_state),
            &config,
        );
        let inner = Arc::new(HomeInner {
            container,
            use_cases,
            config,
            tasks: TaskGroup::default(),
            summary_task: TaskSlot::default(),
        });

        let category = inner.container.with_state(|s| s.current_category);
        HomeInner::fetch_articles(&inner, category, FetchMode::Load);
        Self { inner }
    }

    pub fn subscribe(&self) -> UiStateObserver<HomeUiState> {
        self.inner.container.subscribe()
    }

    pub fn ui_state(&self) -> HomeUiState {
        self.inner.container.ui_state()
    }

    pub async fn next_effect(&self) -> Option<HomeEffect> {
        self.inner.container.next_effect().await
    }

    pub fn try_next_effect(&self) -> Option<HomeEffect> {
        self.inner.container.try_next_effect()
    }

    pub fn on_intent(&self, intent: HomeIntent) {
        let inner = &self.inner;
        let container = &inner.container;

        match intent {
            HomeIntent::SelectArticle(article) => {
                container.send_effect(HomeEffect::NavigateViewer(article.id));
            }
            HomeIntent::ChangeCategory(category) => {
                container.update(|s| HomeViewModelState {
                    current_category: category,
                    ..s
                });
                let loaded = container.with_state(|s| s.articles_by_category.contains_key(&category));
                if !loaded {
                    HomeInner::fetch_articles(inner, category, FetchMode::Load);
                }
            }
            HomeIntent::ShowArticleOverview(article) => {
                container.update(|s| HomeViewModelState {
                    overview_article: Some(article),
                    ..s
                });
            }
            HomeIntent::DismissArticleOverview => {
                inner.summary_task.abort();
                container.update(|s| HomeViewModelState {
                    overview_article: None,
                    is_summarizing: false,
                    summary: String::new(),
                    ..s
                });
            }
            HomeIntent::CopyArticleUrl => {
                if let Some(article) = container.with_state(|s| s.overview_article.clone()) {
                    container.send_effect(HomeEffect::CopyUrl(article.url));
                }
            }
            HomeIntent::ShareArticle => {
                if let Some(article) = container.with_state(|s| s.overview_article.clone()) {
                    container.send_effect(HomeEffect::ShareArticle {
                        title: article.title,
                        url: article.url,
                    });
                }
            }
            HomeIntent::RetryLoad => {
                let category = container.with_state(|s| s.current_category);
                HomeInner::fetch_articles(inner, category, FetchMode::Load);
            }
            HomeIntent::RefreshArticles => {
                let category = container.with_state(|s| s.current_category);
                HomeInner::fetch_articles(inner, category, FetchMode::Refresh);
            }
            HomeIntent::NavigateSearch => {
                container.send_effect(HomeEffect::NavigateSearch);
            }
            HomeIntent::SummarizeArticle => {
                let Some(article) = container.with_state(|s| s.overview_article.clone()) else {
                    debug!("No article selected, ignoring summarize request");
                    return;
                };
                HomeInner::summarize(inner, &article.url);
            }
            HomeIntent::DismissSummary => {
                inner.summary_task.abort();
                container.update(|s| HomeViewModelState {
                    is_summarizing: false,
                    summary: String::new(),
                    ..s
                });
            }
        }
    }
}

impl Drop for HomeScreen {
    fn drop(&mut self) {
        self.inner.tasks.abort_all();
    }
}

impl HomeInner {
    fn fetch_articles(this: &Arc<Self>, category: Category, mode: FetchMode) {
        this.container.update(|s| match (s.status, mode) {
            (HomeStatus::Stable, FetchMode::Refresh) => HomeViewModelState {
                is_refreshing: true,
                ..s
            },
            (HomeStatus::Stable, FetchMode::Load) => HomeViewModelState {
                is_loading: true,
                ..s
            },
            _ => HomeViewModelState {
                status: HomeStatus::Loading,
                ..s
            },
        });

        let inner = this.clone();
        this.tasks.spawn(async move {
            let started = Instant::now();
            let result = inner
                .use_cases
                .fetch_top_headlines
                .execute(category, mode == FetchMode::Refresh)
                .await;
            ensure_minimum_loading_time(started, inner.config.min_loading()).await;

            match result {
                Ok(articles) => inner.container.update(|mut s| {
                    s.articles_by_category.insert(category, articles);
                    HomeViewModelState {
                        status: HomeStatus::Stable,
                        is_loading: false,
                        is_refreshing: false,
                        error: None,
                        ..s
                    }
                }),
                Err(e) => {
                    error!("Failed to fetch {} headlines: {}", category, e);
                    inner.container.update(|s| HomeViewModelState {
                        status: HomeStatus::Error,
                        is_loading: false,
                        is_refreshing: false,
                        error: Some(e),
                        ..s
                    });
                }
            }
        });
    }

    fn summarize(this: &Arc<Self>, url: &str) {
        let stream = this.use_cases.summarize_article.execute(url);
        this.container.update(HomeViewModelState::start_summary);

        let inner = this.clone();
        let handle = this.tasks.spawn(async move {
            collect_summary(&inner.container, stream, HomeEffect::SummaryError).await;
        });
        this.summary_task.replace(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::GatewayError;
    use crate::testing::{headline_urls, FakeNewsGateway, FakeSummaryGateway, Harness};
    use std::time::Duration;

    fn screen(harness: &Harness) -> HomeScreen {
        HomeScreen::new(harness.use_cases.clone(), ScreenConfig::default())
    }

    fn is_stable(state: &HomeUiState) -> bool {
        matches!(state, HomeUiState::Stable { .. })
    }

    fn stable_fields(state: HomeUiState) -> (Category, BTreeMap<Category, Vec<Article>>, bool, String) {
        match state {
            HomeUiState::Stable {
                current_category,
                articles_by_category,
                is_summarizing,
                summary,
                ..
            } => (current_category, articles_by_category, is_summarizing, summary),
            other => panic!("expected stable state, got {:?}", other),
        }
    }

    async fn loaded(harness: &Harness) -> (HomeScreen, UiStateObserver<HomeUiState>) {
        let screen = screen(harness);
        let mut observer = screen.subscribe();
        observer.wait_for(is_stable).await.unwrap();
        (screen, observer)
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_load_honors_minimum_loading_time() {
        let harness = Harness::new();
        let started = Instant::now();
        let screen = screen(&harness);
        let mut observer = screen.subscribe();
        assert_eq!(observer.current(), HomeUiState::Loading);

        let state = observer.wait_for(is_stable).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(500));

        let (category, articles, _, _) = stable_fields(state);
        assert_eq!(category, Category::General);
        assert_eq!(articles[&Category::General][0].url, headline_urls(Category::General, 1)[0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_load_then_retry() {
        let harness = Harness::new();
        harness
            .news
            .fail_next_headlines(GatewayError::Transport("offline".into()));
        let screen = screen(&harness);
        let mut observer = screen.subscribe();

        let state = observer
            .wait_for(|s| matches!(s, HomeUiState::Error(_)))
            .await
            .unwrap();
        assert_eq!(
            state,
            HomeUiState::Error(NewsflowError::network_failure("Network error: offline"))
        );

        screen.on_intent(HomeIntent::RetryLoad);
        assert_eq!(screen.ui_state(), HomeUiState::Loading);
        observer.wait_for(is_stable).await.unwrap();
        assert_eq!(harness.news.headline_call_count(Category::General), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_change_category_fetches_once() {
        let harness = Harness::new();
        let (screen, mut observer) = loaded(&harness).await;

        screen.on_intent(HomeIntent::ChangeCategory(Category::Sports));
        let state = observer
            .wait_for(|s| {
                matches!(s, HomeUiState::Stable { articles_by_category, is_loading: false, .. }
                    if articles_by_category.contains_key(&Category::Sports))
            })
            .await
            .unwrap();
        assert_eq!(stable_fields(state).0, Category::Sports);

        screen.on_intent(HomeIntent::ChangeCategory(Category::General));
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(
            harness.news.headline_calls(),
            vec![Category::General, Category::Sports]
        );
        assert_eq!(stable_fields(screen.ui_state()).0, Category::General);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_stays_stable_while_loading() {
        let harness = Harness::new();
        let (screen, mut observer) = loaded(&harness).await;

        screen.on_intent(HomeIntent::RefreshArticles);
        assert!(matches!(
            screen.ui_state(),
            HomeUiState::Stable { is_refreshing: true, .. }
        ));

        let state = observer
            .wait_for(|s| matches!(s, HomeUiState::Stable { is_refreshing: false, .. }))
            .await
            .unwrap();
        let (_, articles, _, _) = stable_fields(state);
        assert_eq!(articles[&Category::General][0].url, headline_urls(Category::General, 2)[0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_shows_error() {
        let harness = Harness::new();
        let (screen, mut observer) = loaded(&harness).await;
        harness.news.fail_next_headlines(GatewayError::Status {
            status: 401,
            message: "bad key".into(),
        });

        screen.on_intent(HomeIntent::RefreshArticles);
        let state = observer
            .wait_for(|s| matches!(s, HomeUiState::Error(_)))
            .await
            .unwrap();
        assert_eq!(state, HomeUiState::Error(NewsflowError::unauthorized()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_article_effects() {
        let harness = Harness::new();
        let (screen, _observer) = loaded(&harness).await;
        let article = crate::testing::article("https://example.com/a");

        screen.on_intent(HomeIntent::CopyArticleUrl);
        screen.on_intent(HomeIntent::ShareArticle);
        assert_eq!(screen.try_next_effect(), None);

        screen.on_intent(HomeIntent::SelectArticle(article.clone()));
        screen.on_intent(HomeIntent::ShowArticleOverview(article.clone()));
        screen.on_intent(HomeIntent::CopyArticleUrl);
        screen.on_intent(HomeIntent::ShareArticle);
        screen.on_intent(HomeIntent::NavigateSearch);

        assert_eq!(
            screen.next_effect().await,
            Some(HomeEffect::NavigateViewer(article.id.clone()))
        );
        assert_eq!(
            screen.next_effect().await,
            Some(HomeEffect::CopyUrl(article.url.clone()))
        );
        assert_eq!(
            screen.next_effect().await,
            Some(HomeEffect::ShareArticle {
                title: article.title.clone(),
                url: article.url.clone(),
            })
        );
        assert_eq!(screen.next_effect().await, Some(HomeEffect::NavigateSearch));
        assert_eq!(screen.try_next_effect(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_summary_streams_into_state() {
        let harness = Harness::new();
        harness
            .summary
            .script(vec![Ok("Hello ".into()), Ok("World".into())]);
        let (screen, mut observer) = loaded(&harness).await;
        let article = crate::testing::article("https://example.com/a");

        screen.on_intent(HomeIntent::SummarizeArticle);
        assert!(harness.summary.calls().is_empty());

        screen.on_intent(HomeIntent::ShowArticleOverview(article));
        screen.on_intent(HomeIntent::SummarizeArticle);
        assert!(matches!(
            screen.ui_state(),
            HomeUiState::Stable { is_summarizing: true, .. }
        ));

        let state = observer
            .wait_for(|s| matches!(s, HomeUiState::Stable { is_summarizing: false, .. }))
            .await
            .unwrap();
        assert_eq!(stable_fields(state).3, "Hello World");
    }

    #[tokio::test(start_paused = true)]
    async fn test_summary_error_is_an_effect() {
        let harness = Harness::new();
        harness
            .summary
            .script(vec![Ok("partial".into()), Err(GatewayError::ContentFiltered)]);
        let (screen, mut observer) = loaded(&harness).await;

        screen.on_intent(HomeIntent::ShowArticleOverview(crate::testing::article(
            "https://example.com/a",
        )));
        screen.on_intent(HomeIntent::SummarizeArticle);

        let effect = screen.next_effect().await;
        assert!(matches!(effect, Some(HomeEffect::SummaryError(_))));
        let state = observer
            .wait_for(|s| matches!(s, HomeUiState::Stable { is_summarizing: false, .. }))
            .await
            .unwrap();
        assert!(is_stable(&state));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_aborts_summary() {
        let harness = Harness::with(
            FakeNewsGateway::new(),
            FakeSummaryGateway::new().with_fragment_delay(Duration::from_millis(100)),
        );
        let (screen, mut observer) = loaded(&harness).await;
        screen.on_intent(HomeIntent::ShowArticleOverview(crate::testing::article(
            "https://example.com/a",
        )));

        screen.on_intent(HomeIntent::SummarizeArticle);
        observer
            .wait_for(|s| matches!(s, HomeUiState::Stable { summary, .. } if !summary.is_empty()))
            .await
            .unwrap();
        screen.on_intent(HomeIntent::DismissSummary);
        tokio::time::sleep(Duration::from_secs(1)).await;

        let (_, _, is_summarizing, summary) = stable_fields(screen.ui_state());
        assert!(!is_summarizing);
        assert_eq!(summary, "");

        screen.on_intent(HomeIntent::SummarizeArticle);
        assert_eq!(harness.summary.calls().len(), 1);
        observer
            .wait_for(|s| matches!(s, HomeUiState::Stable { summary, is_summarizing: false, .. } if summary == "Summary text"))
            .await
            .unwrap();
        assert_eq!(harness.summary.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_screen_abandons_summary() {
        let harness = Harness::with(
            FakeNewsGateway::new(),
            FakeSummaryGateway::new().with_fragment_delay(Duration::from_millis(100)),
        );
        let article = crate::testing::article("https://example.com/a");
        let (screen, mut observer) = loaded(&harness).await;
        screen.on_intent(HomeIntent::ShowArticleOverview(article.clone()));
        screen.on_intent(HomeIntent::SummarizeArticle);
        observer
            .wait_for(|s| matches!(s, HomeUiState::Stable { summary, .. } if !summary.is_empty()))
            .await
            .unwrap();

        drop(observer);
        drop(screen);
        tokio::time::sleep(Duration::from_secs(1)).await;

        let (screen, mut observer) = loaded(&harness).await;
        screen.on_intent(HomeIntent::ShowArticleOverview(article));
        screen.on_intent(HomeIntent::SummarizeArticle);
        observer
            .wait_for(|s| matches!(s, HomeUiState::Stable { summary, is_summarizing: false, .. } if summary == "Summary text"))
            .await
            .unwrap();
        assert_eq!(harness.summary.calls().len(), 2);
        assert_eq!(harness.news.headline_call_count(Category::General), 1);
    }
}
