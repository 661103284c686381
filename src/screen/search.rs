use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, error};

use crate::app::NewsflowError;
use crate::config::ScreenConfig;
use crate::domain::{Article, DateRangePreset, SearchLanguage, SearchOptions, SortBy};
use crate::mvi::{debounce, StateContainer, UiStateObserver};
use crate::screen::{TaskGroup, TaskSlot};
use crate::usecase::UseCases;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStatus {
    #[default]
    Stable,
    Error,
}

#[derive(Debug, Clone, Default)]
pub struct SearchViewModelState {
    pub status: SearchStatus,
    pub query: String,
    pub is_searching: bool,
    pub articles: Vec<Article>,
    pub selected_article: Option<Article>,
    pub options: SearchOptions,
    pub is_options_sheet_visible: bool,
    pub error: Option<NewsflowError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchUiState {
    Stable {
        query: String,
        is_searching: bool,
        articles: Vec<Article>,
        selected_article: Option<Article>,
        options: SearchOptions,
        is_options_sheet_visible: bool,
    },
    Error {
        query: String,
        error: NewsflowError,
    },
}

impl SearchViewModelState {
    fn to_ui_state(&self) -> SearchUiState {
        match self.status {
            SearchStatus::Stable => SearchUiState::Stable {
                query: self.query.clone(),
                is_searching: self.is_searching,
                articles: self.articles.clone(),
                selected_article: self.selected_article.clone(),
                options: self.options,
                is_options_sheet_visible: self.is_options_sheet_visible,
            },
            SearchStatus::Error => SearchUiState::Error {
                query: self.query.clone(),
                error: self
                    .error
                    .clone()
                    .unwrap_or_else(|| NewsflowError::unknown(None)),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub enum SearchIntent {
    UpdateQuery(String),
    ClearQuery,
    RetrySearch,
    SelectArticle(Article),
    ShowArticleOverview(Article),
    DismissArticleOverview,
    CopyArticleUrl,
    ShareArticle,
    NavigateBack,
    ShowOptionsSheet,
    DismissOptionsSheet,
    UpdateSortBy(SortBy),
    UpdateDateRange(DateRangePreset),
    UpdateLanguage(SearchLanguage),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchEffect {
    NavigateViewer(String),
    NavigateBack,
    CopyUrl(String),
    ShareArticle { title: String, url: String },
}

struct SearchInner {
    container: StateContainer<SearchViewModelState, SearchUiState, SearchEffect>,
    use_cases: UseCases,
    query_tx: watch::Sender<String>,
    tasks: TaskGroup,
    search_task: TaskSlot,
    // Query and options of the last search started since the query last changed.
    served: Mutex<Option<(String, SearchOptions)>>,
}

/// Full-text search with a debounced query and adjustable options.
///
/// Typing restarts a quiet period; only the query standing at the end of it
/// is searched. Option changes search again immediately.
pub struct SearchScreen {
    inner: Arc<SearchInner>,
}

impl SearchScreen {
    pub fn new(use_cases: UseCases, config: ScreenConfig) -> Self {
        let container = StateContainer::new(
            SearchViewModelState::default(),
            Arc::new(SearchViewModelState::to_ui_state),
            &config,
        );
        let (query_tx, query_rx) = watch::channel(String::new());
        let inner = Arc::new(SearchInner {
            container,
            use_cases,
            query_tx,
            tasks: TaskGroup::default(),
            search_task: TaskSlot::default(),
            served: Mutex::new(None),
        });

        let on_input = {
            let inner = inner.clone();
            move |query: &String| {
                if query.trim().is_empty() {
                    inner.search_task.abort();
                    inner.container.update(|s| SearchViewModelState {
                        is_searching: false,
                        articles: Vec::new(),
                        ..s
                    });
                }
            }
        };
        let on_settled = {
            let inner = inner.clone();
            move |query: String| {
                if query.trim().is_empty() {
                    return;
                }
                if inner.already_served(&query) {
                    debug!("Query {:?} already searched with the current options", query);
                    return;
                }
                SearchInner::execute_search(&inner, query);
            }
        };
        inner
            .tasks
            .spawn(debounce(query_rx, config.debounce(), on_input, on_settled));

        Self { inner }
    }

    pub fn subscribe(&self) -> UiStateObserver<SearchUiState> {
        self.inner.container.subscribe()
    }

    pub fn ui_state(&self) -> SearchUiState {
        self.inner.container.ui_state()
    }

    pub async fn next_effect(&self) -> Option<SearchEffect> {
        self.inner.container.next_effect().await
    }

    pub fn try_next_effect(&self) -> Option<SearchEffect> {
        self.inner.container.try_next_effect()
    }

    pub fn on_intent(&self, intent: SearchIntent) {
        let inner = &self.inner;
        let container = &inner.container;

        match intent {
            SearchIntent::UpdateQuery(query) => inner.set_query(query),
            SearchIntent::ClearQuery => inner.set_query(String::new()),
            SearchIntent::RetrySearch => SearchInner::retry_search(inner),
            SearchIntent::SelectArticle(article) => {
                container.send_effect(SearchEffect::NavigateViewer(article.id));
            }
            SearchIntent::ShowArticleOverview(article) => {
                container.update(|s| SearchViewModelState {
                    selected_article: Some(article),
                    ..s
                });
            }
            SearchIntent::DismissArticleOverview => {
                container.update(|s| SearchViewModelState {
                    selected_article: None,
                    ..s
                });
            }
            SearchIntent::CopyArticleUrl => {
                if let Some(article) = container.with_state(|s| s.selected_article.clone()) {
                    container.send_effect(SearchEffect::CopyUrl(article.url));
                }
            }
            SearchIntent::ShareArticle => {
                if let Some(article) = container.with_state(|s| s.selected_article.clone()) {
                    container.send_effect(SearchEffect::ShareArticle {
                        title: article.title,
                        url: article.url,
                    });
                }
            }
            SearchIntent::NavigateBack => container.send_effect(SearchEffect::NavigateBack),
            SearchIntent::ShowOptionsSheet => container.update(|s| SearchViewModelState {
                is_options_sheet_visible: true,
                ..s
            }),
            SearchIntent::DismissOptionsSheet => container.update(|s| SearchViewModelState {
                is_options_sheet_visible: false,
                ..s
            }),
            SearchIntent::UpdateSortBy(sort_by) => {
                SearchInner::update_options(inner, |o| SearchOptions { sort_by, ..o });
            }
            SearchIntent::UpdateDateRange(date_range) => {
                SearchInner::update_options(inner, |o| SearchOptions { date_range, ..o });
            }
            SearchIntent::UpdateLanguage(language) => {
                SearchInner::update_options(inner, |o| SearchOptions { language, ..o });
            }
        }
    }
}

impl Drop for SearchScreen {
    fn drop(&mut self) {
        self.inner.tasks.abort_all();
    }
}

impl SearchInner {
    fn already_served(&self, query: &str) -> bool {
        let options = self.container.with_state(|s| s.options);
        let served = self.served.lock().unwrap_or_else(PoisonError::into_inner);
        served
            .as_ref()
            .is_some_and(|(q, o)| q == query && *o == options)
    }

    fn set_query(&self, query: String) {
        if self.container.with_state(|s| s.query != query) {
            *self.served.lock().unwrap_or_else(PoisonError::into_inner) = None;
        }
        self.container.update(|s| SearchViewModelState {
            query: query.clone(),
            ..s
        });
        self.query_tx.send_replace(query);
    }

    fn update_options(this: &Arc<Self>, change: impl FnOnce(SearchOptions) -> SearchOptions) {
        this.container.update(|s| SearchViewModelState {
            options: change(s.options),
            ..s
        });
        Self::retry_search(this);
    }

    fn retry_search(this: &Arc<Self>) {
        let query = this.container.with_state(|s| s.query.clone());
        if query.trim().is_empty() {
            debug!("Query is blank, not searching");
            return;
        }
        Self::execute_search(this, query);
    }

    /// Search for `query` with the current options, superseding any search
    /// still in flight.
    fn execute_search(this: &Arc<Self>, query: String) {
        this.container.update(|s| SearchViewModelState {
            status: SearchStatus::Stable,
            is_searching: true,
            ..s
        });
        let options = this.container.with_state(|s| s.options);
        *this.served.lock().unwrap_or_else(PoisonError::into_inner) =
            Some((query.clone(), options));
        let filters = options.to_filters(Utc::now());

        let inner = this.clone();
        let handle = this.tasks.spawn(async move {
            match inner.use_cases.search_articles.execute(&query, &filters).await {
                Ok(articles) => inner.container.update(|s| SearchViewModelState {
                    is_searching: false,
                    articles,
                    ..s
                }),
                Err(e) => {
                    error!("Failed to search articles: {}", e);
                    inner.container.update(|s| SearchViewModelState {
                        status: SearchStatus::Error,
                        is_searching: false,
                        error: Some(e),
                        ..s
                    });
                }
            }
        });
        this.search_task.replace(handle);
    }
}
