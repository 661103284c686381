use std::sync::Arc;

use tracing::error;

use crate::app::NewsflowError;
use crate::config::ScreenConfig;
use crate::domain::Article;
use crate::mvi::{StateContainer, UiStateObserver};
use crate::screen::{collect_summary, SummaryState, TaskGroup, TaskSlot};
use crate::usecase::UseCases;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewerStatus {
    #[default]
    Init,
    Loading,
    Stable,
    Error,
}

#[derive(Debug, Clone)]
pub struct ViewerViewModelState {
    pub status: ViewerStatus,
    pub article: Option<Article>,
    pub is_page_loading: bool,
    pub is_summarizing: bool,
    pub summary: String,
    pub error: Option<NewsflowError>,
}

impl Default for ViewerViewModelState {
    fn default() -> Self {
        Self {
            status: ViewerStatus::Init,
            article: None,
            is_page_loading: true,
            is_summarizing: false,
            summary: String::new(),
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerUiState {
    Init,
    Loading,
    Stable {
        article: Article,
        is_page_loading: bool,
        is_summarizing: bool,
        summary: String,
    },
    Error(NewsflowError),
}

impl ViewerViewModelState {
    fn to_ui_state(&self) -> ViewerUiState {
        match (self.status, &self.article) {
            (ViewerStatus::Init, _) => ViewerUiState::Init,
            (ViewerStatus::Stable, Some(article)) => ViewerUiState::Stable {
                article: article.clone(),
                is_page_loading: self.is_page_loading,
                is_summarizing: self.is_summarizing,
                summary: self.summary.trim().to_string(),
            },
            (ViewerStatus::Loading | ViewerStatus::Stable, _) => ViewerUiState::Loading,
            (ViewerStatus::Error, _) => ViewerUiState::Error(
                self.error
                    .clone()
                    .unwrap_or_else(|| NewsflowError::unknown(None)),
            ),
        }
    }
}

impl SummaryState for ViewerViewModelState {
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerIntent {
    NavigateBack,
    ShareArticle,
    StartPageLoading,
    FinishPageLoading,
    SummarizeArticle,
    DismissSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEffect {
    NavigateBack,
    ShareArticle { title: String, url: String },
    SummaryError(NewsflowError),
}

struct ViewerInner {
    container: StateContainer<ViewerViewModelState, ViewerUiState, ViewerEffect>,
    use_cases: UseCases,
    tasks: TaskGroup,
    summary_task: TaskSlot,
}

/// Shows one article that is already in the headline or search cache.
pub struct ViewerScreen {
    inner: Arc<ViewerInner>,
}

impl ViewerScreen {
    pub fn new(article_id: &str, use_cases: UseCases, config: ScreenConfig) -> Self {
        let container = StateContainer::new(
            ViewerViewModelState::default(),
            Arc::new(ViewerViewModelState::to_ui_state),
            &config,
        );
        let inner = Arc::new(ViewerInner {
            container,
            use_cases,
            tasks: TaskGroup::default(),
            summary_task: TaskSlot::default(),
        });

        ViewerInner::load_article(&inner, article_id);
        Self { inner }
    }

    pub fn subscribe(&self) -> UiStateObserver<ViewerUiState> {
        self.inner.container.subscribe()
    }

    pub fn ui_state(&self) -> ViewerUiState {
        self.inner.container.ui_state()
    }

    pub async fn next_effect(&self) -> Option<ViewerEffect> {
        self.inner.container.next_effect().await
    }

    pub fn try_next_effect(&self) -> Option<ViewerEffect> {
        self.inner.container.try_next_effect()
    }

    pub fn on_intent(&self, intent: ViewerIntent) {
        let inner = &self.inner;
        let container = &inner.container;

        match intent {
            ViewerIntent::NavigateBack => container.send_effect(ViewerEffect::NavigateBack),
            ViewerIntent::ShareArticle => {
                if let Some(article) = container.with_state(|s| s.article.clone()) {
                    container.send_effect(ViewerEffect::ShareArticle {
                        title: article.title,
                        url: article.url,
                    });
                }
            }
            ViewerIntent::StartPageLoading => container.update(|s| ViewerViewModelState {
                is_page_loading: true,
                ..s
            }),
            ViewerIntent::FinishPageLoading => container.update(|s| ViewerViewModelState {
                is_page_loading: false,
                ..s
            }),
            ViewerIntent::SummarizeArticle => {
                if let Some(article) = container.with_state(|s| s.article.clone()) {
                    ViewerInner::summarize(inner, &article.url);
                }
            }
            ViewerIntent::DismissSummary => {
                inner.summary_task.abort();
                container.update(|s| ViewerViewModelState {
                    is_summarizing: false,
                    summary: String::new(),
                    ..s
                });
            }
        }
    }
}

impl Drop for ViewerScreen {
    fn drop(&mut self) {
        self.inner.tasks.abort_all();
    }
}

impl ViewerInner {
    fn load_article(this: &Arc<Self>, article_id: &str) {
        if article_id.trim().is_empty() {
            this.fail(NewsflowError::invalid_parameter("Article ID is missing"));
            return;
        }

        this.container.update(|s| ViewerViewModelState {
            status: ViewerStatus::Loading,
            ..s
        });

        let inner = this.clone();
        let article_id = article_id.to_string();
        this.tasks.spawn(async move {
            match inner.use_cases.get_article_by_id.execute(&article_id).await {
                Ok(article) => inner.container.update(|s| ViewerViewModelState {
                    status: ViewerStatus::Stable,
                    article: Some(article),
                    ..s
                }),
                Err(e) => inner.fail(e),
            }
        });
    }

    fn fail(&self, e: NewsflowError) {
        error!("Failed to load article: {}", e);
        self.container.update(|s| ViewerViewModelState {
            status: ViewerStatus::Error,
            error: Some(e),
            ..s
        });
    }

    fn summarize(this: &Arc<Self>, url: &str) {
        let stream = this.use_cases.summarize_article.execute(url);
        this.container.update(ViewerViewModelState::start_summary);

        let inner = this.clone();
        let handle = this.tasks.spawn(async move {
            collect_summary(&inner.container, stream, ViewerEffect::SummaryError).await;
        });
        this.summary_task.replace(handle);
    }
}
