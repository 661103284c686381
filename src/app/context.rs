use std::sync::Arc;

use tracing::warn;

use crate::app::error::AppError;
use crate::config::Config;
use crate::gateway::{HttpNewsGateway, HttpSummaryGateway, NewsGateway, SummaryGateway};
use crate::repository::{CachedNewsRepository, CachedSummaryRepository};
use crate::screen::{HomeScreen, SearchScreen, ViewerScreen};
use crate::usecase::UseCases;

/// Composition root: gateways, the repositories caching them, and the use
/// cases every screen is built from.
pub struct AppContext {
    pub config: Config,
    pub use_cases: UseCases,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self, AppError> {
        if config.news.api_key.is_empty() {
            warn!("No news API key configured");
        }
        if config.summary.api_key.is_empty() {
            warn!("No summary API key configured");
        }

        let news: Arc<dyn NewsGateway> = Arc::new(HttpNewsGateway::new(config.news.clone())?);
        let summary: Arc<dyn SummaryGateway> =
            Arc::new(HttpSummaryGateway::new(config.summary.clone())?);

        Ok(Self::with_gateways(config, news, summary))
    }

    pub fn with_gateways(
        config: Config,
        news: Arc<dyn NewsGateway>,
        summary: Arc<dyn SummaryGateway>,
    ) -> Self {
        let use_cases = UseCases::new(
            Arc::new(CachedNewsRepository::new(news)),
            Arc::new(CachedSummaryRepository::new(summary)),
        );
        Self { config, use_cases }
    }

    pub fn home_screen(&self) -> HomeScreen {
        HomeScreen::new(self.use_cases.clone(), self.config.screens)
    }

    pub fn search_screen(&self) -> SearchScreen {
        SearchScreen::new(self.use_cases.clone(), self.config.screens)
    }

    pub fn viewer_screen(&self, article_id: &str) -> ViewerScreen {
        ViewerScreen::new(article_id, self.use_cases.clone(), self.config.screens)
    }
}
