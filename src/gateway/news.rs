use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::{debug, warn};
use url::Url;

use crate::config::NewsApiConfig;
use crate::domain::{Category, SearchFilters};
use crate::gateway::model::{NewsErrorBody, NewsResponse};
use crate::gateway::{GatewayError, GatewayResult, NewsGateway};

const TOP_HEADLINES: &str = "top-headlines";
const EVERYTHING: &str = "everything";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct HttpNewsGateway {
    client: Client,
    config: NewsApiConfig,
}

impl HttpNewsGateway {
    pub fn new(config: NewsApiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout())
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> GatewayResult<Url> {
        let base = self.config.base_url.trim_end_matches('/');
        Url::parse_with_params(&format!("{}/{}", base, path), params)
            .map_err(|e| GatewayError::Transport(format!("Invalid URL {}: {}", base, e)))
    }

    pub fn headlines_url(&self, category: Category) -> GatewayResult<Url> {
        self.endpoint(
            TOP_HEADLINES,
            &[
                ("category", category.as_str().to_string()),
                ("country", self.config.country.clone()),
            ],
        )
    }

    pub fn search_url(&self, query: &str, filters: &SearchFilters) -> GatewayResult<Url> {
        let mut params = vec![("q", query.to_string())];
        if let Some(sort_by) = filters.sort_by {
            params.push(("sortBy", sort_by.api_value().to_string()));
        }
        if let Some(from) = filters.from {
            params.push(("from", from.format(DATE_FORMAT).to_string()));
        }
        if let Some(to) = filters.to {
            params.push(("to", to.format(DATE_FORMAT).to_string()));
        }
        if let Some(language) = &filters.language {
            params.push(("language", language.clone()));
        }
        self.endpoint(EVERYTHING, &params)
    }

    async fn get(&self, url: Url) -> GatewayResult<NewsResponse> {
        debug!("GET {}", url.path());
        let response = self
            .client
            .get(url)
            .header("X-Api-Key", &self.config.api_key)
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.json::<NewsResponse>().await?)
    }
}

/// Turn a non-2xx response into a `Status` error carrying the API's own message.
async fn check_status(response: Response) -> GatewayResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<NewsErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string());

    warn!(status = %status, message = %message, "News API error");
    Err(GatewayError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl NewsGateway for HttpNewsGateway {
    async fn fetch_top_headlines(&self, category: Category) -> GatewayResult<NewsResponse> {
        let url = self.headlines_url(category)?;
        self.get(url).await
    }

    async fn search(&self, query: &str, filters: &SearchFilters) -> GatewayResult<NewsResponse> {
        let url = self.search_url(query, filters)?;
        self.get(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SortBy;
    use chrono::NaiveDate;

    fn gateway() -> HttpNewsGateway {
        HttpNewsGateway::new(NewsApiConfig::default()).unwrap()
    }

    #[test]
    fn test_headlines_url() {
        let url = gateway().headlines_url(Category::Science).unwrap();
        assert_eq!(
            url.as_str(),
            "https://newsapi.org/v2/top-headlines?category=science&country=us"
        );
    }

    #[test]
    fn test_search_url_includes_only_present_filters() {
        let filters = SearchFilters {
            sort_by: Some(SortBy::PublishedAt),
            from: NaiveDate::from_ymd_opt(2024, 3, 8),
            to: NaiveDate::from_ymd_opt(2024, 3, 15),
            language: None,
        };
        let url = gateway().search_url("rust lang", &filters).unwrap();
        assert_eq!(
            url.as_str(),
            "https://newsapi.org/v2/everything?q=rust+lang&sortBy=publishedAt&from=2024-03-08&to=2024-03-15"
        );
    }

    #[test]
    fn test_trailing_slash_in_base_url() {
        let config = NewsApiConfig {
            base_url: "http://localhost:8080/v2/".into(),
            ..Default::default()
        };
        let gateway = HttpNewsGateway::new(config).unwrap();
        let url = gateway.search_url("q", &SearchFilters::default()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/v2/everything?q=q");
    }
}
