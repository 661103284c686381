use chrono::DateTime;
use html_escape::decode_html_entities;

use crate::domain::Article;
use crate::gateway::model::{ArticleResponse, NewsResponse};

/// Title the headline API substitutes for withdrawn articles
const REMOVED_PLACEHOLDER: &str = "[Removed]";

/// Map a raw API response to domain articles, preserving order.
pub fn to_articles(response: NewsResponse) -> Vec<Article> {
    response
        .articles
        .into_iter()
        .filter(|a| a.title != REMOVED_PLACEHOLDER)
        .map(to_article)
        .collect()
}

fn to_article(raw: ArticleResponse) -> Article {
    let published_at = DateTime::parse_from_rfc3339(&raw.published_at)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0);

    Article {
        id: Article::generate_id(&raw.url),
        source: Some(raw.source.name),
        author: raw.author,
        title: decode_html_entities(&raw.title).to_string(),
        description: raw
            .description
            .map(|d| decode_html_entities(&d).to_string())
            .unwrap_or_default(),
        url: raw.url,
        image_url: raw.url_to_image,
        published_at,
    }
}
