use std::io::Write;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use tracing::warn;

use crate::app::{AppContext, Result};
use crate::domain::{Article, Category, SearchOptions};
use crate::repository::SummaryStream;

pub async fn show_headlines(ctx: &AppContext, category: Category, refresh: bool) -> Result<()> {
    let articles = ctx
        .use_cases
        .fetch_top_headlines
        .execute(category, refresh)
        .await?;

    if articles.is_empty() {
        println!("No headlines for {}", category);
        return Ok(());
    }

    print_articles(&articles);
    Ok(())
}

pub async fn search(ctx: &AppContext, query: &str, options: SearchOptions) -> Result<()> {
    let filters = options.to_filters(Utc::now());
    let articles = ctx.use_cases.search_articles.execute(query, &filters).await?;

    if articles.is_empty() {
        println!("No results for \"{}\"", query.trim());
        return Ok(());
    }

    println!("{} results", articles.len());
    print_articles(&articles);
    Ok(())
}

/// Print the summary as it streams in.
pub async fn summarize(ctx: &AppContext, url: &str) -> Result<()> {
    let fragments = ctx.use_cases.summarize_article.execute(url);
    write_summary(fragments, &mut std::io::stdout()).await
}

async fn write_summary(mut fragments: SummaryStream, out: &mut impl Write) -> Result<()> {
    while let Some(fragment) = fragments.next().await {
        let fragment = fragment?;
        if let Err(e) = write!(out, "{}", fragment).and_then(|_| out.flush()) {
            warn!("Failed to write summary output: {}", e);
        }
    }
    if let Err(e) = writeln!(out) {
        warn!("Failed to write summary output: {}", e);
    }

    Ok(())
}

fn print_articles(articles: &[Article]) {
    for article in articles {
        println!("{}", format_article(article));
    }
}

fn format_article(article: &Article) -> String {
    let date = DateTime::from_timestamp_millis(article.published_at)
        .filter(|_| article.published_at > 0)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "          ".to_string());

    format!(
        "{} {}\n  {} | {}",
        date,
        article.title,
        article.display_source(),
        article.url
    )
}
