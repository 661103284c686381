pub mod commands;

use clap::{Parser, Subcommand};

use crate::domain::{Category, DateRangePreset, SearchLanguage, SortBy};

#[derive(Parser)]
#[command(name = "newsflow")]
#[command(about = "Headlines, search and AI summaries from the terminal", long_about = None)]
pub struct Cli {
    /// Path to the config file (default: ~/.config/newsflow/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show top headlines for a category
    Headlines {
        /// general, business, technology, entertainment, sports, science or health
        #[arg(short, long, default_value = "general")]
        category: Category,

        /// Bypass the cache
        #[arg(long)]
        refresh: bool,
    },
    /// Search all articles
    Search {
        query: String,

        /// relevancy, popularity or publishedAt
        #[arg(long, default_value = "relevancy")]
        sort: SortBy,

        /// all, 24h, week or month
        #[arg(long, default_value = "all")]
        range: DateRangePreset,

        /// all, en or ja
        #[arg(long, default_value = "all")]
        language: SearchLanguage,
    },
    /// Stream an AI summary of an article
    Summarize {
        /// URL of the article
        url: String,
    },
}
