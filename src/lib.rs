//! # Newsflow
//!
//! A news client: categorized headlines, full-text search and streamed AI
//! summaries, with the screen logic kept independent of any UI toolkit.
//!
//! ## Architecture
//!
//! ```text
//! Gateway → Normalizer → Repository (caches) → Use cases → Screens
//! ```
//!
//! - [`gateway`]: HTTP clients for the headline API and the summary stream
//! - [`repository`]: In-memory caches coordinating every gateway call
//! - [`screen`]: Home, Search and Viewer state machines
//!
//! ## Quick Start
//!
//! ```bash
//! # Top headlines
//! newsflow headlines --category technology
//!
//! # Search the last week, newest first
//! newsflow search "rust" --sort publishedAt --range week
//!
//! # Stream a summary
//! newsflow summarize https://example.com/story
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires gateways, repositories
/// and use cases together and hands out screens.
pub mod app;

/// Command-line interface using clap.
///
/// - `headlines [--category C] [--refresh]`
/// - `search <query> [--sort S] [--range R] [--language L]`
/// - `summarize <url>`
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/newsflow/config.toml`; API keys may also come from
/// the environment.
pub mod config;

/// Core domain models.
///
/// - [`Article`](domain::Article): A news article with a URL-derived SHA256 ID
/// - [`Category`](domain::Category): Headline topic
/// - [`SearchOptions`](domain::SearchOptions): Sort order, date range and language
pub mod domain;

/// Remote services.
///
/// - [`NewsGateway`](gateway::NewsGateway): Headlines and search
/// - [`SummaryGateway`](gateway::SummaryGateway): Streamed summaries over server-sent events
pub mod gateway;

/// Generic screen machinery: state container, debounce and minimum loading time.
pub mod mvi;

/// Maps raw API responses into [`Article`](domain::Article)s.
pub mod normalizer;

/// Cache-coordinated access to the gateways.
pub mod repository;

/// Screen state machines.
pub mod screen;

/// Validating wrappers around the repositories.
pub mod usecase;

#[cfg(test)]
mod testing;
