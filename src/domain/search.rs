use std::str::FromStr;

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortBy {
    #[default]
    Relevancy,
    Popularity,
    PublishedAt,
}

impl SortBy {
    pub fn api_value(self) -> &'static str {
        match self {
            SortBy::Relevancy => "relevancy",
            SortBy::Popularity => "popularity",
            SortBy::PublishedAt => "publishedAt",
        }
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relevancy" => Ok(SortBy::Relevancy),
            "popularity" => Ok(SortBy::Popularity),
            "publishedat" | "published" | "latest" => Ok(SortBy::PublishedAt),
            other => Err(format!("Unknown sort order: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DateRangePreset {
    #[default]
    All,
    Last24Hours,
    LastWeek,
    LastMonth,
}

impl DateRangePreset {
    /// Resolve the preset to a `(from, to)` pair of calendar dates relative to `now`.
    pub fn to_date_range(self, now: DateTime<Utc>) -> (Option<NaiveDate>, Option<NaiveDate>) {
        let today = now.date_naive();
        let from = match self {
            DateRangePreset::All => return (None, None),
            DateRangePreset::Last24Hours => today.checked_sub_days(Days::new(1)),
            DateRangePreset::LastWeek => today.checked_sub_days(Days::new(7)),
            DateRangePreset::LastMonth => today.checked_sub_months(Months::new(1)),
        };
        (from, Some(today))
    }
}

impl FromStr for DateRangePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(DateRangePreset::All),
            "24h" | "day" | "last24hours" => Ok(DateRangePreset::Last24Hours),
            "week" | "7d" | "lastweek" => Ok(DateRangePreset::LastWeek),
            "month" | "lastmonth" => Ok(DateRangePreset::LastMonth),
            other => Err(format!("Unknown date range: {}. Use all, 24h, week or month", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SearchLanguage {
    #[default]
    All,
    English,
    Japanese,
}

impl SearchLanguage {
    pub fn api_value(self) -> Option<&'static str> {
        match self {
            SearchLanguage::All => None,
            SearchLanguage::English => Some("en"),
            SearchLanguage::Japanese => Some("ja"),
        }
    }
}

impl FromStr for SearchLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(SearchLanguage::All),
            "en" | "english" => Ok(SearchLanguage::English),
            "ja" | "japanese" => Ok(SearchLanguage::Japanese),
            other => Err(format!("Unknown language: {}", other)),
        }
    }
}

/// User-selected knobs applied to every search issued from the search screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    pub sort_by: SortBy,
    pub date_range: DateRangePreset,
    pub language: SearchLanguage,
}

impl SearchOptions {
    pub fn to_filters(self, now: DateTime<Utc>) -> SearchFilters {
        let (from, to) = self.date_range.to_date_range(now);
        SearchFilters {
            sort_by: Some(self.sort_by),
            from,
            to,
            language: self.language.api_value().map(String::from),
        }
    }
}

/// Filters passed through to the search endpoint. `None` means "not sent".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub sort_by: Option<SortBy>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub language: Option<String>,
}
