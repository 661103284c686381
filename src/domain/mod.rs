pub mod article;
pub mod category;
pub mod search;

pub use article::Article;
pub use category::Category;
pub use search::{DateRangePreset, SearchFilters, SearchLanguage, SearchOptions, SortBy};
