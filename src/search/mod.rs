pub mod cache;
pub mod executor;
pub mod matcher;
pub mod scorer;

pub use cache::{CacheKey, QueryResultCache};
pub use executor::{FileMatch, FuzzyQuery, FuzzySearchResult, FuzzySearcher};
pub use matcher::Matcher;
pub use scorer::ScoringWeights;
