pub mod aggregator;
pub mod extractor;
pub mod navigator;
pub mod resolver;
pub mod summary;

#[cfg(test)]
mod tests;

pub use aggregator::{Aggregator, CategoryOutcome, HarvestReport};
pub use extractor::{ArticleExtractor, Tier};
pub use resolver::CategoryResolver;
pub use summary::SummaryFetcher;
