//! Data collaborators: price/ratio providers and the narrative insight cache.

pub mod circuit_breaker;
pub mod csv_import;
pub mod insight;
pub mod provider;
pub mod rest;

pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use csv_import::CsvProvider;
pub use insight::{
    FundamentalsBrief, InsightCache, InsightRecord, InsightService, MemoryInsightCache,
    NarrativeProvider, RestInsightCache, Sentiment, TargetBand,
};
pub use provider::{assemble_series, DataError, DataProvider};
pub use rest::{RestBackend, SYMBOL_DATE_KEY};
