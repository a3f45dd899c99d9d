//! SenAI composite scoring.
//!
//! Rule-based, not statistical: every scorer is a pure function of its
//! input struct. Randomness (the health-card fallback) enters only through
//! an injected `FallbackScoreSource`.

pub mod diagnosis;
pub mod health;
pub mod input;
pub mod risk;
pub mod strategy;

pub use diagnosis::{
    diagnose, fundamental_score, momentum_score, technical_score, Diagnosis, Recommendation,
    Signal, SubScores,
};
pub use health::{rescaled_fundamental_score, stock_health, FundamentalSource, StockHealth};
pub use input::{SenAIInput, TechnicalSnapshot};
pub use risk::{assess_risk, HoldingStyle, Risk, VolatilityLevel};
pub use strategy::{classify, plan_strategy, SetupContext, Strategy, StrategyType};
