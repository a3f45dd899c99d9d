//! Risk estimate: upside probability, downside risk, holding horizon, beta.
//!
//! `beta` here is a volatility proxy, `1 + (vol - 25) / 50`, anchored on a
//! 25% market volatility. It is not a regression against the index.

use super::input::SenAIInput;
use serde::{Deserialize, Serialize};

const MARKET_VOLATILITY: f64 = 25.0;
const RISK_FREE_RATE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolatilityLevel {
    #[serde(rename = "Thấp")]
    Low,
    #[serde(rename = "Trung bình")]
    Medium,
    #[serde(rename = "Cao")]
    High,
    #[serde(rename = "Rất cao")]
    VeryHigh,
}

impl VolatilityLevel {
    pub fn from_volatility(vol: f64) -> Self {
        if vol < 20.0 {
            VolatilityLevel::Low
        } else if vol < 35.0 {
            VolatilityLevel::Medium
        } else if vol < 50.0 {
            VolatilityLevel::High
        } else {
            VolatilityLevel::VeryHigh
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VolatilityLevel::Low => "Thấp",
            VolatilityLevel::Medium => "Trung bình",
            VolatilityLevel::High => "Cao",
            VolatilityLevel::VeryHigh => "Rất cao",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoldingStyle {
    Scalping,
    #[serde(rename = "Swing ngắn")]
    ShortSwing,
    Swing,
    Position,
    #[serde(rename = "Đầu tư")]
    Investment,
}

impl HoldingStyle {
    pub fn label(self) -> &'static str {
        match self {
            HoldingStyle::Scalping => "Scalping",
            HoldingStyle::ShortSwing => "Swing ngắn",
            HoldingStyle::Swing => "Swing",
            HoldingStyle::Position => "Position",
            HoldingStyle::Investment => "Đầu tư",
        }
    }
}

/// Holding days and style for an annualized volatility.
pub fn holding_horizon(vol: f64) -> (u32, HoldingStyle) {
    if vol > 45.0 {
        (5, HoldingStyle::Scalping)
    } else if vol > 35.0 {
        (10, HoldingStyle::ShortSwing)
    } else if vol > 25.0 {
        (20, HoldingStyle::Swing)
    } else if vol > 15.0 {
        (40, HoldingStyle::Position)
    } else {
        (60, HoldingStyle::Investment)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    pub optimal_holding_days: u32,
    pub holding_style: HoldingStyle,
    /// Percent, integer-rounded, 15..=85.
    pub upside_probability: f64,
    /// Percent, one decimal, at most 30.
    pub downside_risk: f64,
    /// Annualized percent, one decimal.
    pub volatility: f64,
    pub volatility_level: VolatilityLevel,
    /// Two decimals, 0.3..=2.5.
    pub beta: f64,
    /// Two decimals, -2..=3.
    pub sharpe_ratio: f64,
    /// Percent, one decimal.
    pub max_drawdown: f64,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn upside_probability(input: &SenAIInput) -> f64 {
    let t = &input.technical;
    let f = &input.fundamentals;
    let mut p: f64 = 50.0;

    if t.current_price > t.ma20 {
        p += 8.0;
    }
    if t.current_price > t.ma50 {
        p += 7.0;
    }
    if t.current_price > t.ma200 {
        p += 5.0;
    }

    if t.rsi14 < 30.0 {
        p += 12.0;
    } else if t.rsi14 < 40.0 {
        p += 10.0;
    } else if t.rsi14 > 70.0 {
        p -= 10.0;
    } else if t.rsi14 > 60.0 {
        p -= 8.0;
    }

    if t.price_position < 30.0 {
        p += 10.0;
    } else if t.price_position < 50.0 {
        p += 5.0;
    } else if t.price_position > 80.0 {
        p -= 5.0;
    }

    if f.pe.is_some_and(|pe| pe > 0.0 && pe < 15.0) {
        p += 5.0;
    }
    if f.roe.is_some_and(|roe| roe > 15.0) {
        p += 5.0;
    }

    p.clamp(15.0, 85.0)
}

/// `(annualized session return - 5%) / volatility`, zero when volatility is.
pub fn sharpe_ratio(price_change_pct: f64, volatility: f64) -> f64 {
    if volatility <= 0.0 {
        return 0.0;
    }
    let expected = price_change_pct * 252.0 / 100.0;
    ((expected - RISK_FREE_RATE) / (volatility / 100.0)).clamp(-2.0, 3.0)
}

/// Risk from the scorer input plus annualized volatility and max drawdown,
/// both in percent.
pub fn assess_risk(input: &SenAIInput, volatility: f64, max_drawdown: f64) -> Risk {
    let downside = (0.6 * max_drawdown + 0.3 * volatility).min(30.0);
    let (days, style) = holding_horizon(volatility);
    let beta = (1.0 + (volatility - MARKET_VOLATILITY) / 50.0).clamp(0.3, 2.5);

    Risk {
        optimal_holding_days: days,
        holding_style: style,
        upside_probability: upside_probability(input).round(),
        downside_risk: round_to(downside, 1),
        volatility: round_to(volatility, 1),
        volatility_level: VolatilityLevel::from_volatility(volatility),
        beta: round_to(beta, 2),
        sharpe_ratio: round_to(sharpe_ratio(input.technical.price_change_pct, volatility), 2),
        max_drawdown: round_to(max_drawdown, 1),
    }
}
