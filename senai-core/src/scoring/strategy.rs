//! Trading-zone strategy: buy zone, stop loss, three targets and a setup type.
//!
//! The setup type comes from `STRATEGY_RULES`, an ordered list of
//! `(predicate, outcome)` pairs. Conditions overlap (an oversold stock below
//! MA20 can also sit in a downtrend), so the first match wins and the order
//! of the list is part of the contract.

use super::input::TechnicalSnapshot;
use crate::analytics::KeyLevels;
use crate::domain::{round_to_tick, TickPolicy};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyType {
    #[serde(rename = "Bắt đáy")]
    BottomFishing,
    #[serde(rename = "Chốt lời")]
    TakeProfit,
    #[serde(rename = "Theo xu hướng")]
    TrendFollowing,
    #[serde(rename = "Đứng ngoài")]
    StayOut,
    #[serde(rename = "Tích lũy")]
    Accumulation,
    #[serde(rename = "Breakout")]
    Breakout,
    #[serde(rename = "Theo dõi")]
    Watch,
}

impl StrategyType {
    pub fn label(self) -> &'static str {
        match self {
            StrategyType::BottomFishing => "Bắt đáy",
            StrategyType::TakeProfit => "Chốt lời",
            StrategyType::TrendFollowing => "Theo xu hướng",
            StrategyType::StayOut => "Đứng ngoài",
            StrategyType::Accumulation => "Tích lũy",
            StrategyType::Breakout => "Breakout",
            StrategyType::Watch => "Theo dõi",
        }
    }

    pub fn note(self) -> &'static str {
        match self {
            StrategyType::BottomFishing => {
                "RSI quá bán + giá dưới MA20. Cơ hội bắt đáy khi có nến đảo chiều với volume tăng."
            }
            StrategyType::TakeProfit => {
                "RSI quá mua. Cân nhắc chốt lời 50-70% vị thế tại vùng kháng cự."
            }
            StrategyType::TrendFollowing => {
                "Xu hướng TĂNG (Giá > MA20 > MA50). Mua khi pullback về MA20."
            }
            StrategyType::StayOut => "Xu hướng GIẢM. KHÔNG GIAO DỊCH. Chờ tín hiệu đảo chiều.",
            StrategyType::Accumulation => "Thị trường SIDEWAY. Mua tại hỗ trợ, bán tại kháng cự.",
            StrategyType::Breakout => "Giá gần kháng cự. Chờ BREAKOUT với volume đột biến (>2x).",
            StrategyType::Watch => "Chưa có setup rõ ràng. Theo dõi và chờ cơ hội.",
        }
    }
}

impl std::fmt::Display for StrategyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// What a setup rule sees.
#[derive(Debug, Clone, Copy)]
pub struct SetupContext<'a> {
    pub technical: &'a TechnicalSnapshot,
    pub levels: &'a KeyLevels,
}

type SetupPredicate = fn(&SetupContext<'_>) -> bool;

fn oversold_below_ma20(c: &SetupContext<'_>) -> bool {
    c.technical.rsi14 < 30.0 && c.technical.current_price < c.technical.ma20
}

fn overbought_above_ma20(c: &SetupContext<'_>) -> bool {
    c.technical.rsi14 > 70.0 && c.technical.current_price > c.technical.ma20
}

fn uptrend_stack(c: &SetupContext<'_>) -> bool {
    let t = c.technical;
    t.current_price > t.ma20 && t.ma20 > t.ma50
}

fn downtrend_stack(c: &SetupContext<'_>) -> bool {
    let t = c.technical;
    t.current_price < t.ma20 && t.ma20 < t.ma50
}

fn averages_converged(c: &SetupContext<'_>) -> bool {
    let t = c.technical;
    if t.ma50 <= 0.0 {
        return false;
    }
    let ratio = t.ma20 / t.ma50;
    ratio > 0.97 && ratio < 1.03
}

fn near_resistance(c: &SetupContext<'_>) -> bool {
    c.technical.current_price > c.levels.resistance1 * 0.98
}

/// Evaluated top-down; first match wins. `Watch` applies when none match.
pub const STRATEGY_RULES: [(SetupPredicate, StrategyType); 6] = [
    (oversold_below_ma20, StrategyType::BottomFishing),
    (overbought_above_ma20, StrategyType::TakeProfit),
    (uptrend_stack, StrategyType::TrendFollowing),
    (downtrend_stack, StrategyType::StayOut),
    (averages_converged, StrategyType::Accumulation),
    (near_resistance, StrategyType::Breakout),
];

pub fn classify(context: &SetupContext<'_>) -> StrategyType {
    STRATEGY_RULES
        .iter()
        .find(|(matches, _)| matches(context))
        .map(|&(_, outcome)| outcome)
        .unwrap_or(StrategyType::Watch)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    pub buy_zone_low: f64,
    pub buy_zone_high: f64,
    pub stop_loss: f64,
    pub target1: f64,
    pub target2: f64,
    pub target3: f64,
    pub strategy_type: StrategyType,
    pub strategy_note: String,
}

impl Strategy {
    /// Every price snapped to the nearest HOSE tick.
    pub fn rounded_to_tick(&self) -> Strategy {
        let tick = |p: f64| round_to_tick(p, TickPolicy::RoundNearest);
        Strategy {
            buy_zone_low: tick(self.buy_zone_low),
            buy_zone_high: tick(self.buy_zone_high),
            stop_loss: tick(self.stop_loss),
            target1: tick(self.target1),
            target2: tick(self.target2),
            target3: tick(self.target3),
            strategy_type: self.strategy_type,
            strategy_note: self.strategy_note.clone(),
        }
    }

    /// Reward-to-risk of target1 against the stop, `None` when the stop is
    /// not below the entry.
    pub fn reward_risk(&self, entry: f64) -> Option<f64> {
        let risk = entry - self.stop_loss;
        (risk > 0.0).then(|| (self.target1 - entry) / risk)
    }
}

pub fn plan_strategy(technical: &TechnicalSnapshot, levels: &KeyLevels) -> Strategy {
    let price = technical.current_price;
    let stop_loss = levels.support2 * 0.97;
    let risk = price - stop_loss;

    let strategy_type = classify(&SetupContext { technical, levels });

    Strategy {
        buy_zone_low: levels.support1 * 0.99,
        buy_zone_high: levels.support1 * 1.02,
        stop_loss,
        target1: (price + 1.5 * risk).min(levels.resistance1),
        target2: (price + 2.5 * risk).min(levels.resistance2),
        target3: (price + 4.0 * risk).max(levels.resistance2 * 1.1),
        strategy_type,
        strategy_note: strategy_type.note().to_string(),
    }
}
