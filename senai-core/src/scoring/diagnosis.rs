//! SenAI diagnosis: a 0..=100 score from technical, fundamental and
//! momentum sub-scores, mapped to a rating, signal and recommendation.

use super::input::{SenAIInput, TechnicalSnapshot};
use crate::domain::FundamentalSnapshot;
use serde::{Deserialize, Serialize};

const BASELINE: i32 = 50;
const MAX_CONFIDENCE: f64 = 95.0;

/// Lowest and highest sums the fundamental rules can produce.
pub const FUNDAMENTAL_MIN: i32 = -11;
pub const FUNDAMENTAL_MAX: i32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "MUA")]
    Mua,
    #[serde(rename = "THEO DÕI")]
    TheoDoi,
    #[serde(rename = "NẮM GIỮ")]
    NamGiu,
    #[serde(rename = "BÁN")]
    Ban,
}

impl Recommendation {
    pub fn label(self) -> &'static str {
        match self {
            Recommendation::Mua => "MUA",
            Recommendation::TheoDoi => "THEO DÕI",
            Recommendation::NamGiu => "NẮM GIỮ",
            Recommendation::Ban => "BÁN",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Directional signal, serialized as -1 / 0 / 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Signal {
    Sell,
    Hold,
    Buy,
}

impl From<Signal> for i8 {
    fn from(s: Signal) -> i8 {
        match s {
            Signal::Sell => -1,
            Signal::Hold => 0,
            Signal::Buy => 1,
        }
    }
}

impl TryFrom<i8> for Signal {
    type Error = String;

    fn try_from(v: i8) -> Result<Self, Self::Error> {
        match v {
            -1 => Ok(Signal::Sell),
            0 => Ok(Signal::Hold),
            1 => Ok(Signal::Buy),
            other => Err(format!("signal must be -1, 0 or 1, got {other}")),
        }
    }
}

/// Score bands, highest first. The first band whose floor the score reaches
/// wins. "THEO DÕI" appears twice with opposite signals.
const BANDS: [(i32, Recommendation, Signal); 5] = [
    (75, Recommendation::Mua, Signal::Buy),
    (60, Recommendation::TheoDoi, Signal::Buy),
    (45, Recommendation::NamGiu, Signal::Hold),
    (30, Recommendation::TheoDoi, Signal::Sell),
    (i32::MIN, Recommendation::Ban, Signal::Sell),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubScores {
    pub technical: i32,
    pub fundamental: i32,
    pub momentum: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub score: u8,
    pub rating: u8,
    pub signal: Signal,
    pub recommendation: Recommendation,
    pub confidence: u8,
    pub breakdown: SubScores,
}

/// RSI tier, price against MA20/50/200, MA20/MA50 cross, 52-week position.
pub fn technical_score(t: &TechnicalSnapshot) -> i32 {
    let mut s = 0;

    s += if t.rsi14 < 30.0 {
        10
    } else if t.rsi14 < 40.0 {
        5
    } else if t.rsi14 <= 60.0 {
        3
    } else if t.rsi14 <= 70.0 {
        0
    } else {
        -5
    };

    for ma in [t.ma20, t.ma50, t.ma200] {
        s += if t.current_price > ma { 5 } else { -3 };
    }

    if t.ma20 > t.ma50 {
        s += 5;
    } else if t.ma20 < t.ma50 * 0.98 {
        s -= 5;
    }

    s += if t.price_position < 30.0 {
        10
    } else if t.price_position < 50.0 {
        5
    } else if t.price_position < 70.0 {
        3
    } else {
        0
    };

    s
}

/// P/E and P/B tiers (only when positive) and the ROE tier. A missing ROE
/// scores like a weak one.
pub fn fundamental_score(f: &FundamentalSnapshot) -> i32 {
    let mut s = 0;

    if let Some(pe) = f.pe.filter(|&pe| pe > 0.0) {
        s += if pe < 8.0 {
            12
        } else if pe < 12.0 {
            8
        } else if pe < 15.0 {
            5
        } else if pe < 20.0 {
            2
        } else if pe > 30.0 {
            -5
        } else {
            0
        };
    }

    if let Some(pb) = f.pb.filter(|&pb| pb > 0.0) {
        s += if pb < 1.0 {
            8
        } else if pb < 1.5 {
            5
        } else if pb < 2.5 {
            2
        } else if pb > 3.0 {
            -3
        } else {
            0
        };
    }

    let roe = f.roe.unwrap_or(0.0);
    s += if roe > 25.0 {
        10
    } else if roe > 20.0 {
        8
    } else if roe > 15.0 {
        5
    } else if roe > 10.0 {
        2
    } else {
        -3
    };

    s
}

/// Session change tier, volume-ratio tier, MACD against signal.
pub fn momentum_score(t: &TechnicalSnapshot) -> i32 {
    let mut s = 0;

    let change = t.price_change_pct;
    s += if change > 3.0 {
        5
    } else if change > 1.0 {
        3
    } else if change > -1.0 {
        1
    } else if change > -3.0 {
        -2
    } else {
        -5
    };

    let ratio = t.volume_ratio();
    s += if ratio > 2.0 {
        5
    } else if ratio > 1.5 {
        3
    } else if ratio > 0.8 {
        1
    } else {
        -2
    };

    if let (Some(macd), Some(signal)) = (t.macd, t.macd_signal) {
        s += if macd > signal { 5 } else { -3 };
    }

    s
}

/// `ceil(score / 20)`, kept inside 1..=5.
pub fn rating_for(score: u8) -> u8 {
    (score.div_ceil(20)).clamp(1, 5)
}

pub fn confidence_for(score: u8) -> u8 {
    let distance = (score as f64 - BASELINE as f64).abs();
    (60.0 + 0.7 * distance).min(MAX_CONFIDENCE).round() as u8
}

pub fn band_for(score: u8) -> (Recommendation, Signal) {
    let score = score as i32;
    BANDS
        .iter()
        .find(|(floor, _, _)| score >= *floor)
        .map(|&(_, rec, sig)| (rec, sig))
        .unwrap_or((Recommendation::Ban, Signal::Sell))
}

pub fn diagnose(input: &SenAIInput) -> Diagnosis {
    let breakdown = SubScores {
        technical: technical_score(&input.technical),
        fundamental: fundamental_score(&input.fundamentals),
        momentum: momentum_score(&input.technical),
    };
    let total = BASELINE + breakdown.technical + breakdown.fundamental + breakdown.momentum;
    let score = total.clamp(0, 100) as u8;
    let (recommendation, signal) = band_for(score);

    Diagnosis {
        score,
        rating: rating_for(score),
        signal,
        recommendation,
        confidence: confidence_for(score),
        breakdown,
    }
}
