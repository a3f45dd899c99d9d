//! Fundamental ratios supplied by the data collaborator.

use serde::{Deserialize, Serialize};

/// Point-in-time fundamental ratios. Any field may be absent for a given
/// symbol or date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundamentalSnapshot {
    pub pe: Option<f64>,
    pub pb: Option<f64>,
    /// Return on equity, in percent.
    pub roe: Option<f64>,
    pub eps: Option<f64>,
    pub debt_to_equity: Option<f64>,
    /// Year-over-year revenue growth, in percent.
    pub revenue_growth: Option<f64>,
    /// Year-over-year profit growth, in percent.
    pub profit_growth: Option<f64>,
}

impl FundamentalSnapshot {
    /// True when no ratio is present at all.
    pub fn is_empty(&self) -> bool {
        self.pe.is_none()
            && self.pb.is_none()
            && self.roe.is_none()
            && self.eps.is_none()
            && self.debt_to_equity.is_none()
            && self.revenue_growth.is_none()
            && self.profit_growth.is_none()
    }
}
