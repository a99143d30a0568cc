use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::balance::{BalanceHistoryPoint, TradeMarker, TradeSide};

/// A balance point with the trades executed on that day attached.
///
/// The core produces these; the frontend only renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: String,
    pub balance: f64,
    pub timestamp: DateTime<Utc>,

    /// Every marker whose `date` equals this point's `date`, in input order.
    pub trades: Vec<TradeMarker>,
}

impl ChartPoint {
    pub fn from_history(point: &BalanceHistoryPoint, trades: Vec<TradeMarker>) -> Self {
        Self {
            date: point.date.clone(),
            balance: point.balance,
            timestamp: point.timestamp,
            trades,
        }
    }

    /// How the chart should draw this point.
    ///
    /// The first marker in input order decides the color. A day without
    /// trades gets a zero-radius dot so only the line shows.
    #[must_use]
    pub fn dot(&self) -> DotStyle {
        match self.trades.first() {
            None => DotStyle {
                radius: 0.0,
                color: DotColor::None,
            },
            Some(first) => DotStyle {
                radius: MARKER_RADIUS,
                color: DotColor::for_side(first.side),
            },
        }
    }

    /// Same-day trades for the hover tooltip, oldest first.
    #[must_use]
    pub fn tooltip_trades(&self) -> Vec<&TradeMarker> {
        let mut trades: Vec<&TradeMarker> = self.trades.iter().collect();
        trades.sort_by_key(|t| t.timestamp);
        trades
    }

    #[must_use]
    pub fn has_trades(&self) -> bool {
        !self.trades.is_empty()
    }
}

/// Radius of a dot that carries at least one trade.
pub const MARKER_RADIUS: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DotStyle {
    pub radius: f64,
    pub color: DotColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DotColor {
    /// No dot drawn.
    None,
    Green,
    Red,
    Gray,
}

impl DotColor {
    pub fn for_side(side: TradeSide) -> Self {
        match side {
            TradeSide::Long => DotColor::Green,
            TradeSide::Short => DotColor::Red,
            TradeSide::Hold => DotColor::Gray,
        }
    }

    /// CSS hex value for hosts that render with web charting libraries.
    pub fn hex(&self) -> Option<&'static str> {
        match self {
            DotColor::None => None,
            DotColor::Green => Some("#10b981"),
            DotColor::Red => Some("#ef4444"),
            DotColor::Gray => Some("#9ca3af"),
        }
    }
}
