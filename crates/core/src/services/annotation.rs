use std::collections::HashMap;

use crate::models::balance::{BalanceHistoryPoint, TradeMarker};
use crate::models::chart::ChartPoint;

/// Attach trades to the balance series by calendar day.
///
/// Output has exactly one point per history point, in history order.
/// A marker joins a point when their `date` strings are equal; markers
/// keep their input order within a day. Markers for days missing from
/// the history are dropped.
pub fn annotate(history: &[BalanceHistoryPoint], markers: &[TradeMarker]) -> Vec<ChartPoint> {
    let mut by_date: HashMap<&str, Vec<&TradeMarker>> = HashMap::new();
    for marker in markers {
        by_date.entry(marker.date.as_str()).or_default().push(marker);
    }

    history
        .iter()
        .map(|point| {
            let trades = by_date
                .get(point.date.as_str())
                .map(|day| day.iter().map(|m| (*m).clone()).collect())
                .unwrap_or_default();
            ChartPoint::from_history(point, trades)
        })
        .collect()
}
