use std::sync::Arc;

use crate::models::balance::{BalanceHistoryPoint, TradeMarker};
use crate::models::market::{HistoryData, MarketOverview};

/// Normalized identity of a value for change detection.
///
/// Two values with the same key are considered equal for rendering
/// purposes, even if they differ below the key's precision.
pub trait ChangeKey {
    fn change_key(&self) -> String;
}

impl ChangeKey for Vec<BalanceHistoryPoint> {
    /// `date|balance:.2` per point, joined with `;`. Sub-cent changes are ignored.
    fn change_key(&self) -> String {
        self.iter()
            .map(BalanceHistoryPoint::normalized_key)
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl ChangeKey for Vec<TradeMarker> {
    fn change_key(&self) -> String {
        self.iter()
            .map(TradeMarker::normalized_key)
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl ChangeKey for Vec<MarketOverview> {
    fn change_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl ChangeKey for HistoryData {
    fn change_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Holds a value behind an `Arc` together with its last applied key.
///
/// `replace_if_changed` swaps the `Arc` only when the key differs. A no-op
/// update therefore keeps the same allocation, and anything that redraws
/// on pointer change (`Arc::ptr_eq`) stays still.
#[derive(Debug, Clone)]
pub struct ChangeCell<V> {
    value: Arc<V>,
    key: String,
}

impl<V: ChangeKey + Default> Default for ChangeCell<V> {
    fn default() -> Self {
        let value = V::default();
        let key = value.change_key();
        Self {
            value: Arc::new(value),
            key,
        }
    }
}

impl<V: ChangeKey + Default> ChangeCell<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the stored value was replaced.
    pub fn replace_if_changed(&mut self, next: V) -> bool {
        let key = next.change_key();
        if key == self.key {
            return false;
        }
        self.value = Arc::new(next);
        self.key = key;
        true
    }

    #[must_use]
    pub fn get(&self) -> Arc<V> {
        Arc::clone(&self.value)
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<V> std::ops::Deref for ChangeCell<V> {
    type Target = V;

    fn deref(&self) -> &V {
        &self.value
    }
}
