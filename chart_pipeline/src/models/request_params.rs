use serde::{Deserialize, Serialize};

use crate::models::cadence::Cadence;

/// What to ask a [`MarketDataProvider`](crate::providers::MarketDataProvider)
/// for: the full available history of one symbol at one cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarsRequest {
    pub symbol: String,
    pub cadence: Cadence,
}

impl BarsRequest {
    pub fn new(symbol: impl Into<String>, cadence: Cadence) -> Self {
        Self {
            symbol: symbol.into(),
            cadence,
        }
    }
}
