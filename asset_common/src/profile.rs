//! Asset types, their volatility profiles, and the collection name classification table.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Bounds on simulated price movement for one asset type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityProfile {
    /// Standard deviation of the daily gaussian variation.
    pub base: f64,
    /// Largest absolute daily variation; draws are clamped to `[-max, max]`.
    pub max: f64,
}

/// Kind of tradable instrument a stored document describes.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    Hash,
    Eq,
    PartialEq,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AssetType {
    /// Cryptocurrencies; also the fallback for unknown tags.
    #[default]
    Crypto,
    /// Fiat currency pairs.
    Currency,
    /// Metals and other commodities.
    Mineral,
    /// Funds and other exchange-traded instruments.
    Trade,
}

impl AssetType {
    /// Volatility profile used when simulating prices of this type.
    pub fn profile(self) -> VolatilityProfile {
        match self {
            AssetType::Crypto => VolatilityProfile { base: 0.05, max: 0.15 },
            AssetType::Currency => VolatilityProfile { base: 0.01, max: 0.03 },
            AssetType::Mineral => VolatilityProfile { base: 0.04, max: 0.10 },
            AssetType::Trade => VolatilityProfile { base: 0.05, max: 0.12 },
        }
    }

    /// Parse a type tag, falling back to `Crypto` for anything unknown.
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or_default()
    }

    /// Type implied by a stored collection name, if it is one of the well-known ones.
    pub fn from_collection_name(name: &str) -> Option<Self> {
        match name {
            "cryptoPrices" => Some(AssetType::Crypto),
            "forexPrices" => Some(AssetType::Currency),
            "mineralPrices" | "commodityPrices" => Some(AssetType::Mineral),
            "fundPrices" | "tradePrices" => Some(AssetType::Trade),
            _ => None,
        }
    }

    /// Resolve the type of a stored document.
    ///
    /// The collection name wins; otherwise the document's own top-level `type`
    /// string is used; otherwise `Crypto`.
    pub fn resolve(name: &str, data: &serde_json::Value) -> Self {
        Self::from_collection_name(name)
            .or_else(|| data.get("type").and_then(|t| t.as_str()).map(Self::from_tag))
            .unwrap_or_default()
    }
}
