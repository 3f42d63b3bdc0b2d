//! Stochastic price model.
//!
//! One step of the model moves a price by a gaussian variation (plus a small trend
//! bias) clamped to the profile's maximum daily change, then folds the new price into
//! the rolling `avg/low/high` history. Every output is rounded to cents.

use asset_common::VolatilityProfile;
use serde_json::{Map, Value, json};
use strum_macros::{Display, EnumIter, EnumString};

use crate::noise::{UniformSource, gaussian_noise};

/// Drift added to the variation of a bullish/bearish asset.
const TREND_BIAS: f64 = 0.005;
/// Weight of the previous average in the smoothed average.
const AVG_DECAY: f64 = 0.9;

/// Market sentiment stored under `market.trend`.
#[derive(Debug, Clone, Copy, Display, EnumString, EnumIter, Eq, PartialEq)]
#[strum(serialize_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    Sideways,
}

impl Trend {
    /// Drift added to every draw while this trend holds.
    pub fn bias(self) -> f64 {
        match self {
            Trend::Bullish => TREND_BIAS,
            Trend::Bearish => -TREND_BIAS,
            Trend::Sideways => 0.0,
        }
    }

    /// Read `market.trend` from an asset node; anything unrecognised is no trend.
    pub fn of_asset(asset: &Map<String, Value>) -> Option<Self> {
        asset.get("market")?.get("trend")?.as_str()?.parse().ok()
    }
}

/// Rolling statistics written back under `history`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct History {
    pub avg: f64,
    pub low: f64,
    pub high: f64,
}

impl History {
    pub fn to_json(&self) -> Value {
        json!({ "avg": self.avg, "low": self.low, "high": self.high })
    }
}

/// History as found on an asset before an update. Missing, non-numeric and zero
/// values all count as absent and are seeded with the new price.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriorHistory {
    pub avg: Option<f64>,
    pub low: Option<f64>,
    pub high: Option<f64>,
}

impl PriorHistory {
    pub fn from_json(history: Option<&Value>) -> Self {
        let field = |key: &str| {
            history
                .and_then(|h| h.get(key))
                .and_then(Value::as_f64)
                .filter(|v| *v != 0.0)
        };
        Self {
            avg: field("avg"),
            low: field("low"),
            high: field("high"),
        }
    }
}

/// Output of one model step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceUpdate {
    pub price: f64,
    /// Clamped variation in percent.
    pub change: f64,
    pub history: History,
}

/// Round half away from zero to two decimals.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Compute the next simulated price of one asset.
///
/// No floor is applied to the result; a non-negative `current_price` cannot go
/// negative because every profile keeps `max` below 1.
pub fn next_price<S: UniformSource + ?Sized>(
    source: &mut S,
    current_price: f64,
    prior: PriorHistory,
    trend: Option<Trend>,
    profile: VolatilityProfile,
) -> PriceUpdate {
    let bias = trend.map_or(0.0, Trend::bias);
    let variation = gaussian_noise(source, profile.base) + bias;
    let clamped = variation.clamp(-profile.max, profile.max);

    let new_price = current_price * (1.0 + clamped);

    let history = History {
        avg: round2(prior.avg.unwrap_or(new_price) * AVG_DECAY + new_price * (1.0 - AVG_DECAY)),
        low: round2(prior.low.unwrap_or(new_price).min(new_price)),
        high: round2(prior.high.unwrap_or(new_price).max(new_price)),
    };

    PriceUpdate {
        price: round2(new_price),
        change: round2(clamped * 100.0),
        history,
    }
}
