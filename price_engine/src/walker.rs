//! Recursive price update over an arbitrary asset document.
//!
//! A document is any JSON tree. Leaf assets are located structurally: a mapping with a
//! numeric `price`, a truthy `id`/`symbol`/`name`, and no updated descendants. Every leaf
//! is moved one step by the price model; everything else is copied through untouched,
//! except containers whose children changed, which lose stale own-price fields.
//!
//! The walk is post-order and copy-on-write: `walk` returns `None` for a subtree that
//! did not change, which is also how a parent learns it holds sub-assets.

use asset_common::{AssetType, VolatilityProfile};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};
use strum::IntoEnumIterator;

use crate::model::{PriorHistory, Trend, next_price};
use crate::noise::UniformSource;

/// Chance that a leaf's `market.trend` is re-rolled during an update.
pub const TREND_FLIP_PROBABILITY: f64 = 0.1;

/// Keys holding per-asset metadata; never walked as sub-trees.
const METADATA_KEYS: [&str; 2] = ["market", "history"];
const IDENTIFIER_KEYS: [&str; 3] = ["id", "symbol", "name"];
/// Own-price fields removed from a container whose children were updated.
const STALE_FIELDS: [&str; 4] = ["price", "change", "history", "lastUpdated"];

/// Counters collected over one walk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WalkStats {
    pub leaves_updated: usize,
    pub containers_cleaned: usize,
    pub trends_flipped: usize,
}

/// Applies one simulated price step to every leaf asset of a document.
pub struct TreeWalker<'a, S: UniformSource + ?Sized> {
    source: &'a mut S,
    profile: VolatilityProfile,
    timestamp: String,
    stats: WalkStats,
}

impl<'a, S: UniformSource + ?Sized> TreeWalker<'a, S> {
    /// Walker for documents of `asset_type`, stamping leaves with the current time.
    pub fn new(source: &'a mut S, asset_type: AssetType) -> Self {
        Self {
            source,
            profile: asset_type.profile(),
            timestamp: format_timestamp(Utc::now()),
            stats: WalkStats::default(),
        }
    }

    /// Override the `lastUpdated` stamp written to leaves.
    pub fn at(mut self, when: DateTime<Utc>) -> Self {
        self.timestamp = format_timestamp(when);
        self
    }

    pub fn stats(&self) -> WalkStats {
        self.stats
    }

    /// Return the updated copy of `document`. Scalars and asset-free trees come back equal.
    pub fn update(&mut self, document: &Value) -> Value {
        self.walk(document).unwrap_or_else(|| document.clone())
    }

    fn walk(&mut self, node: &Value) -> Option<Value> {
        match node {
            Value::Array(items) => self.walk_sequence(items),
            Value::Object(map) => self.walk_mapping(map),
            _ => None,
        }
    }

    fn walk_sequence(&mut self, items: &[Value]) -> Option<Value> {
        let mut out: Option<Vec<Value>> = None;
        for (i, item) in items.iter().enumerate() {
            if let Some(updated) = self.walk(item) {
                out.get_or_insert_with(|| items.to_vec())[i] = updated;
            }
        }
        out.map(Value::Array)
    }

    fn walk_mapping(&mut self, map: &Map<String, Value>) -> Option<Value> {
        let mut out: Option<Map<String, Value>> = None;
        for (key, value) in map {
            if METADATA_KEYS.contains(&key.as_str()) || !(value.is_object() || value.is_array()) {
                continue;
            }
            if let Some(updated) = self.walk(value) {
                out.get_or_insert_with(|| map.clone()).insert(key.clone(), updated);
            }
        }

        let Some(mut out) = out else {
            return is_leaf(map).then(|| self.update_leaf(map));
        };

        let stale_price = out.get("price").is_some_and(Value::is_number);
        if stale_price && !truthy(out.get("id")) && !truthy(out.get("symbol")) {
            for field in STALE_FIELDS {
                out.shift_remove(field);
            }
            self.stats.containers_cleaned += 1;
        }
        Some(Value::Object(out))
    }

    fn update_leaf(&mut self, leaf: &Map<String, Value>) -> Value {
        let mut out = leaf.clone();

        // The re-rolled trend only biases the next cycle.
        let trend = Trend::of_asset(leaf);
        if self.source.next_uniform() < TREND_FLIP_PROBABILITY {
            let count = Trend::iter().len();
            let pick = (self.source.next_uniform() * count as f64) as usize;
            let flipped = Trend::iter().nth(pick.min(count - 1)).unwrap_or(Trend::Sideways);
            set_trend(&mut out, flipped);
            self.stats.trends_flipped += 1;
        }

        let current_price = leaf.get("price").and_then(Value::as_f64).unwrap_or(0.0);
        let prior = PriorHistory::from_json(leaf.get("history"));
        let update = next_price(&mut *self.source, current_price, prior, trend, self.profile);

        out.insert("price".into(), json!(update.price));
        out.insert("change".into(), json!(update.change));
        out.insert("history".into(), update.history.to_json());
        out.insert("lastUpdated".into(), Value::String(self.timestamp.clone()));
        self.stats.leaves_updated += 1;
        Value::Object(out)
    }
}

fn set_trend(asset: &mut Map<String, Value>, trend: Trend) {
    let market = asset.entry("market").or_insert(Value::Null);
    if market.is_null() {
        *market = Value::Object(Map::new());
    }
    // A non-object `market` is left as found.
    if let Value::Object(market) = market {
        market.insert("trend".into(), Value::String(trend.to_string()));
    }
}

/// Leaf test on the original node: numeric `price` plus at least one identifier.
fn is_leaf(map: &Map<String, Value>) -> bool {
    map.get("price").is_some_and(Value::is_number)
        && IDENTIFIER_KEYS.iter().any(|k| truthy(map.get(*k)))
}

/// Presence test for identifier fields: null, `false`, `""` and `0` do not count.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

fn format_timestamp(when: DateTime<Utc>) -> String {
    when.to_rfc3339_opts(SecondsFormat::Millis, true)
}
