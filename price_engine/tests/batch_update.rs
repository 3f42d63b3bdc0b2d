use std::fs;

use asset_common::report::{SUCCESS_MESSAGE, UpdateStatus};
use asset_common::store::{JsonFileStore, MemoryStore};
use asset_common::{AssetError, AssetId, DocumentStore, Result, StoredAsset};
use price_engine::{BatchUpdater, SeededSource, SequenceSource};
use serde_json::{Value, json};

/// No trend flip, then the largest positive draw: every leaf moves by its profile max.
fn max_up() -> SequenceSource {
    SequenceSource::new(vec![0.5, 0.0, 0.0])
}

fn records(value: Value) -> Vec<StoredAsset> {
    serde_json::from_value(value).unwrap()
}

/// Store that refuses writes for one id.
struct FlakyStore {
    inner: MemoryStore,
    broken: AssetId,
}

impl DocumentStore for FlakyStore {
    fn list_all(&self) -> Result<Vec<StoredAsset>> {
        self.inner.list_all()
    }

    fn update(&mut self, id: &AssetId, data: Value) -> Result<()> {
        if *id == self.broken {
            return Err(AssetError::Store("row is locked".into()));
        }
        self.inner.update(id, data)
    }
}

struct DownStore;

impl DocumentStore for DownStore {
    fn list_all(&self) -> Result<Vec<StoredAsset>> {
        Err(AssetError::Store("connection refused".into()))
    }

    fn update(&mut self, _id: &AssetId, _data: Value) -> Result<()> {
        unreachable!()
    }
}

#[test]
fn each_collection_uses_its_profile() {
    let store = MemoryStore::new(records(json!([
        { "id": 1, "name": "cryptoPrices", "data": [{ "id": "btc", "price": 100 }] },
        { "id": 2, "name": "forexPrices", "data": [{ "symbol": "EURUSD", "price": 100 }] },
        { "id": 3, "name": "commodityPrices", "data": { "gold": { "name": "Gold", "price": 100 } } },
        { "id": 4, "name": "myFunds", "data": { "type": "trade", "items": [{ "id": "f", "price": 100 }] } },
        { "id": 5, "name": "misc", "data": { "id": "x", "price": 100 } }
    ])));
    let mut updater = BatchUpdater::new(store, max_up());
    let report = updater.run().unwrap();
    assert_eq!(report.total, 5);
    assert_eq!(report.failures(), 0);

    let stored = updater.into_store();
    let docs: Vec<&Value> = stored.records().iter().map(|r| &r.data).collect();
    assert_eq!(docs[0][0]["change"], json!(15.0));
    assert_eq!(docs[1][0]["change"], json!(3.0));
    assert_eq!(docs[2]["gold"]["change"], json!(10.0));
    assert_eq!(docs[3]["items"][0]["change"], json!(12.0));
    assert_eq!(docs[3]["items"][0]["price"], json!(112.0));
    assert_eq!(docs[4]["change"], json!(15.0));
}

#[test]
fn one_failed_write_does_not_stop_the_batch() {
    let inner = MemoryStore::new(records(json!([
        { "id": "a", "name": "cryptoPrices", "data": [{ "id": "btc", "price": 10 }] },
        { "id": "b", "name": "forexPrices", "data": [{ "id": "eur", "price": 1 }] },
        { "id": "c", "name": "tradePrices", "data": [{ "id": "spy", "price": 500 }] }
    ])));
    let store = FlakyStore {
        inner,
        broken: AssetId::Text("b".into()),
    };
    let mut updater = BatchUpdater::new(store, SeededSource::new(5));
    let report = updater.run().unwrap();

    let statuses: Vec<UpdateStatus> = report.updates.iter().map(|u| u.status).collect();
    assert_eq!(statuses, [UpdateStatus::Success, UpdateStatus::Error, UpdateStatus::Success]);
    assert_eq!(report.updates[1].message, "row is locked");
    assert_eq!(report.updates[1].name, "forexPrices");
    assert_eq!(report.updates[0].message, SUCCESS_MESSAGE);

    let stored = updater.into_store().inner;
    assert!(stored.records()[0].data[0]["lastUpdated"].is_string());
    assert!(stored.records()[1].data[0].get("lastUpdated").is_none());
    assert!(stored.records()[2].data[0]["lastUpdated"].is_string());
}

#[test]
fn listing_failure_aborts_the_run() {
    let mut updater = BatchUpdater::new(DownStore, SeededSource::new(1));
    let err = updater.run().unwrap_err();
    assert_eq!(err.to_string(), "connection refused");
}

#[test]
fn asset_free_documents_are_written_back_unchanged() {
    let store = MemoryStore::new(records(json!([
        { "id": 9, "name": "notes", "data": { "title": "hello", "tags": ["a", "b"] } }
    ])));
    let mut updater = BatchUpdater::new(store, SeededSource::new(2));
    let report = updater.run().unwrap();
    assert_eq!(report.updates[0].status, UpdateStatus::Success);
    assert_eq!(updater.store().records()[0].data, json!({ "title": "hello", "tags": ["a", "b"] }));
}

#[test]
fn file_store_round_trip_through_two_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("assets.json");
    let seed = json!([
        { "id": 1, "name": "mineralPrices", "created_at": "2025-01-01T00:00:00Z",
          "data": { "price": 5, "metals": [
              { "id": "silver", "price": 25, "market": { "trend": "bullish" } },
              { "id": "gold", "price": 2000, "history": { "avg": 1900, "low": 1800, "high": 2100 } }
          ] } }
    ]);
    fs::write(&path, serde_json::to_vec(&seed).unwrap()).unwrap();

    let store = JsonFileStore::open(&path).unwrap();
    let mut updater = BatchUpdater::new(store, SeededSource::new(77));
    updater.run().unwrap();
    let first = JsonFileStore::open(&path).unwrap().list_all().unwrap();
    updater.run().unwrap();
    let second = JsonFileStore::open(&path).unwrap().list_all().unwrap();

    for run in [&first, &second] {
        let data = &run[0].data;
        assert!(data.get("price").is_none());
        for metal in data["metals"].as_array().unwrap() {
            let change = metal["change"].as_f64().unwrap();
            assert!(change.abs() <= 10.0);
            let h = &metal["history"];
            assert!(h["low"].as_f64().unwrap() <= h["high"].as_f64().unwrap());
        }
    }
    let gold = &second[0].data["metals"][1]["history"];
    assert!(gold["low"].as_f64().unwrap() <= 1800.0);
    assert!(gold["high"].as_f64().unwrap() >= 2100.0);
    assert_eq!(second[0].created_at.as_deref(), Some("2025-01-01T00:00:00Z"));
}
