//! Document store collaborator.
//!
//! Stored records are `{id, name, data}` triples where `data` is an opaque JSON tree.
//! The updater only needs two operations from a store: read every record, and replace
//! the `data` of one record by identifier. Two implementations are provided:
//!
//! - `JsonFileStore` — a JSON array of records kept in a single file. Every update
//!   rewrites the file through a sibling temp file and a rename, so readers never see
//!   a half-written array.
//! - `MemoryStore` — a plain in-memory vector, handy for tests and dry runs.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AssetError;
use crate::result::Result;

/// Identifier of a stored record. Accepts both numeric and textual ids.
#[derive(Debug, Clone, Serialize, Deserialize, Hash, Eq, PartialEq)]
#[serde(untagged)]
pub enum AssetId {
    /// Numeric key, as assigned by most SQL stores.
    Number(u64),
    /// Textual key such as a UUID.
    Text(String),
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetId::Number(n) => write!(f, "{}", n),
            AssetId::Text(s) => f.write_str(s),
        }
    }
}

/// One stored asset document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredAsset {
    /// Store-assigned identifier.
    pub id: AssetId,
    /// Collection name, e.g. `cryptoPrices`; drives type classification.
    pub name: String,
    /// The asset tree itself.
    #[serde(default)]
    pub data: Value,
    /// Creation time as an RFC 3339 string, when the store tracks it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Read-all / update-by-id access to stored asset documents.
pub trait DocumentStore {
    /// Return a snapshot of every stored record.
    fn list_all(&self) -> Result<Vec<StoredAsset>>;

    /// Replace the `data` of the record identified by `id`.
    fn update(&mut self, id: &AssetId, data: Value) -> Result<()>;

    /// Look up a single record by collection name.
    fn find_by_name(&self, name: &str) -> Result<StoredAsset> {
        self.list_all()?
            .into_iter()
            .find(|asset| asset.name == name)
            .ok_or_else(|| AssetError::NotFound(format!("asset '{}'", name)))
    }
}

fn replace_data(records: &mut [StoredAsset], id: &AssetId, data: Value) -> Result<()> {
    let record = records
        .iter_mut()
        .find(|r| &r.id == id)
        .ok_or_else(|| AssetError::Store(format!("no asset with id {}", id)))?;
    record.data = data;
    Ok(())
}

/// Store backed by a JSON file holding an array of `StoredAsset` records.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Open a store at `path`. The file must already exist and hold a JSON array.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(AssetError::Store(format!(
                "store file {} does not exist",
                path.display()
            )));
        }
        Ok(Self { path })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_all(&self, records: &[StoredAsset]) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(records)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Store file {} rewritten ({} records)", self.path.display(), records.len());
        Ok(())
    }
}

impl DocumentStore for JsonFileStore {
    fn list_all(&self) -> Result<Vec<StoredAsset>> {
        let bytes = fs::read(&self.path)?;
        let records = serde_json::from_slice(&bytes)?;
        Ok(records)
    }

    fn update(&mut self, id: &AssetId, data: Value) -> Result<()> {
        let mut records = self.list_all()?;
        replace_data(&mut records, id, data)?;
        self.write_all(&records)
    }
}

/// Store that keeps every record in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<StoredAsset>,
}

impl MemoryStore {
    /// Store holding `records` in the given order.
    pub fn new(records: Vec<StoredAsset>) -> Self {
        Self { records }
    }

    /// Current contents.
    pub fn records(&self) -> &[StoredAsset] {
        &self.records
    }
}

impl DocumentStore for MemoryStore {
    fn list_all(&self) -> Result<Vec<StoredAsset>> {
        Ok(self.records.clone())
    }

    fn update(&mut self, id: &AssetId, data: Value) -> Result<()> {
        replace_data(&mut self.records, id, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Vec<StoredAsset> {
        serde_json::from_value(json!([
            { "id": 1, "name": "cryptoPrices", "data": [{ "id": "btc", "price": 100 }] },
            { "id": "f-7", "name": "forexPrices", "data": { "price": 1.1, "symbol": "EURUSD" },
              "created_at": "2025-01-02T00:00:00Z" }
        ]))
        .unwrap()
    }

    #[test]
    fn ids_accept_numbers_and_strings() {
        let records = sample();
        assert_eq!(records[0].id, AssetId::Number(1));
        assert_eq!(records[1].id, AssetId::Text("f-7".into()));
        assert_eq!(records[1].id.to_string(), "f-7");
        assert_eq!(records[0].created_at, None);
    }

    #[test]
    fn memory_store_updates_by_id() {
        let mut store = MemoryStore::new(sample());
        store.update(&AssetId::Number(1), json!({ "replaced": true })).unwrap();
        assert_eq!(store.records()[0].data, json!({ "replaced": true }));
        assert_eq!(store.records()[1].data["symbol"], "EURUSD");
    }

    #[test]
    fn update_of_unknown_id_is_a_store_error() {
        let mut store = MemoryStore::new(sample());
        let err = store.update(&AssetId::Number(99), json!(null)).unwrap_err();
        assert!(matches!(err, AssetError::Store(_)));
    }

    #[test]
    fn find_by_name_reports_missing_records() {
        let store = MemoryStore::new(sample());
        assert_eq!(store.find_by_name("forexPrices").unwrap().id, AssetId::Text("f-7".into()));
        assert!(matches!(store.find_by_name("nope"), Err(AssetError::NotFound(_))));
    }

    #[test]
    fn json_file_store_persists_updates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets.json");
        fs::write(&path, serde_json::to_vec(&sample()).unwrap()).unwrap();

        let mut store = JsonFileStore::open(&path).unwrap();
        store.update(&AssetId::Text("f-7".into()), json!({ "price": 2 })).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        let records = reopened.list_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].data, json!({ "price": 2 }));
        assert_eq!(records[1].created_at.as_deref(), Some("2025-01-02T00:00:00Z"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn json_file_store_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(JsonFileStore::open(dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn malformed_store_file_surfaces_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assets.json");
        fs::write(&path, b"{ not json").unwrap();
        let store = JsonFileStore::open(&path).unwrap();
        assert!(matches!(store.list_all(), Err(AssetError::SerdeJson(_))));
    }
}
