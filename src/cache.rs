//! Keyed record cache used by the provider client.
//!
//! Records are stored as CSV with a header row, one entry per key. An entry
//! that exists but holds no rows is a cached empty list, not a miss.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::RatingsError;

pub trait RecordCache {
    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Vec<T>>>;
    fn put<T: Serialize>(&self, key: &str, records: &[T]) -> Result<()>;
}

fn encode<T: Serialize>(records: &[T]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for record in records {
        wtr.serialize(record).context("serialize cache record")?;
    }
    wtr.into_inner().context("finish cache buffer")
}

fn decode<T: DeserializeOwned>(key: &str, raw: &[u8]) -> Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(raw);
    let mut out = Vec::new();
    for row in rdr.deserialize::<T>() {
        let row = row.map_err(|err| RatingsError::CorruptCache {
            key: key.to_string(),
            reason: err.to_string(),
        })?;
        out.push(row);
    }
    Ok(out)
}

/// One `{key}.csv` file per entry inside `dir`.
#[derive(Debug, Clone)]
pub struct CsvDirCache {
    dir: PathBuf,
}

impl CsvDirCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.csv"))
    }
}

impl RecordCache for CsvDirCache {
    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Vec<T>>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read(&path).with_context(|| format!("read cache {}", path.display()))?;
        let records = decode(key, &raw)?;
        debug!(key, rows = records.len(), "cache hit");
        Ok(Some(records))
    }

    fn put<T: Serialize>(&self, key: &str, records: &[T]) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create cache dir {}", self.dir.display()))?;
        let path = self.path_for(key);
        let tmp = path.with_extension("csv.tmp");
        fs::write(&tmp, encode(records)?).context("write cache entry")?;
        fs::rename(&tmp, &path).context("swap cache entry")?;
        debug!(key, rows = records.len(), "cache stored");
        Ok(())
    }
}

/// In-process cache. Not shared across threads.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RefCell<HashMap<String, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }
}

impl RecordCache for MemoryCache {
    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<Vec<T>>> {
        let entries = self.entries.borrow();
        match entries.get(key) {
            Some(raw) => Ok(Some(decode(key, raw)?)),
            None => Ok(None),
        }
    }

    fn put<T: Serialize>(&self, key: &str, records: &[T]) -> Result<()> {
        let raw = encode(records)?;
        self.entries.borrow_mut().insert(key.to_string(), raw);
        Ok(())
    }
}
