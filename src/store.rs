use std::collections::BTreeSet;
use std::fmt;

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::kv::{KeyValueStore, KvError};
use crate::record::TimerRecord;

/// Key holding the JSON array of all runs
pub const TIMERS_KEY: &str = "timers";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to encode records: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to read `{key}`: {source}")]
    Read {
        key: String,
        #[source]
        source: KvError,
    },

    #[error("stored `{key}` is not a record list, refusing to overwrite it")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write `{key}`: {source}")]
    Write {
        key: String,
        #[source]
        source: KvError,
    },
}

/// Position of a record in storage order (oldest first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordIndex(pub usize);

impl RecordIndex {
    /// Map a newest-first display position onto storage order
    pub fn from_newest_first(position: usize, len: usize) -> Option<Self> {
        if position < len {
            Some(RecordIndex(len - 1 - position))
        } else {
            None
        }
    }

    pub fn to_newest_first(self, len: usize) -> Option<usize> {
        if self.0 < len {
            Some(len - 1 - self.0)
        } else {
            None
        }
    }
}

/// A record as a list shows it: newest first, numbered from 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryEntry<'a> {
    pub position: usize,
    pub index: RecordIndex,
    pub record: &'a TimerRecord,
}

/// Newest-first view over a storage-ordered slice
pub fn newest_first(records: &[TimerRecord]) -> Vec<HistoryEntry<'_>> {
    records
        .iter()
        .enumerate()
        .rev()
        .enumerate()
        .map(|(pos, (idx, record))| HistoryEntry {
            position: pos + 1,
            index: RecordIndex(idx),
            record,
        })
        .collect()
}

/// One element of the stored array
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum Slot {
    Record(TimerRecord),
    /// An element that does not read as a record; written back unchanged
    Opaque(Value),
}

fn records_of(slots: Vec<Slot>) -> Vec<TimerRecord> {
    slots
        .into_iter()
        .filter_map(|slot| match slot {
            Slot::Record(record) => Some(record),
            Slot::Opaque(_) => None,
        })
        .collect()
}

/// Owns the persisted run list under a single key.
///
/// Every write serializes the full collection and stores it in one `set`.
/// `load` never fails: a missing or unreadable value is an empty history.
/// Writes that start from the stored value (`append`, `delete`) refuse to
/// run when that value cannot be read, so a bad file is never clobbered.
/// Elements that are not valid records are skipped on load and kept on write.
pub struct RecordStore {
    kv: Box<dyn KeyValueStore>,
    key: String,
}

impl fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore").field("key", &self.key).finish()
    }
}

impl RecordStore {
    pub fn new(kv: Box<dyn KeyValueStore>) -> Self {
        Self::with_key(kv, TIMERS_KEY)
    }

    pub fn with_key(kv: Box<dyn KeyValueStore>, key: &str) -> Self {
        Self {
            kv,
            key: key.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// All records, oldest first
    pub fn load(&self) -> Vec<TimerRecord> {
        match self.read_slots() {
            Ok(slots) => records_of(slots),
            Err(e) => {
                warn!("treating `{}` as empty: {}", self.key, e);
                Vec::new()
            }
        }
    }

    fn read_slots(&self) -> Result<Vec<Slot>, StoreError> {
        let raw = match self.kv.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Read {
                    key: self.key.clone(),
                    source,
                })
            }
        };

        let values: Vec<Value> =
            serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                key: self.key.clone(),
                source,
            })?;

        let slots = values
            .into_iter()
            .enumerate()
            .map(|(pos, value)| match TimerRecord::deserialize(&value) {
                Ok(record) => Slot::Record(record),
                Err(e) => {
                    warn!("skipping element {pos} of `{}`: {e}", self.key);
                    Slot::Opaque(value)
                }
            })
            .collect();
        Ok(slots)
    }

    fn write<T: Serialize>(&mut self, items: &[T]) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(items)?;
        self.kv.set(&self.key, &encoded).map_err(|source| {
            error!("failed to persist {} entries: {}", items.len(), source);
            StoreError::Write {
                key: self.key.clone(),
                source,
            }
        })?;
        debug!("persisted {} entries under `{}`", items.len(), self.key);
        Ok(())
    }

    pub fn append(&mut self, record: TimerRecord) -> Result<(), StoreError> {
        let mut slots = self.read_slots()?;
        slots.push(Slot::Record(record));
        self.write(&slots)
    }

    /// Overwrite the stored collection with `records`, in the given order
    pub fn replace(&mut self, records: &[TimerRecord]) -> Result<(), StoreError> {
        self.write(records)
    }

    /// Remove the records at the given storage positions and persist the rest,
    /// keeping their order. Indices past the end are ignored.
    pub fn delete(
        &mut self,
        indices: &BTreeSet<RecordIndex>,
    ) -> Result<Vec<TimerRecord>, StoreError> {
        let mut next = 0;
        let kept: Vec<Slot> = self
            .read_slots()?
            .into_iter()
            .filter(|slot| match slot {
                Slot::Record(_) => {
                    let index = RecordIndex(next);
                    next += 1;
                    !indices.contains(&index)
                }
                Slot::Opaque(_) => true,
            })
            .collect();

        self.write(&kept)?;
        Ok(records_of(kept))
    }

    /// Delete by newest-first positions, as a list view numbers them
    pub fn delete_displayed(
        &mut self,
        positions: &[usize],
    ) -> Result<Vec<TimerRecord>, StoreError> {
        let len = records_of(self.read_slots()?).len();
        let indices = positions
            .iter()
            .filter_map(|pos| RecordIndex::from_newest_first(*pos, len))
            .collect::<BTreeSet<_>>();
        self.delete(&indices)
    }
}
