use crate::transaction::TransactionId;
use serde_json::{Map, Value};

/// The kernel's opaque payload type. The kernel never interprets field
/// names or types inside a `Record`; it only stores, copies, and
/// shallow-merges them.
pub type Record = Map<String, Value>;

/// A single version of a row, stamped with the transaction that created it
/// and, once superseded, the transaction that deleted it.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedRow {
    pub key: String,
    pub data: Record,
    pub xmin: TransactionId,
    pub xmax: Option<TransactionId>,
}

impl VersionedRow {
    /// A fresh, undeleted version.
    pub fn inserted(key: impl Into<String>, data: Record, xmin: TransactionId) -> Self {
        Self {
            key: key.into(),
            data,
            xmin,
            xmax: None,
        }
    }

    /// A tombstone copy of `self`, stamped with the deleting transaction.
    pub fn tombstoned(&self, xmax: TransactionId) -> Self {
        Self {
            key: self.key.clone(),
            data: self.data.clone(),
            xmin: self.xmin,
            xmax: Some(xmax),
        }
    }

    /// Flatten this version into a selectable record: `{ "key": key, ...data }`.
    pub fn to_selected_record(&self) -> Record {
        let mut out = Record::new();
        out.insert("key".to_string(), Value::String(self.key.clone()));
        for (k, v) in &self.data {
            out.insert(k.clone(), v.clone());
        }
        out
    }
}

/// Shallow, right-biased field overlay: keys present in `patch` overwrite or
/// add to keys in `base`; keys only in `base` are kept as-is. Nested
/// objects/arrays are replaced wholesale, never deep-merged.
pub fn merge_records(base: &Record, patch: &Record) -> Record {
    let mut merged = base.clone();
    for (k, v) in patch {
        merged.insert(k.clone(), v.clone());
    }
    merged
}
