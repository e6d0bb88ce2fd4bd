//! Record types passed between the map function and the intermediate outputs.

use serde::{Deserialize, Serialize};

/// A (key,value) pair.
///
/// Ordering compares the key first, then the value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Record {
    pub key: String,
    pub value: String,
}

impl Record {
    pub fn new<K: Into<String>, V: Into<String>>(key: K, value: V) -> Record {
        Record {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> From<(K, V)> for Record {
    fn from((k, v): (K, V)) -> Record {
        Record::new(k, v)
    }
}

/// Emitter type used in the mapper phase; used to emit (key,value) pairs.
/// Records come back out in the order they were emitted.
#[derive(Debug, Default)]
pub struct MEmitter {
    r: Vec<Record>,
}

impl MEmitter {
    pub fn new() -> MEmitter {
        MEmitter { r: Vec::new() }
    }

    pub fn emit<K: Into<String>, V: Into<String>>(&mut self, key: K, val: V) {
        self.r.push(Record::new(key, val))
    }

    pub fn len(&self) -> usize {
        self.r.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.r
    }
}

impl Extend<Record> for MEmitter {
    fn extend<I: IntoIterator<Item = Record>>(&mut self, iter: I) {
        self.r.extend(iter)
    }
}
