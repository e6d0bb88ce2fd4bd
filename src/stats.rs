//! Counters reported by a finished map task.

use time::{Duration, OffsetDateTime};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShardStats {
    pub shard: usize,
    pub records: u64,
    pub bytes: u64,
}

#[derive(Clone, Debug)]
pub struct MapTaskStats {
    pub map_task: usize,
    pub started: OffsetDateTime,
    pub elapsed: Duration,
    /// Records emitted by the map function.
    pub records_in: u64,
    /// One entry per reduce shard, in shard order.
    pub shards: Vec<ShardStats>,
}

impl MapTaskStats {
    pub fn total_records(&self) -> u64 {
        self.shards.iter().map(|s| s.records).sum()
    }

    pub fn total_bytes(&self) -> u64 {
        self.shards.iter().map(|s| s.bytes).sum()
    }

    /// Shards that didn't get a single record. Their outputs exist nonetheless.
    pub fn empty_shards(&self) -> Vec<usize> {
        self.shards.iter().filter(|s| s.records == 0).map(|s| s.shard).collect()
    }
}
