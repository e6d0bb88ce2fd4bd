//! Owner of the R intermediate outputs of one map task.
//!
//! All outputs are created (truncating whatever a previous attempt left behind) before the
//! first record is written. They are released when the ShardWriters is dropped, whichever
//! way the map task ends; only `finalize` flushes them and reports errors doing so.

use std::path::PathBuf;

use tracing::debug;

use crate::error::{MapError, Result};
use crate::formats::util::RecordSink;
use crate::parameters::MRParameters;
use crate::phases::output::{intermediate_path, SinkGenerator};
use crate::record_types::Record;
use crate::stats::ShardStats;

struct ShardOutput<S> {
    path: PathBuf,
    sink: S,
}

pub struct ShardWriters<S: RecordSink> {
    outputs: Vec<ShardOutput<S>>,
    finalized: bool,
}

impl<S: RecordSink> ShardWriters<S> {
    /// Creates the outputs for shards [0; params.reducers) of map task `map_task`.
    /// If one of them can't be created, the ones created so far are released again.
    pub fn create<G>(gen: &G, params: &MRParameters, map_task: usize) -> Result<ShardWriters<S>>
        where G: SinkGenerator<Sink = S>
    {
        let mut outputs = Vec::with_capacity(params.reducers);
        for shard in 0..params.reducers {
            match gen.new_map_output(params, map_task, shard) {
                Ok((path, sink)) => outputs.push(ShardOutput { path, sink }),
                Err(e) => {
                    let path = intermediate_path(&params.intermediate_dir, &params.job_name, map_task, shard);
                    return Err(MapError::output(path, e));
                }
            }
        }
        Ok(ShardWriters {
            outputs,
            finalized: false,
        })
    }

    pub fn shards(&self) -> usize {
        self.outputs.len()
    }

    pub fn path(&self, shard: usize) -> Option<&PathBuf> {
        self.outputs.get(shard).map(|o| &o.path)
    }

    /// Appends `record` to the output of `shard`.
    pub fn write(&mut self, shard: usize, record: &Record) -> Result<()> {
        let reducers = self.outputs.len();
        let out = self.outputs.get_mut(shard).ok_or_else(|| {
            MapError::InvalidShard {
                key: record.key.clone(),
                shard,
                reducers,
            }
        })?;
        out.sink.write_record(record).map_err(|e| MapError::output(out.path.clone(), e))
    }

    /// Flushes every output, including empty ones. All outputs are finalized even if one
    /// of them fails; the first failure is returned.
    pub fn finalize(mut self) -> Result<Vec<ShardStats>> {
        let mut first_err = None;
        let mut stats = Vec::with_capacity(self.outputs.len());

        for (shard, out) in self.outputs.iter_mut().enumerate() {
            if let Err(e) = out.sink.finish() {
                debug!(path = %out.path.display(), error = %e, "finalizing shard output failed");
                if first_err.is_none() {
                    first_err = Some(MapError::output(out.path.clone(), e));
                }
                continue;
            }
            let s = out.sink.stats();
            stats.push(ShardStats {
                shard,
                records: s.records,
                bytes: s.bytes,
            });
        }
        self.finalized = true;

        match first_err {
            Some(e) => Err(e),
            None => Ok(stats),
        }
    }
}

impl<S: RecordSink> Drop for ShardWriters<S> {
    fn drop(&mut self) {
        if !self.finalized && !self.outputs.is_empty() {
            debug!(outputs = self.outputs.len(), "releasing unfinalized shard outputs");
        }
    }
}
