//! Implements the Map phase.
//!
//! A map task reads one input partition as a whole, runs the map function over it and
//! splits the emitted records into `reducers` intermediate outputs by the hash of their key.
//! Running a task again with the same job name and map task index rewrites the same outputs
//! from scratch, so a failed task can simply be re-run.

use std::fs;
use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use tracing::{debug, info, info_span, warn};

use crate::error::{MapError, Result};
use crate::mapreducer::{Mapper, Sharder};
use crate::parameters::MRParameters;
use crate::phases::output::{FileSinkGenerator, SinkGenerator};
use crate::record_types::{MEmitter, Record};
use crate::shard_writer::ShardWriters;
use crate::stats::{MapTaskStats, ShardStats};

/// Reads an entire input partition into memory. Bytes that are not valid UTF-8 are
/// replaced by U+FFFD instead of failing the task.
pub fn load_input(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| {
        MapError::InputUnavailable {
            path: path.to_path_buf(),
            source: e,
        }
    })?;
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            debug!(path = %path.display(), "input is not valid UTF-8");
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}

/// Runs the map function over one partition and returns the emitted records in order.
pub fn invoke_transform<M: Mapper>(mr: &mut M, partition: &str, content: &str) -> Result<Vec<Record>> {
    let mut e = MEmitter::new();
    mr.map(&mut e, partition, content).map_err(|source| {
        MapError::TransformFailure {
            partition: partition.to_string(),
            source,
        }
    })?;
    Ok(e.into_records())
}

/// This is the base of the mapping phase: one input partition, the map function, and the
/// generator for the intermediate outputs.
/// Every map task has one MapPartition instance.
pub struct MapPartition<MR: Mapper + Sharder, SinkGen: SinkGenerator> {
    mr: MR,
    params: MRParameters,
    map_task: usize,
    input: PathBuf,
    sink: SinkGen,
}

impl<MR: Mapper + Sharder, SinkGen: SinkGenerator> MapPartition<MR, SinkGen> {
    pub fn new<P: Into<PathBuf>>(params: MRParameters,
                                 map_task: usize,
                                 input: P,
                                 mr: MR,
                                 output: SinkGen)
                                 -> MapPartition<MR, SinkGen> {
        MapPartition {
            mr,
            params,
            map_task,
            input: input.into(),
            sink: output,
        }
    }

    /// Runs the map task: load, map, partition. On error nothing about the outputs can be
    /// relied upon; they are left for the next attempt to overwrite.
    pub fn run(mut self) -> Result<MapTaskStats> {
        let span = info_span!("map_task", job = %self.params.job_name, map_task = self.map_task);
        let _enter = span.enter();

        match self.run_stages() {
            Ok(stats) => {
                info!(records = stats.records_in,
                      empty_shards = stats.empty_shards().len(),
                      elapsed = %stats.elapsed,
                      "map task finished");
                Ok(stats)
            }
            Err(e) => {
                warn!(stage = %e.stage(), error = %e, "map task failed");
                Err(e)
            }
        }
    }

    fn run_stages(&mut self) -> Result<MapTaskStats> {
        self.params.validate()?;
        let started = OffsetDateTime::now_utc();

        let content = load_input(&self.input)?;
        let partition = self.input.to_string_lossy().into_owned();
        debug!(partition = %partition, bytes = content.len(), "loaded input");

        let records = invoke_transform(&mut self.mr, &partition, &content)?;
        drop(content);
        debug!(records = records.len(), "map function done");

        let shards = self.write_output(&records)?;

        Ok(MapTaskStats {
            map_task: self.map_task,
            started,
            elapsed: OffsetDateTime::now_utc() - started,
            records_in: records.len() as u64,
            shards,
        })
    }

    fn write_output(&self, records: &[Record]) -> Result<Vec<ShardStats>> {
        let reducers = self.params.reducers;
        let mut outputs = ShardWriters::create(&self.sink, &self.params, self.map_task)?;

        for r in records {
            let shard = self.mr.shard(reducers, &r.key);
            if shard >= reducers {
                return Err(MapError::InvalidShard {
                    key: r.key.clone(),
                    shard,
                    reducers,
                });
            }
            outputs.write(shard, r)?;
        }

        outputs.finalize()
    }
}

/// Runs map task `map_task` of job `job_name` on `partition`, writing `reducers`
/// intermediate files to the current directory in the default format.
pub fn run_map_task<M, P>(job_name: &str, map_task: usize, partition: P, reducers: usize, mr: M)
                          -> Result<MapTaskStats>
    where M: Mapper + Sharder,
          P: AsRef<Path>
{
    let params = MRParameters::new().set_job_name(job_name).set_concurrency(1, reducers);
    run_map_task_with(&params, map_task, partition, mr)
}

/// Like run_map_task, with all parameters supplied by the caller.
pub fn run_map_task_with<M, P>(params: &MRParameters, map_task: usize, partition: P, mr: M)
                               -> Result<MapTaskStats>
    where M: Mapper + Sharder,
          P: AsRef<Path>
{
    let gen = FileSinkGenerator::new(params);
    MapPartition::new(params.clone(), map_task, partition.as_ref(), mr, gen).run()
}
