//! Runs the map tasks of a job on a local thread pool.
//!
//! Every input file becomes one map task; task i writes `mrtmp.<job>-<i>-<shard>`. Tasks
//! share nothing but the (read-only) parameters, so they don't need to coordinate. A failed
//! task is reported and left alone: retrying it is up to the caller.

use std::path::Path;
use std::sync::mpsc::channel;

use scoped_threadpool::Pool;
use tracing::{info, warn};

use crate::error::Result;
use crate::map::MapPartition;
use crate::mapreducer::{Mapper, Sharder};
use crate::parameters::MRParameters;
use crate::phases::output::{remove_intermediates, FileSinkGenerator, SinkGenerator};
use crate::stats::MapTaskStats;

pub struct MRController<MR: Mapper + Sharder> {
    params: MRParameters,
    mr: MR,
}

impl<MR: Mapper + Sharder> MRController<MR> {
    pub fn new(mr: MR, params: MRParameters) -> Result<MRController<MR>> {
        params.validate()?;
        Ok(MRController { params, mr })
    }

    pub fn params(&self) -> &MRParameters {
        &self.params
    }

    /// Runs one map task per input, at most `params.mappers` at a time, writing intermediate
    /// files as configured. Results are returned in input order.
    pub fn run_map_phase<P: AsRef<Path> + Sync>(&self, inputs: &[P]) -> Vec<Result<MapTaskStats>> {
        self.run_map_phase_with(FileSinkGenerator::new(&self.params), inputs)
    }

    /// Like run_map_phase, but creates the intermediate outputs with `gen`.
    pub fn run_map_phase_with<G, P>(&self, gen: G, inputs: &[P]) -> Vec<Result<MapTaskStats>>
        where G: SinkGenerator,
              P: AsRef<Path> + Sync
    {
        let mut pool = Pool::new(u32::try_from(self.params.mappers).unwrap_or(u32::MAX));
        let (send, recv) = channel();

        pool.scoped(|scope| {
            for (map_task, input) in inputs.iter().enumerate() {
                let mr = self.mr.clone();
                let params = self.params.clone();
                let gen = gen.clone();
                let done = send.clone();
                let input = input.as_ref();

                scope.execute(move || {
                    let result = MapPartition::new(params, map_task, input, mr, gen).run();
                    let _ = done.send((map_task, result));
                });
            }
            scope.join_all();
        });
        drop(send);

        let mut results: Vec<(usize, Result<MapTaskStats>)> = recv.iter().collect();
        results.sort_by_key(|&(i, _)| i);

        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        if failed > 0 {
            warn!(job = %self.params.job_name, failed, tasks = inputs.len(), "map phase incomplete");
        } else {
            info!(job = %self.params.job_name, tasks = inputs.len(), "map phase finished");
        }
        results.into_iter().map(|(_, r)| r).collect()
    }

    /// Removes the intermediate files of the first `map_tasks` map tasks.
    pub fn clean_up(&self, map_tasks: usize) -> Result<()> {
        remove_intermediates(&self.params, map_tasks)
    }
}
