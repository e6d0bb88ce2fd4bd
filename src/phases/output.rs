//! Naming of intermediate files, and the sink generators that create them.
//!
//! The map side and the reduce side both derive file names from (job, map task, shard) with
//! `intermediate_name`; nothing else is exchanged between them.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{MapError, Result};
use crate::formats::util::{RecordSink, RecordSource};
use crate::formats::IntermediateFormat;
use crate::parameters::MRParameters;
use crate::record_types::Record;

/// Name of the intermediate file written by map task `mapper` for reduce shard `shard`.
pub fn intermediate_name(job: &str, mapper: usize, shard: usize) -> String {
    format!("mrtmp.{}-{}-{}", job, mapper, shard)
}

pub fn intermediate_path(dir: &Path, job: &str, mapper: usize, shard: usize) -> PathBuf {
    dir.join(intermediate_name(job, mapper, shard))
}

/// A type implementing SinkGenerator is used by the map phase to create its intermediate
/// outputs. Given a location, new_output() should return a new, empty sink; an existing
/// output at the same location is replaced.
///
/// SinkGenerator types are used in general to determine the format and the storage of outputs.
pub trait SinkGenerator: Send + Clone {
    type Sink: RecordSink;

    /// Return a new intermediary sink destined for reduce shard `shard` and requested by
    /// map task `mapper`.
    fn new_map_output(&self, params: &MRParameters, mapper: usize, shard: usize)
                      -> io::Result<(PathBuf, Self::Sink)> {
        let path = intermediate_path(&params.intermediate_dir, &params.job_name, mapper, shard);
        let sink = self.new_output(&path)?;
        Ok((path, sink))
    }

    /// Return a new sink for `location`.
    fn new_output(&self, location: &Path) -> io::Result<Self::Sink>;
}

/// Creates intermediate files on the local file system.
#[derive(Clone, Debug)]
pub struct FileSinkGenerator {
    format: IntermediateFormat,
    buffer: usize,
    sync: bool,
}

impl FileSinkGenerator {
    pub fn new(params: &MRParameters) -> FileSinkGenerator {
        FileSinkGenerator {
            format: params.format,
            buffer: params.write_buffer_size,
            sync: params.sync_on_finalize,
        }
    }
}

impl SinkGenerator for FileSinkGenerator {
    type Sink = Box<dyn RecordSink>;
    fn new_output(&self, location: &Path) -> io::Result<Self::Sink> {
        self.format.create_sink(location, self.buffer, self.sync)
    }
}

/// Opens the output of map task `mapper` for reduce shard `shard`.
pub fn open_intermediate(params: &MRParameters, mapper: usize, shard: usize) -> Result<RecordSource> {
    let path = intermediate_path(&params.intermediate_dir, &params.job_name, mapper, shard);
    params.format
        .open_source(&path)
        .map_err(|e| MapError::InputUnavailable { path, source: e })
}

/// Reads all records map task `mapper` wrote for reduce shard `shard`, in the order they
/// were written.
pub fn read_intermediate(params: &MRParameters, mapper: usize, shard: usize) -> Result<Vec<Record>> {
    let path = intermediate_path(&params.intermediate_dir, &params.job_name, mapper, shard);
    let mut records = Vec::new();
    for r in open_intermediate(params, mapper, shard)? {
        records.push(r.map_err(|e| MapError::InputUnavailable {
            path: path.clone(),
            source: e,
        })?);
    }
    Ok(records)
}

/// Opens the inputs of reduce shard `shard`: one per map task, in map task order.
pub fn open_reduce_inputs(params: &MRParameters, map_tasks: usize, shard: usize) -> Result<Vec<RecordSource>> {
    (0..map_tasks).map(|m| open_intermediate(params, m, shard)).collect()
}

/// Removes the intermediate files of map tasks [0; map_tasks). Missing files are ignored.
pub fn remove_intermediates(params: &MRParameters, map_tasks: usize) -> Result<()> {
    for m in 0..map_tasks {
        for shard in 0..params.reducers {
            let path = intermediate_path(&params.intermediate_dir, &params.job_name, m, shard);
            match fs::remove_file(&path) {
                Ok(()) => (),
                Err(ref e) if e.kind() == io::ErrorKind::NotFound => (),
                Err(e) => return Err(MapError::output(path, e)),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{intermediate_name, intermediate_path, read_intermediate, remove_intermediates,
                FileSinkGenerator, SinkGenerator};
    use crate::error::Stage;
    use crate::formats::util::RecordSink;
    use crate::parameters::MRParameters;
    use crate::record_types::Record;
    use std::path::Path;

    #[test]
    fn test_names() {
        assert_eq!(intermediate_name("wc", 2, 0), "mrtmp.wc-2-0");
        assert_eq!(intermediate_name("wc", 12, 3), "mrtmp.wc-12-3");
        // No collisions between (1, 23) and (12, 3).
        assert_ne!(intermediate_name("j", 1, 23), intermediate_name("j", 12, 3));
        assert_eq!(intermediate_path(Path::new("/tmp/x"), "wc", 0, 1),
                   Path::new("/tmp/x/mrtmp.wc-0-1"));
    }

    #[test]
    fn test_generate_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let params = MRParameters::new().set_job_name("t").set_intermediate_dir(dir.path());
        let gen = FileSinkGenerator::new(&params);

        let (path, mut sink) = gen.new_map_output(&params, 1, 2).unwrap();
        assert_eq!(path, dir.path().join("mrtmp.t-1-2"));
        sink.write_record(&Record::new("k", "v")).unwrap();
        sink.finish().unwrap();
        drop(sink);

        assert_eq!(read_intermediate(&params, 1, 2).unwrap(), vec![Record::new("k", "v")]);

        let e = read_intermediate(&params, 0, 2).unwrap_err();
        assert_eq!(e.stage(), Stage::Load);

        remove_intermediates(&params, 2).unwrap();
        assert!(!path.exists());
    }
}
