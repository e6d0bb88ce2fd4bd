//! In-memory sinks for tests. Can be told to fail creating or writing outputs, and keeps
//! count of how many sinks are currently open.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::formats::util::{RecordSink, SinkStats};
use crate::phases::output::SinkGenerator;
use crate::record_types::Record;

#[derive(Clone, Default)]
pub struct FakeSinkGenerator {
    pub outputs: Arc<Mutex<BTreeMap<PathBuf, Vec<Record>>>>,
    pub open: Arc<AtomicUsize>,
    pub finished: Arc<AtomicUsize>,
    created: Arc<AtomicUsize>,
    written: Arc<AtomicUsize>,
    fail_create_at: Option<usize>,
    fail_write_after: Option<usize>,
}

impl FakeSinkGenerator {
    pub fn new() -> FakeSinkGenerator {
        FakeSinkGenerator::default()
    }

    /// The n-th (0-based) output creation fails.
    pub fn fail_create_at(mut self, n: usize) -> FakeSinkGenerator {
        self.fail_create_at = Some(n);
        self
    }

    /// Every write after the first n records fails.
    pub fn fail_write_after(mut self, n: usize) -> FakeSinkGenerator {
        self.fail_write_after = Some(n);
        self
    }

    pub fn output(&self, p: &Path) -> Option<Vec<Record>> {
        self.outputs.lock().unwrap().get(p).cloned()
    }
}

pub struct FakeSink {
    path: PathBuf,
    gen: FakeSinkGenerator,
    stats: SinkStats,
}

impl SinkGenerator for FakeSinkGenerator {
    type Sink = FakeSink;
    fn new_output(&self, location: &Path) -> io::Result<FakeSink> {
        let n = self.created.fetch_add(1, Ordering::SeqCst);
        if self.fail_create_at == Some(n) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"));
        }
        self.outputs.lock().unwrap().insert(location.to_path_buf(), Vec::new());
        self.open.fetch_add(1, Ordering::SeqCst);
        Ok(FakeSink {
            path: location.to_path_buf(),
            gen: self.clone(),
            stats: SinkStats::default(),
        })
    }
}

impl RecordSink for FakeSink {
    fn write_record(&mut self, record: &Record) -> io::Result<()> {
        let n = self.gen.written.fetch_add(1, Ordering::SeqCst);
        if let Some(limit) = self.gen.fail_write_after {
            if n >= limit {
                return Err(io::Error::new(io::ErrorKind::Other, "no space left on device"));
            }
        }
        if let Some(v) = self.gen.outputs.lock().unwrap().get_mut(&self.path) {
            v.push(record.clone());
        }
        self.stats.records += 1;
        self.stats.bytes += (record.key.len() + record.value.len()) as u64;
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.gen.finished.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stats(&self) -> SinkStats {
        self.stats
    }
}

impl Drop for FakeSink {
    fn drop(&mut self) {
        self.gen.open.fetch_sub(1, Ordering::SeqCst);
    }
}
