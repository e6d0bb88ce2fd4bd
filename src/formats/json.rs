//! JSON-lines intermediate files: one `{"key":..,"value":..}` object per line.
//!
//! serde_json escapes control characters inside strings, so a raw newline only ever appears
//! between two records.

use std::fs;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use crate::formats::util::{RecordSink, RecordSource, SinkStats};
use crate::record_types::Record;

pub struct JsonSink<W: Write + Send> {
    w: W,
    stats: SinkStats,
}

impl<W: Write + Send> JsonSink<W> {
    pub fn new(w: W) -> JsonSink<W> {
        JsonSink {
            w,
            stats: SinkStats::default(),
        }
    }

    pub fn into_inner(self) -> W {
        self.w
    }
}

impl JsonSink<BufWriter<fs::File>> {
    /// Creates or truncates `path`.
    pub fn new_to_file<P: AsRef<Path>>(path: P, buffer: usize) -> io::Result<JsonSink<BufWriter<fs::File>>> {
        let f = fs::OpenOptions::new().write(true).create(true).truncate(true).open(path)?;
        Ok(JsonSink::new(BufWriter::with_capacity(buffer, f)))
    }
}

impl<W: Write + Send> RecordSink for JsonSink<W> {
    fn write_record(&mut self, record: &Record) -> io::Result<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        self.w.write_all(&line)?;
        self.stats.records += 1;
        self.stats.bytes += line.len() as u64;
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.w.flush()
    }

    fn stats(&self) -> SinkStats {
        self.stats
    }
}

/// Wraps a JSON sink writing to a file so `finish` can also fsync it.
pub(crate) struct SyncedJsonSink(pub(crate) JsonSink<BufWriter<fs::File>>);

impl RecordSink for SyncedJsonSink {
    fn write_record(&mut self, record: &Record) -> io::Result<()> {
        self.0.write_record(record)
    }

    fn finish(&mut self) -> io::Result<()> {
        self.0.finish()?;
        self.0.w.get_ref().sync_all()
    }

    fn stats(&self) -> SinkStats {
        self.0.stats()
    }
}

/// Streams records out of a JSON-lines reader.
pub fn read_records<R: io::Read + Send + 'static>(r: R) -> RecordSource {
    let it = serde_json::Deserializer::from_reader(r)
        .into_iter::<Record>()
        .map(|r| r.map_err(io::Error::from));
    Box::new(it)
}

pub fn read_file<P: AsRef<Path>>(path: P) -> io::Result<RecordSource> {
    let f = fs::File::open(path)?;
    Ok(read_records(BufReader::new(f)))
}
