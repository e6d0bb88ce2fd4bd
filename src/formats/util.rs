//! Record-level adapters on top of the byte-level formats.

use std::fs;
use std::io::{self, BufWriter, Read};
use std::string;

use crate::formats::writelog::{WriteLogReader, WriteLogWriter};
use crate::record_types::Record;

/// Counters of a single output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SinkStats {
    pub records: u64,
    pub bytes: u64,
}

/// Destination of one shard's intermediate records.
///
/// `finish` flushes everything written so far to the underlying storage. A sink that is
/// dropped without `finish` releases its handle but may lose buffered records.
pub trait RecordSink: Send {
    fn write_record(&mut self, record: &Record) -> io::Result<()>;
    fn finish(&mut self) -> io::Result<()>;
    fn stats(&self) -> SinkStats;
}

impl<S: RecordSink + ?Sized> RecordSink for Box<S> {
    fn write_record(&mut self, record: &Record) -> io::Result<()> {
        (**self).write_record(record)
    }
    fn finish(&mut self) -> io::Result<()> {
        (**self).finish()
    }
    fn stats(&self) -> SinkStats {
        (**self).stats()
    }
}

/// Sequence of records read back from an intermediate output.
pub type RecordSource = Box<dyn Iterator<Item = io::Result<Record>> + Send>;

/// Writes records as two WriteLog entries each: key, then value.
pub struct WriteLogSink {
    w: WriteLogWriter<BufWriter<fs::File>>,
    records: u64,
    sync: bool,
}

impl WriteLogSink {
    pub fn new(w: WriteLogWriter<BufWriter<fs::File>>, sync: bool) -> WriteLogSink {
        WriteLogSink { w, records: 0, sync }
    }
}

impl RecordSink for WriteLogSink {
    fn write_record(&mut self, record: &Record) -> io::Result<()> {
        self.w.write_entry(record.key.as_bytes())?;
        self.w.write_entry(record.value.as_bytes())?;
        self.records += 1;
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.w.flush()?;
        if self.sync {
            self.w.get_ref().get_ref().sync_all()?;
        }
        Ok(())
    }

    fn stats(&self) -> SinkStats {
        SinkStats {
            records: self.records,
            bytes: self.w.stats().0,
        }
    }
}

/// Reads pairs of WriteLog entries as (key, value) records. An odd number of entries or a
/// non-UTF-8 entry is reported as InvalidData; the iterator ends after the first error.
pub struct RecordReadIterator<R: Read> {
    r: WriteLogReader<R>,
    done: bool,
}

impl<R: Read> RecordReadIterator<R> {
    pub fn new(r: WriteLogReader<R>) -> RecordReadIterator<R> {
        RecordReadIterator { r, done: false }
    }

    fn next_record(&mut self) -> io::Result<Option<Record>> {
        let key = match self.r.read_entry()? {
            None => return Ok(None),
            Some(k) => to_string(k)?,
        };
        let value = match self.r.read_entry()? {
            None => {
                return Err(io::Error::new(io::ErrorKind::InvalidData,
                                          format!("key {:?} has no value", key)))
            }
            Some(v) => to_string(v)?,
        };
        Ok(Some(Record { key, value }))
    }
}

fn to_string(v: Vec<u8>) -> io::Result<String> {
    string::String::from_utf8(v).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

impl<R: Read> Iterator for RecordReadIterator<R> {
    type Item = io::Result<Record>;
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(r)) => Some(Ok(r)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
