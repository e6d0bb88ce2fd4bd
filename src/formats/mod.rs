//! Encodings of intermediate files.
//!
//! Both encodings are self-delimiting and carry arbitrary UTF-8 keys and values, so the map
//! side can write them record by record and the reduce side can read them back exactly.

pub mod json;
pub mod util;
pub mod writelog;

#[cfg(test)]
pub mod fake;

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use self::json::{JsonSink, SyncedJsonSink};
use self::util::{RecordReadIterator, RecordSink, RecordSource, WriteLogSink};
use self::writelog::{WriteLogReader, WriteLogWriter};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntermediateFormat {
    /// Length-prefixed entries, key then value.
    #[default]
    WriteLog,
    /// One JSON object per line.
    Json,
}

impl IntermediateFormat {
    /// Creates (or truncates) `path` and returns a sink writing this format to it.
    pub fn create_sink(&self, path: &Path, buffer: usize, sync: bool) -> io::Result<Box<dyn RecordSink>> {
        match *self {
            IntermediateFormat::WriteLog => {
                let w = WriteLogWriter::new_to_file(path, false, buffer)?;
                Ok(Box::new(WriteLogSink::new(w, sync)))
            }
            IntermediateFormat::Json => {
                let s = JsonSink::new_to_file(path, buffer)?;
                if sync {
                    Ok(Box::new(SyncedJsonSink(s)))
                } else {
                    Ok(Box::new(s))
                }
            }
        }
    }

    /// Opens `path` for reading records in this format.
    pub fn open_source(&self, path: &Path) -> io::Result<RecordSource> {
        match *self {
            IntermediateFormat::WriteLog => {
                let r = WriteLogReader::new_from_file(path)?;
                Ok(Box::new(RecordReadIterator::new(r)))
            }
            IntermediateFormat::Json => json::read_file(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::IntermediateFormat;
    use crate::record_types::Record;
    use proptest::prelude::*;

    fn round_trip(format: IntermediateFormat, recs: &[Record]) -> Vec<Record> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shard");
        {
            let mut sink = format.create_sink(&path, 128, false).unwrap();
            for r in recs {
                sink.write_record(r).unwrap();
            }
            sink.finish().unwrap();
            assert_eq!(sink.stats().records, recs.len() as u64);
        }
        format.open_source(&path).unwrap().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_awkward_content() {
        let recs = vec![Record::new("", ""),
                        Record::new("line\nbreak", "tab\there"),
                        Record::new("\"quoted\"", "{\"key\":\"x\"}"),
                        Record::new("nul\0byte", "\r\n"),
                        Record::new("日本語", "ünïcödé"),
                        Record::new("dup", "1"),
                        Record::new("dup", "1")];
        for f in [IntermediateFormat::WriteLog, IntermediateFormat::Json].iter() {
            assert_eq!(round_trip(*f, &recs), recs);
        }
    }

    #[test]
    fn test_empty_output() {
        for f in [IntermediateFormat::WriteLog, IntermediateFormat::Json].iter() {
            assert!(round_trip(*f, &[]).is_empty());
        }
    }

    #[test]
    fn test_sync_sink() {
        let dir = tempfile::tempdir().unwrap();
        for f in [IntermediateFormat::WriteLog, IntermediateFormat::Json].iter() {
            let path = dir.path().join(format!("synced-{:?}", f));
            let mut sink = f.create_sink(&path, 16, true).unwrap();
            sink.write_record(&Record::new("k", "v")).unwrap();
            sink.finish().unwrap();
            let back: Vec<Record> = f.open_source(&path).unwrap().map(|r| r.unwrap()).collect();
            assert_eq!(back, vec![Record::new("k", "v")]);
        }
    }

    fn format_strategy() -> impl Strategy<Value = IntermediateFormat> {
        prop_oneof![Just(IntermediateFormat::WriteLog), Just(IntermediateFormat::Json)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]
        #[test]
        fn prop_round_trip(format in format_strategy(),
                           pairs in prop::collection::vec((any::<String>(), any::<String>()), 0..20)) {
            let recs: Vec<Record> = pairs.into_iter().map(|(k, v)| Record::new(k, v)).collect();
            prop_assert_eq!(round_trip(format, &recs), recs);
        }
    }
}
