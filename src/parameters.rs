//! Parameters for the map phase of a mapreduce job.
//!
//! Parameters are usually built in code with the setters below; they can also be read from a
//! TOML file, in which case every missing field keeps its default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{MapError, Result};
use crate::formats::IntermediateFormat;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MRParameters {
    pub job_name: String,

    pub mappers: usize,
    pub reducers: usize,

    pub intermediate_dir: PathBuf,
    pub format: IntermediateFormat,

    pub write_buffer_size: usize,
    pub sync_on_finalize: bool,
}

impl Default for MRParameters {
    fn default() -> MRParameters {
        MRParameters::new()
    }
}

impl MRParameters {
    pub fn new() -> MRParameters {
        MRParameters {
            job_name: String::from("mr"),
            mappers: 4,
            reducers: 4,
            intermediate_dir: PathBuf::from("."),
            format: IntermediateFormat::WriteLog,
            write_buffer_size: 64 * 1024,
            sync_on_finalize: false,
        }
    }

    /// Parses parameters from a TOML document and validates them.
    pub fn from_toml_str(s: &str) -> Result<MRParameters> {
        let params: MRParameters = toml::from_str(s)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<MRParameters> {
        let path = path.as_ref();
        let s = fs::read_to_string(path).map_err(|e| {
            MapError::InvalidParameters(format!("cannot read {}: {}", path.display(), e))
        })?;
        MRParameters::from_toml_str(&s)
    }

    /// The job name is part of every intermediate file name, so the map and reduce side
    /// need to agree on it.
    ///
    /// Default: mr
    pub fn set_job_name<S: Into<String>>(mut self, name: S) -> MRParameters {
        self.job_name = name.into();
        self
    }

    /// Determines how many map tasks run in parallel when driven by the controller, and how
    /// many reduce shards the map output is split into. The number of reducers must be the
    /// same for every map task of a job.
    ///
    /// Default 4/4
    pub fn set_concurrency(mut self, mappers: usize, reducers: usize) -> MRParameters {
        self.mappers = mappers;
        self.reducers = reducers;
        self
    }

    /// Directory the intermediate files are written to.
    /// Default: the current directory.
    pub fn set_intermediate_dir<P: Into<PathBuf>>(mut self, dir: P) -> MRParameters {
        self.intermediate_dir = dir.into();
        self
    }

    /// Encoding of the intermediate files. Default: WriteLog
    pub fn set_format(mut self, format: IntermediateFormat) -> MRParameters {
        self.format = format;
        self
    }

    /// Size of the write buffer of every shard output. There are `reducers` of them open at
    /// the same time.
    ///
    /// Default 64 KiB
    pub fn set_write_buffer_size(mut self, n: usize) -> MRParameters {
        self.write_buffer_size = n;
        self
    }

    /// Whether to fsync every shard output when finalizing it. Default: false
    pub fn set_sync_on_finalize(mut self, sync: bool) -> MRParameters {
        self.sync_on_finalize = sync;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.job_name.is_empty() {
            return Err(MapError::InvalidParameters(String::from("job name is empty")));
        }
        if self.job_name.contains(|c: char| c == '/' || c == '\\' || c == '\0') {
            return Err(MapError::InvalidParameters(format!("job name {:?} contains a path separator",
                                                           self.job_name)));
        }
        if self.reducers == 0 {
            return Err(MapError::InvalidParameters(String::from("shard count must be positive")));
        }
        if self.mappers == 0 {
            return Err(MapError::InvalidParameters(String::from("mapper count must be positive")));
        }
        if u32::try_from(self.mappers).is_err() {
            return Err(MapError::InvalidParameters(format!("mapper count {} is too large",
                                                           self.mappers)));
        }
        if self.write_buffer_size == 0 {
            return Err(MapError::InvalidParameters(String::from("write buffer size must be positive")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MRParameters;
    use crate::error::Stage;
    use crate::formats::IntermediateFormat;
    use std::path::PathBuf;

    #[test]
    fn test_builder() {
        let p = MRParameters::new()
            .set_job_name("wc")
            .set_concurrency(2, 3)
            .set_intermediate_dir("/tmp/mr")
            .set_format(IntermediateFormat::Json);
        assert_eq!(p.job_name, "wc");
        assert_eq!((p.mappers, p.reducers), (2, 3));
        assert_eq!(p.intermediate_dir, PathBuf::from("/tmp/mr"));
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        assert!(MRParameters::new().set_concurrency(1, 0).validate().is_err());
        assert!(MRParameters::new().set_concurrency(0, 1).validate().is_err());
        assert!(MRParameters::new().set_job_name("").validate().is_err());
        assert!(MRParameters::new().set_job_name("a/b").validate().is_err());
        let e = MRParameters::new().set_write_buffer_size(0).validate().unwrap_err();
        assert_eq!(e.stage(), Stage::Setup);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_validate_mapper_limit() {
        assert!(MRParameters::new().set_concurrency(u32::MAX as usize, 1).validate().is_ok());
        let e = MRParameters::new().set_concurrency(1 << 32, 1).validate().unwrap_err();
        assert!(e.to_string().contains("too large"));
    }

    #[test]
    fn test_from_toml() {
        let p = MRParameters::from_toml_str(r#"
            job_name = "wc"
            reducers = 3
            format = "json"
        "#)
            .unwrap();
        assert_eq!(p.job_name, "wc");
        assert_eq!(p.reducers, 3);
        assert_eq!(p.format, IntermediateFormat::Json);
        assert_eq!(p.mappers, MRParameters::new().mappers);

        assert!(MRParameters::from_toml_str("reducers = 0").is_err());
        assert!(MRParameters::from_toml_str("reducer = 2").is_err());
    }
}
