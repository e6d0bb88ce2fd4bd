//! The map side of a mapreduce process: runs a map function over one input partition and
//! splits its output into one intermediate file per reduce shard.
//!
//! Which shard a record goes to only depends on its key and the number of shards, and the
//! names of intermediate files only depend on (job, map task, shard), so reduce tasks can
//! find their inputs without talking to the map tasks. A map task that fails can be re-run
//! as a whole; it truncates and rewrites its outputs.
//!

pub mod closure_mr;
pub mod controller;
pub mod error;
pub mod formats;
pub mod map;
pub mod mapreducer;
pub mod parameters;
pub mod phases;
pub mod record_types;
pub mod shard_writer;
pub mod stats;

pub use closure_mr::ClosureMapper;
pub use controller::MRController;
pub use error::{MapError, Result, Stage};
pub use formats::IntermediateFormat;
pub use map::{run_map_task, run_map_task_with, MapPartition};
pub use mapreducer::{ihash, std_shard, DefaultSharder, Mapper, Sharder, TransformError};
pub use parameters::MRParameters;
pub use phases::output::{intermediate_name, read_intermediate};
pub use record_types::{MEmitter, Record};
pub use stats::MapTaskStats;
