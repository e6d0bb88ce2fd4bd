//! A Mapper that uses a supplied map() function.

use std::fmt;

use crate::mapreducer::{Mapper, Sharder, SharderF, TransformError, std_shard};
use crate::record_types::{MEmitter, Record};

/// This type implements the Mapper and Sharder traits. You can use it to provide your own
/// function to a map task. If you need more flexibility, however, you may want to simply
/// implement your own type that fulfills Mapper.
#[derive(Clone)]
pub struct ClosureMapper<F> {
    mapper: F,
    sharder: SharderF,
}

impl<F> ClosureMapper<F>
    where F: Fn(&mut MEmitter, &str, &str) -> Result<(), TransformError> + Send + Clone
{
    /// Create a new Mapper from the supplied function.
    pub fn new(mapper: F) -> ClosureMapper<F> {
        ClosureMapper {
            mapper,
            sharder: std_shard,
        }
    }
}

impl<F> ClosureMapper<F> {
    /// Set the function used for sharding.
    pub fn set_sharder(&mut self, s: SharderF) {
        self.sharder = s;
    }

    pub fn with_sharder(mut self, s: SharderF) -> ClosureMapper<F> {
        self.sharder = s;
        self
    }
}

/// Wraps a transform that returns its records directly, i.e. `(partition, content) -> [Record]`.
pub fn from_records<T>(transform: T)
    -> ClosureMapper<impl Fn(&mut MEmitter, &str, &str) -> Result<(), TransformError> + Send + Clone>
    where T: Fn(&str, &str) -> Result<Vec<Record>, TransformError> + Send + Clone
{
    ClosureMapper::new(move |e: &mut MEmitter, partition: &str, content: &str| {
        e.extend(transform(partition, content)?);
        Ok(())
    })
}

impl<F> Mapper for ClosureMapper<F>
    where F: Fn(&mut MEmitter, &str, &str) -> Result<(), TransformError> + Send + Clone
{
    fn map(&mut self, e: &mut MEmitter, partition: &str, content: &str)
           -> Result<(), TransformError> {
        (self.mapper)(e, partition, content)
    }
}

impl<F: Send + Clone> Sharder for ClosureMapper<F> {
    fn shard(&self, n: usize, k: &str) -> usize {
        (self.sharder)(n, k)
    }
}

impl<F> fmt::Debug for ClosureMapper<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureMapper").finish_non_exhaustive()
    }
}
