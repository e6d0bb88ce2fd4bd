//! The Mapper and Sharder traits and the default sharding function.

use std::error::Error;
use std::hash::Hasher;

use fnv::FnvHasher;

use crate::record_types::MEmitter;

/// Error type returned by map functions. It is passed on to the caller unchanged.
pub type TransformError = Box<dyn Error + Send + Sync + 'static>;

/// Hashes a key to a non-negative 31-bit value (FNV-1a, top bits masked off).
/// The result only depends on the key's bytes, so every process computes the same value.
pub fn ihash(key: &str) -> u32 {
    let mut h = FnvHasher::default();
    h.write(key.as_bytes());
    (h.finish() & 0x7fff_ffff) as u32
}

/// Default sharding function. Returns a value in [0; n).
///
/// `n` must not be zero; `MRParameters::validate` makes sure of that before any
/// map task runs.
pub fn std_shard(n: usize, key: &str) -> usize {
    ihash(key) as usize % n
}

/// A function used to determine the shard a key belongs in.
/// The first argument is the number of shards, the second one the key;
/// the return value should be in [0; n).
pub type SharderF = fn(usize, &str) -> usize;

pub trait Mapper: Send + Clone {
    /// Takes the partition reference and the entire content of the partition.
    /// The emitter is used to yield results from the map phase; order of emission is
    /// kept within each shard.
    ///
    /// Note that this method takes a &mut self; you can use this to cache expensive objects
    /// between runs (but not between map tasks, as every task gets its own clone!)
    fn map(&mut self, em: &mut MEmitter, partition: &str, content: &str)
           -> Result<(), TransformError>;
}

pub trait Sharder: Send + Clone {
    /// Determines how to map keys to (reduce) shards.
    /// Returns a number in [0; n) determining the shard the key belongs in.
    /// The default implementation uses FNV-1a and modulo.
    fn shard(&self, n: usize, key: &str) -> usize {
        std_shard(n, key)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultSharder;

impl Sharder for DefaultSharder {}
