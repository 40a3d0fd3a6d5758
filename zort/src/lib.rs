//! Welcome to `zort`!
//!
//! `zort` plans how a benchmark suite that has already been run once
//! should be re-submitted to a batch-scheduled cluster. Jobs are packed
//! into fixed-size buckets, each bucket being one scheduler allocation
//! whose members run in parallel, buckets are then mapped onto a pool
//! of nodes, and the whole batch is priced in core-hours, kWh and money.

mod zummary;
mod analyze;

pub mod algo;
pub mod config;
pub mod report;
pub mod suite;
pub mod helpe;

pub use crate::helpe::*;

/// One line of the benchmarks list: what the user wants to run.
///
/// The `order` is the number the line carried in the input file and
/// is written back unchanged when generating a reordered list.
#[derive(Debug, Clone, PartialEq)]
pub struct Benchmark {
    pub order:  usize,
    pub path:   Option<String>,
    pub name:   String,
}

/// Resource limits the run of a [Zummary] was subjected to.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Limit {
    pub time:   Seconds,
    pub real:   Seconds,
    pub memory: MegaBytes,
}

/// One line of the zummary file: how a benchmark behaved when
/// it was last run.
///
/// The last two fields are `zort`'s own bookkeeping. They are
/// reset when the [Suite] is built and only touched by the packer.
#[derive(Debug, Clone, PartialEq)]
pub struct Zummary {
    pub name:               String,
    pub status:             i32,
    /// CPU time.
    pub time:               Seconds,
    /// Wall-clock time.
    pub real:               Seconds,
    pub memory:             MegaBytes,
    pub limit:              Limit,
    pub scheduled:          bool,
    pub memory_limit_hit:   bool,
}

/// A group of zummary entries meant to run in parallel as one
/// scheduler allocation.
///
/// Members are indices into the [Suite]'s zummary entries. The
/// bucket's makespan, [`real`](Bucket::real), is the longest wall-clock
/// time among them; its [`memory`](Bucket::memory) is what they need
/// together.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub capacity:           usize,
    pub members:            Vec<RecordIdx>,
    pub real:               Seconds,
    pub memory:             MegaBytes,
    pub memory_limit_hits:  usize,
}
