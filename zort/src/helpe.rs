pub use std::{
    cell::Cell,
    io::{BufRead, BufReader},
    collections::{BinaryHeap, TryReserveError},
    cmp::Ordering,
    fmt,
    path::{Path, PathBuf},
    time::Instant,
};
pub use thiserror::Error;
pub use itertools::Itertools;
pub use rayon::prelude::*;
pub use indexmap::IndexMap;
pub use clap::{Parser, ValueEnum};
pub use log::{debug, info, trace, warn};

pub use crate::{Benchmark, Zummary, Limit, Bucket,
    config::*,
    suite::*,
    report::*,
    analyze::{Cost, Statistics},
    algo::{
        packing::Packing,
        nodes::{NodeSchedule, NodeSlot, ScheduledBucket},
    },
};

/// Wall-clock and CPU time, as found in the zummary file.
pub type Seconds = f64;

/// Memory, as found in the zummary file.
pub type MegaBytes = f64;

/// Position of a [Zummary] inside its [Suite]. Buckets
/// refer to their members through this, never by owning them.
pub type RecordIdx = usize;

/// Position of a [Benchmark] inside its [Suite].
pub type BenchIdx = usize;

/// The first of the two "known good" status codes (satisfiable).
pub const STATUS_SAT: i32 = 10;
/// The second "known good" status code (unsatisfiable).
pub const STATUS_UNSAT: i32 = 20;
/// Status of a run which was killed for exceeding its memory limit.
pub const STATUS_MEMORY_OUT: i32 = 2;

/// Coarse classification of a [ZortError]. Every kind is fatal.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    /// Reading or parsing one of the input files failed.
    Input,
    /// Benchmarks and zummary entries are not in bijection.
    InputMismatch,
    /// Some option is out of its legal range.
    Configuration,
    /// An internal check of the packer failed.
    AlgorithmInvariant,
    /// An internal collection could not be allocated.
    ResourceExhaustion,
}

#[derive(Error, Debug)]
pub enum ZortError {
    #[error("could not read '{}'", path.display())]
    Io {
        path:   PathBuf,
        source: std::io::Error,
    },
    #[error("{message} in line {lineno} in '{}'", path.display())]
    Parse {
        path:       PathBuf,
        lineno:     usize,
        message:    String,
    },
    #[error("failed to read header line in '{}'", path.display())]
    MissingHeader {
        path:   PathBuf,
    },
    #[error("{what} file '{}' does not exist", path.display())]
    MissingFile {
        what:   &'static str,
        path:   PathBuf,
    },
    #[error("directory '{}' does not exist", path.display())]
    MissingDirectory {
        path:   PathBuf,
    },
    #[error("could not find zummary entry '{0}' in benchmarks")]
    UnmatchedRecord(String),
    #[error("could not find benchmark entry '{0}' in zummary")]
    UnmatchedDescriptor(String),
    #[error("{benchmarks} benchmarks but {zummaries} zummary entries")]
    CountMismatch {
        benchmarks: usize,
        zummaries:  usize,
    },
    #[error("duplicate {what} name '{name}'")]
    DuplicateName {
        what:   &'static str,
        name:   String,
    },
    #[error("invalid bucket size '{0}' (must be positive)")]
    InvalidBucketSize(usize),
    #[error("invalid number of nodes '{0}' (must be positive)")]
    InvalidNodeCount(usize),
    #[error("invalid fast bucket fraction '{0}' (expected percentage in range 0..100)")]
    InvalidFraction(u32),
    #[error("invalid {what} '{value}'")]
    InvalidValue {
        what:   &'static str,
        value:  f64,
    },
    #[error("bucket {bucket} of capacity {capacity} is already full")]
    CapacityExceeded {
        bucket:     usize,
        capacity:   usize,
    },
    #[error("zummary entry '{0}' scheduled twice")]
    AlreadyScheduled(String),
    #[error("only {scheduled} out of {total} zummary entries scheduled")]
    IncompleteScheduling {
        scheduled:  usize,
        total:      usize,
    },
    #[error("out-of-memory {what}")]
    OutOfMemory {
        what:   &'static str,
        source: TryReserveError,
    },
}

impl ZortError {
    pub fn kind(&self) -> ErrorKind {
        use ZortError::*;
        match self {
            Io { .. } | Parse { .. } | MissingHeader { .. } | MissingFile { .. } | MissingDirectory { .. } => {
                ErrorKind::Input
            },
            UnmatchedRecord(_) | UnmatchedDescriptor(_) | CountMismatch { .. } | DuplicateName { .. } => {
                ErrorKind::InputMismatch
            },
            InvalidBucketSize(_) | InvalidNodeCount(_) | InvalidFraction(_) | InvalidValue { .. } => {
                ErrorKind::Configuration
            },
            CapacityExceeded { .. } | AlreadyScheduled(_) | IncompleteScheduling { .. } => {
                ErrorKind::AlgorithmInvariant
            },
            OutOfMemory { .. }  => { ErrorKind::ResourceExhaustion },
        }
    }
}

/// Allocates an empty vector able to hold `n` elements, reporting
/// allocation failure instead of aborting.
pub fn try_with_capacity<T>(n: usize, what: &'static str) -> Result<Vec<T>, ZortError> {
    let mut res = Vec::new();
    res.try_reserve_exact(n)
        .map_err(|source| ZortError::OutOfMemory { what, source })?;

    Ok(res)
}

/// Defines the interface for reading one of `zort`'s
/// line-oriented input files.
///
/// Both inputs share the same strictness: every line, including
/// the last one, must be terminated by a new-line, no line may be
/// empty and no line may contain a zero byte.
pub trait LineReader {
    type Item;

    fn new(path: PathBuf) -> Self;
    fn path(&self) -> &Path;
    /// Parses a single non-empty line. `lineno` starts at 1.
    fn gen_single(&self, line: &str, lineno: usize) -> Result<Self::Item, ZortError>;
    /// How many leading lines are to be ignored.
    fn header_lines(&self) -> usize { 0 }

    /// Reads items from any buffered source. Used by [LineReader::read]
    /// and directly by tests.
    fn read_from<R: BufRead>(&self, mut reader: R) -> Result<Vec<Self::Item>, ZortError> {
        let mut res = vec![];
        let mut buf = vec![];
        let mut lineno = 0;
        loop {
            buf.clear();
            let n = reader.read_until(b'\n', &mut buf)
                .map_err(|source| ZortError::Io { path: self.path().to_path_buf(), source })?;
            if n == 0 { break; }
            lineno += 1;
            let line = self.check_line(&buf, lineno)?;
            if lineno <= self.header_lines() { continue; }
            res.push(self.gen_single(line, lineno)?);
        }
        if lineno < self.header_lines() {
            return Err(ZortError::MissingHeader { path: self.path().to_path_buf() });
        }

        Ok(res)
    }

    /// Opens the file at [LineReader::path] and reads all its items.
    fn read(&self) -> Result<Vec<Self::Item>, ZortError> {
        let path = self.path();
        if !path.is_file() {
            return Err(ZortError::MissingFile { what: "input", path: path.to_path_buf() });
        }
        let fd = std::fs::File::open(path)
            .map_err(|source| ZortError::Io { path: path.to_path_buf(), source })?;
        let res = self.read_from(BufReader::new(fd))?;
        debug!("read {} entries from '{}'", res.len(), path.display());

        Ok(res)
    }

    fn check_line<'a>(&self, raw: &'a [u8], lineno: usize) -> Result<&'a str, ZortError> {
        let Some((&last, body)) = raw.split_last() else {
            return Err(self.parse_error(lineno, "unexpected end-of-file"));
        };
        if last != b'\n' {
            return Err(self.parse_error(lineno, "unexpected end-of-file before new-line"));
        }
        if body.is_empty() {
            return Err(self.parse_error(lineno, "empty line"));
        }
        if body.contains(&0) {
            return Err(self.parse_error(lineno, "unexpected zero character"));
        }
        // Tolerate DOS line endings.
        let body = body.strip_suffix(b"\r").unwrap_or(body);

        std::str::from_utf8(body)
            .map_err(|_| self.parse_error(lineno, "invalid UTF-8"))
    }

    fn parse_error(&self, lineno: usize, message: &str) -> ZortError {
        ZortError::Parse {
            path:       self.path().to_path_buf(),
            lineno,
            message:    message.to_string(),
        }
    }
}

//---START INPUT READERS
/// Reads the benchmarks list: lines of either `order name` or
/// `order path name`. All lines of one file must agree on the
/// number of fields.
pub struct BenchmarksReader {
    pub path:   PathBuf,
    fields:     Cell<Option<usize>>,
}

impl LineReader for BenchmarksReader {
    type Item = Benchmark;

    fn new(path: PathBuf) -> Self {
        Self {
            path,
            fields: Cell::new(None),
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn gen_single(&self, line: &str, lineno: usize) -> Result<Benchmark, ZortError> {
        let fields: Vec<&str> = line.split_ascii_whitespace().collect();
        let Some(number) = fields.first() else {
            return Err(self.parse_error(lineno, "empty line"));
        };
        if !number.bytes().all(|b| b.is_ascii_digit()) {
            return Err(self.parse_error(lineno, "expected digit"));
        }
        let order = number.parse::<usize>()
            .map_err(|_| self.parse_error(lineno, "order out of range"))?;
        match self.fields.get() {
            Some(n) if n != fields.len()    => {
                return Err(self.parse_error(
                    lineno,
                    &format!("expected {n} fields but got {}", fields.len())
                ));
            },
            _   => { self.fields.set(Some(fields.len())); }
        }

        match fields[..] {
            [_, name]       => {
                Ok(Benchmark {
                    order,
                    path:   None,
                    name:   name.to_string(),
                })
            },
            [_, path, name] => {
                Ok(Benchmark {
                    order,
                    path:   Some(path.to_string()),
                    name:   name.to_string(),
                })
            },
            _   => { Err(self.parse_error(lineno, "line truncated")) }
        }
    }
}

/// Reads the zummary file: one header line, then
/// `name status time real memory limit-time limit-real limit-memory`.
pub struct ZummaryReader {
    pub path:   PathBuf,
}

pub const ZUMMARY_FIELDS_NUM: usize = 8;

impl LineReader for ZummaryReader {
    type Item = Zummary;

    fn new(path: PathBuf) -> Self {
        Self {
            path,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn header_lines(&self) -> usize { 1 }

    fn gen_single(&self, line: &str, lineno: usize) -> Result<Zummary, ZortError> {
        let fields: Vec<&str> = line.split_ascii_whitespace().collect();
        if fields.len() < 2 {
            return Err(self.parse_error(lineno, "line truncated"));
        }
        if fields.len() != ZUMMARY_FIELDS_NUM {
            return Err(self.parse_error(lineno, "invalid zummary entry"));
        }
        let status = fields[1].parse::<i32>()
            .map_err(|_| self.parse_error(lineno, "invalid status"))?;
        let mut data_buf: [f64; ZUMMARY_FIELDS_NUM - 2] = [0.0; ZUMMARY_FIELDS_NUM - 2];
        for (idx, x) in fields[2..].iter().enumerate() {
            data_buf[idx] = x.parse::<f64>()
                .map_err(|_| self.parse_error(lineno, "invalid zummary entry"))?;
        }

        Ok(Zummary {
            name:               fields[0].to_string(),
            status,
            time:               data_buf[0],
            real:               data_buf[1],
            memory:             data_buf[2],
            limit:              Limit {
                time:   data_buf[3],
                real:   data_buf[4],
                memory: data_buf[5],
            },
            scheduled:          false,
            memory_limit_hit:   false,
        })
    }
}
//---END INPUT READERS

/// Returns `a` as a percentage of `b`. A zero `b` degenerates
/// to `100 * a` instead of dividing by zero.
#[inline(always)]
pub fn percent(a: f64, b: f64) -> f64 {
    if b == 0.0 { 100.0 * a } else { 100.0 * a / b }
}
