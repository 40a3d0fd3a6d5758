use crate::helpe::*;

/// A benchmark suite whose benchmarks and zummary entries have been
/// matched one-to-one by name.
///
/// The suite owns both collections for the rest of the run. Links
/// between the two are kept as indices in both directions.
#[derive(Debug, Clone)]
pub struct Suite {
    benchmarks:     Vec<Benchmark>,
    zummaries:      Vec<Zummary>,
    // `records[b]` is the zummary entry of benchmark `b`.
    records:        Vec<RecordIdx>,
    // `descriptors[z]` is the benchmark of zummary entry `z`.
    descriptors:    Vec<BenchIdx>,
}

/// Initializes a [Suite] from the benchmarks list and the zummary.
/// A successfully returned [Suite] is guaranteed to satisfy:
/// - no two benchmarks, and no two zummary entries, share a name
/// - every zummary entry names exactly one benchmark
/// - every benchmark is named by exactly one zummary entry
/// - no zummary entry is marked as scheduled
///
/// This function is the gatekeeper to the rest of the library.
pub fn init(benchmarks: Vec<Benchmark>, mut zummaries: Vec<Zummary>) -> Result<Suite, ZortError> {
    let mut bench_index: IndexMap<&str, BenchIdx> = IndexMap::with_capacity(benchmarks.len());
    for (idx, b) in benchmarks.iter().enumerate() {
        if bench_index.insert(b.name.as_str(), idx).is_some() {
            return Err(ZortError::DuplicateName { what: "benchmark", name: b.name.clone() });
        }
    }

    let mut zummary_index: IndexMap<&str, RecordIdx> = IndexMap::with_capacity(zummaries.len());
    for (idx, z) in zummaries.iter().enumerate() {
        if zummary_index.insert(z.name.as_str(), idx).is_some() {
            return Err(ZortError::DuplicateName { what: "zummary", name: z.name.clone() });
        }
    }

    // Every zummary entry must point to a benchmark...
    let mut descriptors: Vec<BenchIdx> = try_with_capacity(zummaries.len(), "linking zummaries")?;
    for z in &zummaries {
        match bench_index.get(z.name.as_str()) {
            Some(b) => { descriptors.push(*b); },
            None    => { return Err(ZortError::UnmatchedRecord(z.name.clone())); }
        }
    }

    // ...and every benchmark must be pointed to.
    let mut records: Vec<RecordIdx> = try_with_capacity(benchmarks.len(), "linking benchmarks")?;
    for b in &benchmarks {
        match zummary_index.get(b.name.as_str()) {
            Some(z) => { records.push(*z); },
            None    => { return Err(ZortError::UnmatchedDescriptor(b.name.clone())); }
        }
    }

    // Unique names on both sides plus both matching loops imply
    // equal sizes. We still check it.
    if benchmarks.len() != zummaries.len() {
        return Err(ZortError::CountMismatch {
            benchmarks: benchmarks.len(),
            zummaries:  zummaries.len(),
        });
    }

    for z in zummaries.iter_mut() {
        z.scheduled = false;
        z.memory_limit_hit = false;
    }
    debug!("matched {} benchmarks with their zummary entries", benchmarks.len());

    Ok(Suite {
        benchmarks,
        zummaries,
        records,
        descriptors,
    })
}

impl Suite {
    /// Number of matched pairs.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.zummaries.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.zummaries.is_empty()
    }

    pub fn benchmarks(&self) -> &[Benchmark] {
        &self.benchmarks
    }

    pub fn zummaries(&self) -> &[Zummary] {
        &self.zummaries
    }

    /// Mutable access is reserved for the packer's bookkeeping.
    pub(crate) fn zummaries_mut(&mut self) -> &mut [Zummary] {
        &mut self.zummaries
    }

    pub fn zummary(&self, idx: RecordIdx) -> &Zummary {
        &self.zummaries[idx]
    }

    /// The benchmark of zummary entry `z`.
    pub fn benchmark_of(&self, z: RecordIdx) -> &Benchmark {
        &self.benchmarks[self.descriptors[z]]
    }

    /// Zummary indices in the benchmarks' original order.
    pub fn original_order(&self) -> impl Iterator<Item = RecordIdx> + '_ {
        self.records.iter().copied()
    }
}
