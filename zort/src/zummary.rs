use crate::helpe::*;

impl Zummary {
    /// Returns `true` if the run ended with one of the
    /// two "known good" status codes.
    #[inline(always)]
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SAT || self.status == STATUS_UNSAT
    }

    /// Returns `true` if the run was killed for its memory,
    /// or reached its memory limit without being killed.
    #[inline(always)]
    pub fn hits_memory_limit(&self) -> bool {
        self.status == STATUS_MEMORY_OUT || self.memory >= self.limit.memory
    }

    /// Returns `true` if the entry may go into a fast lane bucket.
    #[inline(always)]
    pub fn fits_fast_lane(&self, max_memory: MegaBytes) -> bool {
        self.is_success() && self.memory <= max_memory
    }

    /// Fast lane order: shortest first, lightest first among equals.
    pub fn cmp_by_real(&self, other: &Self) -> Ordering {
        self.real
            .total_cmp(&other.real)
            .then(self.memory.total_cmp(&other.memory))
    }

    /// Balancing order: lightest first, shortest first among equals.
    pub fn cmp_by_memory(&self, other: &Self) -> Ordering {
        self.memory
            .total_cmp(&other.memory)
            .then(self.real.total_cmp(&other.real))
    }
}

/// Writes the benchmark back in the shape it was read in.
impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(p) => write!(f, "{} {} {}", self.order, p, self.name),
            None    => write!(f, "{} {}", self.order, self.name),
        }
    }
}

impl Bucket {
    /// Creates an empty bucket which will hold at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            members:            vec![],
            real:               0.0,
            memory:             0.0,
            memory_limit_hits:  0,
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.members.len() >= self.capacity
    }

    /// Appends `z`, found at `idx`, and updates makespan, memory and
    /// memory-limit hits accordingly. Capacity is the caller's business.
    ///
    /// Returns whether `z` hits its memory limit.
    #[inline(always)]
    pub fn admit(&mut self, idx: RecordIdx, z: &Zummary) -> bool {
        debug_assert!(!self.is_full(), "Bucket overflow requested");
        self.members.push(idx);
        if z.real > self.real {
            self.real = z.real;
        }
        self.memory += z.memory;
        let hit = z.hits_memory_limit();
        if hit {
            self.memory_limit_hits += 1;
        }

        hit
    }
}
