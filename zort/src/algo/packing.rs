use crate::helpe::*;

/// The product of packing: every zummary entry of the [Suite]
/// sits in exactly one of [`buckets`](Packing::buckets).
#[derive(Debug, Clone)]
pub struct Packing {
    pub buckets:            Vec<Bucket>,
    pub bucket_size:        usize,
    /// Capacity of the last bucket (equal to `bucket_size`
    /// if the suite divides evenly).
    pub last_bucket_size:   usize,
}

impl Packing {
    /// Number of buckets, i.e., scheduler tasks.
    pub fn tasks(&self) -> usize {
        self.buckets.len()
    }
}

/// Packs the zummary entries of `suite` into buckets of
/// `cfg.bucket_size` entries each.
///
/// With `cfg.keep_order` the benchmarks' original order is simply cut
/// into consecutive buckets. Otherwise two greedy phases run:
///
/// 1. The *fast lane*: successful, memory-light entries, shortest first,
///    fill the first `cfg.fast_bucket_fraction` percent of buckets.
/// 2. *Balancing*: whatever is left goes out heaviest first, round-robin
///    over the buckets with room, starting from the last bucket.
pub fn pack(suite: &mut Suite, cfg: &Config) -> Result<Packing, ZortError> {
    if cfg.bucket_size == 0 {
        return Err(ZortError::InvalidBucketSize(cfg.bucket_size));
    }
    let order: Vec<RecordIdx> = if cfg.keep_order {
        suite.original_order().collect()
    } else { vec![] };

    let mut packer = Packer::new(suite.zummaries_mut(), cfg.bucket_size)?;
    info!(
        "packing {} entries into {} buckets of size {} (last {})",
        packer.zummaries.len(),
        packer.buckets.len(),
        cfg.bucket_size,
        packer.last_bucket_size,
    );
    if cfg.keep_order {
        packer.keep_order(order)?;
    } else {
        packer.fast_lane(cfg.fast_bucket_fraction, cfg.fast_bucket_memory)?;
        packer.balance()?;
    }
    let last_bucket_size = packer.last_bucket_size;
    let buckets = packer.finish()?;

    Ok(Packing {
        buckets,
        bucket_size:    cfg.bucket_size,
        last_bucket_size,
    })
}

/// State of one packing invocation.
struct Packer<'a> {
    zummaries:          &'a mut [Zummary],
    buckets:            Vec<Bucket>,
    last_bucket_size:   usize,
    // How many entries have been placed so far.
    scheduled:          usize,
}

impl<'a> Packer<'a> {
    /// Creates `ceil(N / bucket_size)` empty buckets upfront.
    fn new(zummaries: &'a mut [Zummary], bucket_size: usize) -> Result<Self, ZortError> {
        let total = zummaries.len();
        let tasks = total.div_ceil(bucket_size);
        let last_bucket_size = if tasks == 0 { 0 } else {
            total - (tasks - 1) * bucket_size
        };
        debug_assert!(tasks == 0 || (last_bucket_size > 0 && last_bucket_size <= bucket_size));

        let mut buckets = try_with_capacity(tasks, "allocating buckets")?;
        for i in 0..tasks {
            let capacity = if i + 1 == tasks { last_bucket_size } else { bucket_size };
            buckets.push(Bucket::new(capacity));
        }

        Ok(Self {
            zummaries,
            buckets,
            last_bucket_size,
            scheduled:  0,
        })
    }

    /// Puts entry `idx` into bucket `b`. Both a full bucket
    /// and an already placed entry are hard errors.
    fn schedule(&mut self, b: usize, idx: RecordIdx) -> Result<(), ZortError> {
        let bucket = &mut self.buckets[b];
        if bucket.is_full() {
            return Err(ZortError::CapacityExceeded {
                bucket:     b,
                capacity:   bucket.capacity,
            });
        }
        let z = &mut self.zummaries[idx];
        if z.scheduled {
            return Err(ZortError::AlreadyScheduled(z.name.clone()));
        }
        let hit = bucket.admit(idx, z);
        z.memory_limit_hit = hit;
        z.scheduled = true;
        self.scheduled += 1;
        trace!("'{}' goes to bucket {b} (real {:.2}, memory {:.1})", z.name, z.real, z.memory);

        Ok(())
    }

    /// Indices of entries not placed yet, in ascending order.
    fn unscheduled(&self) -> Result<Vec<RecordIdx>, ZortError> {
        let mut res = try_with_capacity(self.zummaries.len() - self.scheduled, "collecting unscheduled entries")?;
        res.extend(
            self.zummaries
                .iter()
                .enumerate()
                .filter(|(_, z)| !z.scheduled)
                .map(|(idx, _)| idx)
        );

        Ok(res)
    }

    /// Cuts `order` into consecutive buckets.
    fn keep_order(&mut self, order: Vec<RecordIdx>) -> Result<(), ZortError> {
        let mut current = 0;
        for idx in order {
            if self.buckets[current].is_full() && current + 1 < self.buckets.len() {
                current += 1;
            }
            self.schedule(current, idx)?;
        }

        Ok(())
    }

    /// First phase: shortest (then lightest) successful entries that need
    /// at most `max_memory` go into the first `fraction` percent of buckets.
    fn fast_lane(&mut self, fraction: u32, max_memory: MegaBytes) -> Result<(), ZortError> {
        let limit = fraction as usize * self.buckets.len() / 100;
        if limit == 0 {
            debug!("no fast lane buckets");
            return Ok(());
        }

        let mut sorted = self.unscheduled()?;
        let zs: &[Zummary] = &*self.zummaries;
        // Stable, so entries comparing equal keep their input order.
        sorted.par_sort_by(|a, b| zs[*a].cmp_by_real(&zs[*b]));

        let (mut current, mut filled, mut skipped) = (0, 0, 0);
        for idx in sorted {
            if filled == limit {
                break;
            }
            if !self.zummaries[idx].fits_fast_lane(max_memory) {
                skipped += 1;
                continue;
            }
            self.schedule(current, idx)?;
            if self.buckets[current].is_full() {
                filled += 1;
                current += 1;
            }
        }
        debug!(
            "fast lane: {filled}/{limit} buckets filled, {} entries placed, {skipped} skipped",
            self.scheduled
        );

        Ok(())
    }

    /// Second phase: remaining entries, heaviest first, are dealt
    /// round-robin over the buckets that still have room. Dealing
    /// starts at the last bucket and wraps around to the first.
    fn balance(&mut self) -> Result<(), ZortError> {
        let mut sorted = self.unscheduled()?;
        if sorted.is_empty() {
            return Ok(());
        }
        let zs: &[Zummary] = &*self.zummaries;
        sorted.par_sort_by(|a, b| zs[*a].cmp_by_memory(&zs[*b]));

        let tasks = self.buckets.len();
        let mut current = tasks - 1;
        let to_balance = sorted.len();
        for idx in sorted.into_iter().rev() {
            current = self.next_with_room(current)?;
            self.schedule(current, idx)?;
            current = (current + 1) % tasks;
        }
        debug!("balancing: {to_balance} entries placed");

        Ok(())
    }

    /// Starting at `from`, returns the first bucket in forward
    /// rotation that is not full.
    fn next_with_room(&self, from: usize) -> Result<usize, ZortError> {
        let tasks = self.buckets.len();
        (0..tasks)
            .map(|step| (from + step) % tasks)
            .find(|b| !self.buckets[*b].is_full())
            .ok_or_else(|| ZortError::CapacityExceeded {
                bucket:     from,
                capacity:   self.buckets[from].capacity,
            })
    }

    /// Hands over the buckets, provided that everything was placed.
    fn finish(self) -> Result<Vec<Bucket>, ZortError> {
        let total = self.zummaries.len();
        if self.scheduled != total || self.zummaries.iter().any(|z| !z.scheduled) {
            return Err(ZortError::IncompleteScheduling {
                scheduled:  self.scheduled,
                total,
            });
        }
        debug_assert!(self.buckets.iter().map(|b| b.len()).sum::<usize>() == total);

        Ok(self.buckets)
    }
}
