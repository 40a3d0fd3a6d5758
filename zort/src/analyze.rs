use crate::helpe::*;

/// What running all buckets once costs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cost {
    /// Sum of bucket makespans.
    pub sum_real:       Seconds,
    pub core_seconds:   f64,
    pub core_hours:     f64,
    pub power_kwh:      f64,
    /// In whole currency units.
    pub cost:           f64,
}

impl Cost {
    /// Each bucket occupies `cores` cores for as long as its
    /// slowest member runs.
    pub fn new(sum_real: Seconds, cores: usize, watt_per_core: f64, cents_per_kwh: f64) -> Self {
        let core_seconds = cores as f64 * sum_real;
        let core_hours = core_seconds / 3600.0;
        let power_kwh = core_hours * watt_per_core / 1000.0;
        let cost = cents_per_kwh * power_kwh / 100.0;

        Self {
            sum_real,
            core_seconds,
            core_hours,
            power_kwh,
            cost,
        }
    }
}

/// Summary figures of a packed and scheduled [Suite].
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub entries:                    usize,
    pub tasks:                      usize,
    pub bucket_size:                usize,
    pub last_bucket_size:           usize,
    pub average_real:               Seconds,
    pub max_real:                   Seconds,
    pub max_bucket_memory:          MegaBytes,
    /// Relative to the memory available on a node.
    pub max_bucket_memory_percent:  f64,
    pub max_zummary_memory:         MegaBytes,
    /// Relative to [`max_bucket_memory`](Statistics::max_bucket_memory).
    pub max_zummary_memory_percent: f64,
    /// Buckets needing more memory than a node has.
    pub overfull_buckets:           usize,
    pub memory_limit_hits:          usize,
    pub nodes:                      usize,
    pub busy_nodes:                 usize,
    pub latency:                    Seconds,
    pub cost:                       Cost,
    pub currency:                   Currency,
}

/// Derives the [Statistics] of a run. Pure: the same
/// inputs always give bit-identical figures.
pub fn estimate(
    suite:      &Suite,
    packing:    &Packing,
    schedule:   &NodeSchedule,
    cfg:        &Config,
) -> Statistics {
    let (sum_real, max_real, max_bucket_memory, memory_limit_hits, overfull_buckets) = packing.buckets
        .iter()
        .fold((0.0, 0.0, 0.0, 0, 0), |(sum, max_r, max_m, hits, over), b| {
            (
                sum + b.real,
                f64::max(max_r, b.real),
                f64::max(max_m, b.memory),
                hits + b.memory_limit_hits,
                over + usize::from(b.memory > cfg.available_memory),
            )
        });
    let max_zummary_memory = suite.zummaries()
        .iter()
        .map(|z| z.memory)
        .fold(0.0, f64::max);
    let tasks = packing.tasks();
    let average_real = if tasks == 0 { 0.0 } else { sum_real / tasks as f64 };
    if overfull_buckets > 0 {
        warn!(
            "{overfull_buckets} buckets need more than the {:.0} MB available per node",
            cfg.available_memory
        );
    }

    Statistics {
        entries:                    suite.len(),
        tasks,
        bucket_size:                packing.bucket_size,
        last_bucket_size:           packing.last_bucket_size,
        average_real,
        max_real,
        max_bucket_memory,
        max_bucket_memory_percent:  percent(max_bucket_memory, cfg.available_memory),
        max_zummary_memory,
        max_zummary_memory_percent: percent(max_zummary_memory, max_bucket_memory),
        overfull_buckets,
        memory_limit_hits,
        nodes:                      cfg.nodes,
        busy_nodes:                 schedule.busy_nodes(),
        latency:                    schedule.latency,
        cost:                       Cost::new(sum_real, packing.bucket_size, cfg.watt_per_core, cfg.cents_per_kwh),
        currency:                   cfg.currency,
    }
}
