use crate::helpe::*;

pub const DEFAULT_BUCKET_SIZE: usize = 64;
pub const DEFAULT_FAST_BUCKET_FRACTION: u32 = 50;
pub const DEFAULT_FAST_BUCKET_MEMORY: MegaBytes = 8000.0;
pub const DEFAULT_NODES: usize = 32;
pub const DEFAULT_AVAILABLE_MEMORY: MegaBytes = 234000.0;
pub const DEFAULT_WATT_PER_CORE: f64 = 8.0;
pub const DEFAULT_CENTS_PER_KWH: f64 = 27.0;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum Currency {
    /// Report cost in euro
    #[default]
    Euro,
    /// Report cost in dollar
    Dollar,
}

impl Currency {
    pub fn sign(&self) -> &'static str {
        match self {
            Currency::Euro      => "€",
            Currency::Dollar    => "$",
        }
    }
}

/// The fully resolved set of options a `zort` run depends on.
///
/// The bucket size doubles as the number of cores of one
/// scheduler allocation when estimating cost.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub bucket_size:            usize,
    /// Percentage of buckets reserved for the fast lane.
    pub fast_bucket_fraction:   u32,
    /// Fast lane jobs must not use more memory than this.
    pub fast_bucket_memory:     MegaBytes,
    pub nodes:                  usize,
    /// Memory available on each node.
    pub available_memory:       MegaBytes,
    pub watt_per_core:          f64,
    pub cents_per_kwh:          f64,
    pub currency:               Currency,
    /// Skip sorting; buckets follow the benchmarks' file order.
    pub keep_order:             bool,
    /// Produce the reordered benchmarks list instead of statistics.
    pub generate:               bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket_size:            DEFAULT_BUCKET_SIZE,
            fast_bucket_fraction:   DEFAULT_FAST_BUCKET_FRACTION,
            fast_bucket_memory:     DEFAULT_FAST_BUCKET_MEMORY,
            nodes:                  DEFAULT_NODES,
            available_memory:       DEFAULT_AVAILABLE_MEMORY,
            watt_per_core:          DEFAULT_WATT_PER_CORE,
            cents_per_kwh:          DEFAULT_CENTS_PER_KWH,
            currency:               Currency::default(),
            keep_order:             false,
            generate:               false,
        }
    }
}

impl Config {
    /// Rejects every option outside its legal range. A
    /// successfully validated [Config] is safe to feed to
    /// the pipeline.
    pub fn validate(&self) -> Result<(), ZortError> {
        if self.bucket_size == 0 {
            return Err(ZortError::InvalidBucketSize(self.bucket_size));
        }
        if self.nodes == 0 {
            return Err(ZortError::InvalidNodeCount(self.nodes));
        }
        if self.fast_bucket_fraction > 100 {
            return Err(ZortError::InvalidFraction(self.fast_bucket_fraction));
        }
        for (what, value) in [
            ("fast bucket memory", self.fast_bucket_memory),
            ("available memory", self.available_memory),
            ("watt per core", self.watt_per_core),
            ("cents per kWh", self.cents_per_kwh),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ZortError::InvalidValue { what, value });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.bucket_size, 64);
        assert_eq!(cfg.nodes, 32);
        assert_eq!(cfg.currency.sign(), "€");
    }

    #[test]
    fn rejects_out_of_range_options() {
        let bad = [
            Config { bucket_size: 0, ..Config::default() },
            Config { nodes: 0, ..Config::default() },
            Config { fast_bucket_fraction: 101, ..Config::default() },
            Config { watt_per_core: -1.0, ..Config::default() },
            Config { available_memory: f64::NAN, ..Config::default() },
        ];
        for cfg in bad {
            assert_eq!(cfg.validate().unwrap_err().kind(), ErrorKind::Configuration);
        }
        let edge = Config { fast_bucket_fraction: 100, ..Config::default() };
        assert!(edge.validate().is_ok());
    }
}
