pub mod packing;
pub mod nodes;

use crate::{
    helpe::*,
    analyze::estimate,
};
use self::{
    packing::pack,
    nodes::schedule_nodes,
};

/// Plans the re-run of a benchmark suite.
///
/// `benchmarks` and `zummaries` are matched by name, the zummary entries
/// are packed into buckets of `cfg.bucket_size`, the buckets are list
/// scheduled onto `cfg.nodes` nodes, and the outcome is priced.
///
/// Every failure along the way is fatal: a partial plan is no plan,
/// so nothing but the error is returned.
pub fn zort(
    benchmarks: Vec<Benchmark>,
    zummaries:  Vec<Zummary>,
    cfg:        &Config,
) -> Result<Report, ZortError> {
    cfg.validate()?;
    // Measure total planning time.
    let total_start = Instant::now();

    let mut suite = crate::suite::init(benchmarks, zummaries)?;
    let packing = pack(&mut suite, cfg)?;
    let schedule = schedule_nodes(&packing.buckets, cfg.nodes)?;
    let statistics = estimate(&suite, &packing, &schedule, cfg);
    let report = Report::assemble(&suite, &packing, &schedule, statistics);

    info!("Total planning time: {} μs", total_start.elapsed().as_micros());

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bench(name: &str) -> Benchmark {
        Benchmark { order: 0, path: None, name: name.to_string() }
    }

    fn zummary(name: &str) -> Zummary {
        Zummary {
            name:               name.to_string(),
            status:             STATUS_SAT,
            time:               1.0,
            real:               1.0,
            memory:             1.0,
            limit:              Limit { time: 10.0, real: 10.0, memory: 10.0 },
            scheduled:          false,
            memory_limit_hit:   false,
        }
    }

    #[test]
    fn configuration_is_checked_first() {
        let cfg = Config { nodes: 0, ..Config::default() };
        // Would be a mismatch too, but the configuration wins.
        let err = zort(vec![bench("a")], vec![], &cfg).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn mismatch_aborts_the_run() {
        let err = zort(vec![bench("a")], vec![zummary("b")], &Config::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputMismatch);
    }

    #[test]
    fn identical_inputs_give_identical_reports() {
        let run = || {
            let names: Vec<String> = (0..200).map(|i| format!("b{i}")).collect();
            let zs = names.iter()
                .enumerate()
                .map(|(i, n)| Zummary {
                    real:   (i * 37 % 101) as f64,
                    memory: (i * 53 % 97) as f64 * 10.0,
                    status: [10, 20, 0][i % 3],
                    ..zummary(n)
                })
                .collect();
            let cfg = Config { bucket_size: 16, nodes: 3, ..Config::default() };
            zort(names.iter().map(|n| bench(n)).collect(), zs, &cfg).unwrap()
        };
        let (first, second) = (run(), run());
        assert_eq!(first.statistics, second.statistics);
        assert_eq!(first.buckets, second.buckets);
        assert_eq!(
            first.statistics.cost.core_hours.to_bits(),
            second.statistics.cost.core_hours.to_bits()
        );
    }
}
