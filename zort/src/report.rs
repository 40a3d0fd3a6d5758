use crate::helpe::*;

/// One zummary entry as it appears in the report.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberReport {
    pub name:               String,
    pub real:               Seconds,
    pub memory:             MegaBytes,
    pub memory_limit_hit:   bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketReport {
    pub index:              usize,
    pub real:               Seconds,
    pub memory:             MegaBytes,
    pub memory_limit_hits:  usize,
    pub members:            Vec<MemberReport>,
    pub node:               usize,
    pub start:              Seconds,
    pub end:                Seconds,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeReport {
    pub index:      usize,
    /// In the order they run.
    pub buckets:    Vec<ScheduledBucket>,
    pub end:        Seconds,
}

/// Everything a run of `zort` has to say, ready for printing.
#[derive(Debug, Clone)]
pub struct Report {
    pub buckets:    Vec<BucketReport>,
    pub nodes:      Vec<NodeReport>,
    pub statistics: Statistics,
    reordered:      Vec<Benchmark>,
}

impl Report {
    pub fn assemble(
        suite:      &Suite,
        packing:    &Packing,
        schedule:   &NodeSchedule,
        statistics: Statistics,
    ) -> Self {
        debug_assert_eq!(packing.buckets.len(), schedule.by_bucket.len());
        let buckets = packing.buckets
            .iter()
            .zip(&schedule.by_bucket)
            .map(|(b, s)| {
                let members = b.members
                    .iter()
                    .map(|m| {
                        let z = suite.zummary(*m);
                        MemberReport {
                            name:               z.name.clone(),
                            real:               z.real,
                            memory:             z.memory,
                            memory_limit_hit:   z.memory_limit_hit,
                        }
                    })
                    .collect();

                BucketReport {
                    index:              s.bucket,
                    real:               b.real,
                    memory:             b.memory,
                    memory_limit_hits:  b.memory_limit_hits,
                    members,
                    node:               s.node,
                    start:              s.start,
                    end:                s.end,
                }
            })
            .collect();
        let nodes = schedule.node_ends
            .iter()
            .enumerate()
            .map(|(index, end)| NodeReport {
                index,
                buckets:    schedule.on_node(index).copied().collect(),
                end:        *end,
            })
            .collect();
        let reordered = packing.buckets
            .iter()
            .flat_map(|b| b.members.iter())
            .map(|m| suite.benchmark_of(*m).clone())
            .collect();

        Self {
            buckets,
            nodes,
            statistics,
            reordered,
        }
    }

    /// The benchmarks list in bucket order: bucket 0's members
    /// first, in the order they were put there.
    pub fn reordered_benchmarks(&self) -> &[Benchmark] {
        &self.reordered
    }
}

impl fmt::Display for MemberReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:10.2} s {:10.1} MB  {}", self.real, self.memory, self.name)?;
        if self.memory_limit_hit {
            write!(f, "  (memory limit)")?;
        }

        Ok(())
    }
}

impl fmt::Display for BucketReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bucket {:5}: real {:10.2} s  memory {:10.1} MB  hits {:3}  node {:4}  [{:.2} .. {:.2}]",
            self.index,
            self.real,
            self.memory,
            self.memory_limit_hits,
            self.node,
            self.start,
            self.end
        )?;
        // `{:#}` also lists the members.
        if f.alternate() {
            for m in &self.members {
                write!(f, "\n    {m}")?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Entries:\t\t{}", self.entries)?;
        writeln!(
            f,
            "Buckets:\t\t{} x {} (last {})",
            self.tasks,
            self.bucket_size,
            self.last_bucket_size
        )?;
        writeln!(f, "Average makespan:\t{:.2} s", self.average_real)?;
        writeln!(f, "Max makespan:\t\t{:.2} s", self.max_real)?;
        writeln!(
            f,
            "Max bucket memory:\t{:.1} MB ({:.2}% of available memory)",
            self.max_bucket_memory,
            self.max_bucket_memory_percent
        )?;
        writeln!(
            f,
            "Max entry memory:\t{:.1} MB ({:.2}% of max bucket memory)",
            self.max_zummary_memory,
            self.max_zummary_memory_percent
        )?;
        writeln!(f, "Overfull buckets:\t{}", self.overfull_buckets)?;
        writeln!(f, "Memory limit hits:\t{}", self.memory_limit_hits)?;
        writeln!(f, "Core hours:\t\t{:.2}", self.cost.core_hours)?;
        writeln!(f, "Power:\t\t\t{:.2} kWh", self.cost.power_kwh)?;
        writeln!(
            f,
            "Latency:\t\t{:.2} s ({:.2} h) on {} of {} nodes",
            self.latency,
            self.latency / 3600.0,
            self.busy_nodes,
            self.nodes
        )?;
        write!(f, "Cost:\t\t\t{} {:.2}", self.currency.sign(), self.cost.cost)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.buckets {
            if f.alternate() {
                writeln!(f, "{b:#}")?;
            } else {
                writeln!(f, "{b}")?;
            }
        }
        write!(f, "{}", self.statistics)
    }
}
