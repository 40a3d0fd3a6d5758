use crate::helpe::*;

/// A node of the cluster, as seen by list scheduling: it is
/// busy until [`end_time`](NodeSlot::end_time).
#[derive(Debug, Clone, Copy)]
pub struct NodeSlot {
    pub index:      usize,
    pub end_time:   Seconds,
}

// Free nodes are kept in a min-heap on their end times. Among
// equally free nodes the one with the lowest index comes first.
impl Ord for NodeSlot {
    fn cmp(&self, other: &Self) -> Ordering {
        // `BinaryHeap` is a max-priority queue, so
        // both comparisons are reversed.
        other.end_time
            .total_cmp(&self.end_time)
            .then(other.index.cmp(&self.index))
    }
}

impl PartialOrd for NodeSlot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for NodeSlot {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NodeSlot {}

/// A bucket which has been given a node and a time window on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledBucket {
    pub bucket: usize,
    pub node:   usize,
    pub start:  Seconds,
    pub end:    Seconds,
}

/// The outcome of list scheduling.
#[derive(Debug, Clone)]
pub struct NodeSchedule {
    /// In the order the buckets were handed out.
    pub assignments:    Vec<ScheduledBucket>,
    /// The same entries, indexed by bucket.
    pub by_bucket:      Vec<ScheduledBucket>,
    /// When each node becomes idle for good.
    pub node_ends:      Vec<Seconds>,
    /// When the last node becomes idle.
    pub latency:        Seconds,
}

impl NodeSchedule {
    /// Buckets run by `node`, in the order they run.
    pub fn on_node(&self, node: usize) -> impl Iterator<Item = &ScheduledBucket> + '_ {
        self.assignments
            .iter()
            .filter(move |s| s.node == node)
    }

    /// How many nodes received at least one bucket.
    pub fn busy_nodes(&self) -> usize {
        self.assignments
            .iter()
            .map(|s| s.node)
            .unique()
            .count()
    }
}

/// Greedy list scheduling of `buckets` on `nodes` identical nodes.
///
/// Buckets are handed out shortest makespan first; each one goes to
/// the node which becomes free the earliest.
pub fn schedule_nodes(buckets: &[Bucket], nodes: usize) -> Result<NodeSchedule, ZortError> {
    if nodes == 0 {
        return Err(ZortError::InvalidNodeCount(nodes));
    }

    let mut free: BinaryHeap<NodeSlot> = BinaryHeap::new();
    free.try_reserve_exact(nodes)
        .map_err(|source| ZortError::OutOfMemory { what: "allocating nodes", source })?;
    free.extend((0..nodes).map(|index| NodeSlot { index, end_time: 0.0 }));

    let mut assignments = try_with_capacity(buckets.len(), "allocating node schedule")?;
    let mut latency: Seconds = 0.0;
    for (bucket, b) in buckets.iter()
        .enumerate()
        .sorted_by(|(_, x), (_, y)| x.real.total_cmp(&y.real)) {
        // The heap is never empty: every popped slot is pushed back.
        let Some(mut slot) = free.pop() else { break; };
        let start = slot.end_time;
        let end = start + b.real;
        slot.end_time = end;
        if end > latency {
            latency = end;
        }
        trace!("bucket {bucket} runs on node {} from {start:.2} to {end:.2}", slot.index);
        assignments.push(ScheduledBucket {
            bucket,
            node: slot.index,
            start,
            end,
        });
        free.push(slot);
    }

    let mut node_ends = vec![0.0; nodes];
    for slot in free {
        node_ends[slot.index] = slot.end_time;
    }
    debug!("{} buckets on {nodes} nodes, latency {latency:.2}", buckets.len());
    let by_bucket = assignments.iter()
        .copied()
        .sorted_by_key(|s| s.bucket)
        .collect();

    Ok(NodeSchedule {
        assignments,
        by_bucket,
        node_ends,
        latency,
    })
}
