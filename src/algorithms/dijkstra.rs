use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use crate::RouterId;
use crate::network::Topology;

#[derive(Debug)]
struct State {
    cost: f64,
    router: RouterId,
}

impl Eq for State {}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cost.total_cmp(&other.cost) == Ordering::Equal
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.router.cmp(&self.router))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest-path cost from `source` to every other reachable router over the
/// links currently in `topology`. The source itself is not included.
pub fn shortest_costs(topology: &Topology, source: RouterId) -> BTreeMap<RouterId, f64> {
    let mut distances: BTreeMap<RouterId, f64> = BTreeMap::new();
    let mut heap = BinaryHeap::new();

    if !topology.contains(source) {
        return distances;
    }

    distances.insert(source, 0.0);
    heap.push(State { cost: 0.0, router: source });

    while let Some(State { cost, router }) = heap.pop() {
        // Skip if we've already found a better path
        if cost > *distances.get(&router).unwrap_or(&f64::INFINITY) {
            continue;
        }

        for (neighbor, weight) in topology.neighbors(router) {
            let new_cost = cost + weight;
            if new_cost < *distances.get(&neighbor).unwrap_or(&f64::INFINITY) {
                distances.insert(neighbor, new_cost);
                heap.push(State { cost: new_cost, router: neighbor });
            }
        }
    }

    distances.remove(&source);
    distances
}

pub fn all_pairs_shortest_costs(topology: &Topology) -> BTreeMap<RouterId, BTreeMap<RouterId, f64>> {
    topology
        .routers()
        .iter()
        .map(|router| (router.id, shortest_costs(topology, router.id)))
        .collect()
}
