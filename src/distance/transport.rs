//! Exact Transportation Solver
//!
//! Minimum-cost flow on the bipartite transportation graph, solved with
//! successive shortest augmenting paths (SPFA on the residual network).
//! Small/big phi are defined as minima over partitions, so the distances
//! they compare must be exact; an approximate mover would corrupt the
//! minimum-selection and tie-breaking contracts.
//!
//! All edge costs are non-negative, so successive shortest paths yields the
//! optimal flow without potentials.

use ndarray::Array2;

/// Residual capacities below this are treated as saturated
pub const FLOW_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone)]
struct Edge {
    to: usize,
    rev: usize,
    cap: f64,
    cost: f64,
}

#[derive(Debug)]
struct FlowNetwork {
    graph: Vec<Vec<Edge>>,
}

impl FlowNetwork {
    fn new(n_nodes: usize) -> Self {
        FlowNetwork {
            graph: vec![Vec::new(); n_nodes],
        }
    }

    fn add_edge(&mut self, from: usize, to: usize, cap: f64, cost: f64) {
        let rev_from = self.graph[to].len();
        let rev_to = self.graph[from].len();
        self.graph[from].push(Edge {
            to,
            rev: rev_from,
            cap,
            cost,
        });
        self.graph[to].push(Edge {
            to: from,
            rev: rev_to,
            cap: 0.0,
            cost: -cost,
        });
    }

    /// Shortest path by cost over residual edges (SPFA). Returns per-node
    /// distance and the (node, edge) predecessor pair.
    fn shortest_path(&self, source: usize) -> (Vec<f64>, Vec<Option<(usize, usize)>>) {
        let n = self.graph.len();
        let mut dist = vec![f64::INFINITY; n];
        let mut prev = vec![None; n];
        let mut in_queue = vec![false; n];
        let mut queue = std::collections::VecDeque::new();

        dist[source] = 0.0;
        queue.push_back(source);
        in_queue[source] = true;

        while let Some(u) = queue.pop_front() {
            in_queue[u] = false;
            for (e_idx, edge) in self.graph[u].iter().enumerate() {
                if edge.cap <= FLOW_TOLERANCE {
                    continue;
                }
                let candidate = dist[u] + edge.cost;
                if candidate < dist[edge.to] - FLOW_TOLERANCE {
                    dist[edge.to] = candidate;
                    prev[edge.to] = Some((u, e_idx));
                    if !in_queue[edge.to] {
                        queue.push_back(edge.to);
                        in_queue[edge.to] = true;
                    }
                }
            }
        }

        (dist, prev)
    }

    /// Push the maximum-cost-minimal flow from `source` to `sink`; returns
    /// the total transport cost.
    fn min_cost_flow(&mut self, source: usize, sink: usize) -> f64 {
        let mut total_cost = 0.0;
        loop {
            let (dist, prev) = self.shortest_path(source);
            if !dist[sink].is_finite() {
                break;
            }

            // Bottleneck capacity along the augmenting path
            let mut bottleneck = f64::INFINITY;
            let mut node = sink;
            while let Some((u, e_idx)) = prev[node] {
                bottleneck = bottleneck.min(self.graph[u][e_idx].cap);
                node = u;
            }
            if !bottleneck.is_finite() || bottleneck <= FLOW_TOLERANCE {
                break;
            }

            // Apply the augmentation
            let mut node = sink;
            while let Some((u, e_idx)) = prev[node] {
                let rev = self.graph[u][e_idx].rev;
                self.graph[u][e_idx].cap -= bottleneck;
                self.graph[node][rev].cap += bottleneck;
                node = u;
            }
            total_cost += bottleneck * dist[sink];
        }
        total_cost
    }
}

/// Exact minimum-cost transport between supply and demand masses.
///
/// `cost[[i, j]]` is the ground distance from supply node `i` to demand
/// node `j`; all costs must be non-negative. Supply and demand totals are
/// expected to balance (the callers pad with absorber nodes when they do
/// not); any residual imbalance below the flow tolerance is ignored.
pub fn min_cost_transport(cost: &Array2<f64>, supply: &[f64], demand: &[f64]) -> f64 {
    let (n_supply, n_demand) = cost.dim();
    assert_eq!(supply.len(), n_supply);
    assert_eq!(demand.len(), n_demand);

    let source = n_supply + n_demand;
    let sink = source + 1;
    let mut network = FlowNetwork::new(n_supply + n_demand + 2);

    for (i, &s) in supply.iter().enumerate() {
        if s > FLOW_TOLERANCE {
            network.add_edge(source, i, s, 0.0);
        }
    }
    for (j, &d) in demand.iter().enumerate() {
        if d > FLOW_TOLERANCE {
            network.add_edge(n_supply + j, sink, d, 0.0);
        }
    }
    for i in 0..n_supply {
        if supply[i] <= FLOW_TOLERANCE {
            continue;
        }
        for j in 0..n_demand {
            if demand[j] <= FLOW_TOLERANCE {
                continue;
            }
            network.add_edge(i, n_supply + j, f64::INFINITY, cost[[i, j]]);
        }
    }

    network.min_cost_flow(source, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_identical_masses_cost_zero() {
        let cost = array![[0.0, 1.0], [1.0, 0.0]];
        let mass = [0.3, 0.7];
        assert_eq!(min_cost_transport(&cost, &mass, &mass), 0.0);
    }

    #[test]
    fn test_simple_move() {
        // Move 0.25 of mass across unit distance
        let cost = array![[0.0, 1.0], [1.0, 0.0]];
        let value = min_cost_transport(&cost, &[0.5, 0.5], &[0.75, 0.25]);
        assert!((value - 0.25).abs() < 1e-10);
    }

    #[test]
    fn test_prefers_cheap_routes() {
        // Two suppliers, two consumers; the diagonal is cheap
        let cost = array![[1.0, 10.0], [10.0, 1.0]];
        let value = min_cost_transport(&cost, &[1.0, 1.0], &[1.0, 1.0]);
        assert!((value - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_rectangular_problem() {
        // Three supplies, two demands
        let cost = array![[0.0, 2.0], [1.0, 1.0], [2.0, 0.0]];
        let value = min_cost_transport(&cost, &[0.2, 0.3, 0.5], &[0.5, 0.5]);
        // 0.2 via row 0 (free), 0.5 via row 2 (free), 0.3 via row 1 (cost 1)
        assert!((value - 0.3).abs() < 1e-10);
    }
}
