pub mod dijkstra;

pub use dijkstra::{all_pairs_shortest_costs, shortest_costs};
