pub mod cache;
pub mod constants;
pub mod dijkstra;
pub mod edge_direction;
pub mod error;
pub mod graph;
pub mod location_index;
pub mod matrix;
pub mod oracle;
pub mod point;
pub mod road_network;
pub mod stopwatch;
pub mod weighting;

#[cfg(test)]
pub(crate) mod test_graph_utils;
