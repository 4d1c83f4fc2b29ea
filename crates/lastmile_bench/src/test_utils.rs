use std::sync::Arc;

use lastmile_routing::{
    oracle::{DistanceOracle, DistanceOracleParams},
    point::Point,
    road_network::{RoadEdge, RoadNetwork, RoadNetworkFile, RoadNode},
};

use crate::{generation::instance_builder::InstanceBuilder, problem::instance::Instance};

fn street(from: u64, to: u64, distance: f64) -> RoadEdge {
    RoadEdge {
        from,
        to,
        distance: Some(distance),
        oneway: false,
        speed_kmh: None,
    }
}

fn oracle(nodes: Vec<RoadNode>, edges: Vec<RoadEdge>) -> DistanceOracle {
    let network = RoadNetwork::from_network_file(RoadNetworkFile {
        default_speed_kmh: None,
        nodes,
        edges,
    })
    .unwrap();

    DistanceOracle::new(Arc::new(network), DistanceOracleParams::default())
}

/// Point sitting on node `id` of the line or cycle networks.
pub fn line_point(id: u64) -> Point {
    Point::on_node(0.0, id as f64 * 0.01, id)
}

/// 0 - 1 - 2 - 3 - 0 with unit edge lengths, nodes 0.01 degree apart on the equator.
pub fn cycle_oracle() -> DistanceOracle {
    let nodes = (0..4)
        .map(|id| RoadNode {
            id,
            lat: 0.0,
            lng: id as f64 * 0.01,
        })
        .collect();

    oracle(
        nodes,
        vec![
            street(0, 1, 1.0),
            street(1, 2, 1.0),
            street(2, 3, 1.0),
            street(3, 0, 1.0),
        ],
    )
}

pub const GRID_SIZE: u64 = 6;

/// Node id of a grid intersection.
pub fn grid_id(row: u64, col: u64) -> u64 {
    row * GRID_SIZE + col
}

pub fn grid_point(row: u64, col: u64) -> Point {
    Point::on_node(row as f64 * 0.001, col as f64 * 0.001, grid_id(row, col))
}

/// Square street grid with 100 meter blocks.
pub fn grid_oracle() -> DistanceOracle {
    let nodes = (0..GRID_SIZE)
        .flat_map(|row| {
            (0..GRID_SIZE).map(move |col| RoadNode {
                id: grid_id(row, col),
                lat: row as f64 * 0.001,
                lng: col as f64 * 0.001,
            })
        })
        .collect();

    let mut edges = vec![];
    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            if col + 1 < GRID_SIZE {
                edges.push(street(grid_id(row, col), grid_id(row, col + 1), 100.0));
            }
            if row + 1 < GRID_SIZE {
                edges.push(street(grid_id(row, col), grid_id(row + 1, col), 100.0));
            }
        }
    }

    oracle(nodes, edges)
}

/// Grid instance with a depot in the corner and one delivery per listed cell.
pub fn grid_instance(name: &str, cells: &[(u64, u64)], sizes: &[f64], capacity: f64) -> Instance {
    let mut builder = InstanceBuilder::default();
    builder
        .set_name(name)
        .set_capacity(capacity)
        .set_origin(grid_point(0, 0));

    for (index, (&(row, col), &size)) in cells.iter().zip(sizes).enumerate() {
        builder.add_delivery(format!("{}-{}", name, index), grid_point(row, col), size);
    }

    builder.build().unwrap()
}
