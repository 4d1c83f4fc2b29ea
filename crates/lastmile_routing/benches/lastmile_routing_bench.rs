use std::{hint::black_box, sync::Arc};

use criterion::{Criterion, criterion_group, criterion_main};

use lastmile_routing::{
    graph::Graph,
    oracle::{DistanceOracle, DistanceOracleParams},
    point::Point,
    road_network::{RoadEdge, RoadNetwork, RoadNetworkFile, RoadNode},
};

const GRID_SIZE: u64 = 60;

/// Square street grid with 100m blocks.
fn grid_network() -> RoadNetwork {
    let id = |row: u64, col: u64| row * GRID_SIZE + col;

    let nodes = (0..GRID_SIZE)
        .flat_map(|row| {
            (0..GRID_SIZE).map(move |col| RoadNode {
                id: id(row, col),
                lat: row as f64 * 0.0009,
                lng: col as f64 * 0.0009,
            })
        })
        .collect();

    let mut edges = vec![];
    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            let street = |to: u64| RoadEdge {
                from: id(row, col),
                to,
                distance: Some(100.0),
                oneway: false,
                speed_kmh: None,
            };

            if col + 1 < GRID_SIZE {
                edges.push(street(id(row, col + 1)));
            }
            if row + 1 < GRID_SIZE {
                edges.push(street(id(row + 1, col)));
            }
        }
    }

    RoadNetwork::from_network_file(RoadNetworkFile {
        default_speed_kmh: None,
        nodes,
        edges,
    })
    .expect("grid network is valid")
}

fn matrix_benchmark(c: &mut Criterion) {
    let network = Arc::new(grid_network());
    let points: Vec<Point> = (0..network.node_count())
        .step_by(37)
        .map(|node| network.node_point(node))
        .collect();

    c.bench_function("distance matrix", |b| {
        b.iter(|| {
            // Fresh oracle so every iteration runs the searches
            let oracle = DistanceOracle::new(network.clone(), DistanceOracleParams::default());
            black_box(oracle.matrix(&points).expect("grid is connected"))
        })
    });
}

criterion_group!(benches, matrix_benchmark);
criterion_main!(benches);
