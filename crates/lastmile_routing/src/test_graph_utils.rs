#[cfg(test)]
pub mod test_graph {
    use crate::road_network::{RoadEdge, RoadNetwork, RoadNetworkFile, RoadNode};

    pub enum RomaniaGraphCity {
        Arad = 1,
        Bucharest = 2,
        Craiova = 3,
        Dobreta = 4,
        Eforie = 5,
        Fagaras = 6,
        Giurgiu = 7,
        Hirsova = 8,
        Iasi = 9,
        Lugoj = 10,
        Mehadia = 11,
        Neamt = 12,
        Oradea = 13,
        Pitesti = 14,
        RimnicuVilcea = 15,
        Sibiu = 16,
        Timisoara = 17,
        Urziceni = 18,
        Vaslui = 19,
        Zerind = 20,
    }

    impl From<RomaniaGraphCity> for u64 {
        fn from(value: RomaniaGraphCity) -> Self {
            value as u64
        }
    }

    // https://user-images.githubusercontent.com/43790152/97784960-1a142580-1bc4-11eb-9070-39c03eb16df2.png
    fn get_romania_graph_edges() -> Vec<(RomaniaGraphCity, RomaniaGraphCity, f64)> {
        use RomaniaGraphCity::*;

        vec![
            (Oradea, Zerind, 71.0),
            (Oradea, Sibiu, 151.0),
            (Zerind, Arad, 75.0),
            (Arad, Sibiu, 140.0),
            (Arad, Timisoara, 118.0),
            (Timisoara, Lugoj, 111.0),
            (Lugoj, Mehadia, 70.0),
            (Mehadia, Dobreta, 75.0),
            (Dobreta, Craiova, 120.0),
            (Craiova, RimnicuVilcea, 146.0),
            (Craiova, Pitesti, 138.0),
            (RimnicuVilcea, Pitesti, 97.0),
            (RimnicuVilcea, Sibiu, 80.0),
            (Sibiu, Fagaras, 99.0),
            (Fagaras, Bucharest, 211.0),
            (Pitesti, Bucharest, 101.0),
            (Bucharest, Giurgiu, 90.0),
            (Bucharest, Urziceni, 85.0),
            (Urziceni, Hirsova, 98.0),
            (Hirsova, Eforie, 86.0),
            (Urziceni, Vaslui, 142.0),
            (Vaslui, Iasi, 92.0),
            (Iasi, Neamt, 87.0),
        ]
    }

    /// Nodes laid out on a line along the equator, 0.01 degree apart.
    pub fn line_nodes(ids: impl IntoIterator<Item = u64>) -> Vec<RoadNode> {
        ids.into_iter()
            .map(|id| RoadNode {
                id,
                lat: 0.0,
                lng: id as f64 * 0.01,
            })
            .collect()
    }

    pub fn edge(from: u64, to: u64, distance: f64) -> RoadEdge {
        RoadEdge {
            from,
            to,
            distance: Some(distance),
            oneway: false,
            speed_kmh: None,
        }
    }

    pub fn oneway_edge(from: u64, to: u64, distance: f64) -> RoadEdge {
        RoadEdge {
            oneway: true,
            ..edge(from, to, distance)
        }
    }

    pub fn create_network(nodes: Vec<RoadNode>, edges: Vec<RoadEdge>) -> RoadNetwork {
        RoadNetwork::from_network_file(RoadNetworkFile {
            default_speed_kmh: None,
            nodes,
            edges,
        })
        .unwrap()
    }

    /// Distances are in kilometers, stored as meters.
    pub fn create_romania_network() -> RoadNetwork {
        let edges = get_romania_graph_edges()
            .into_iter()
            .map(|(start, end, km)| edge(start.into(), end.into(), km * 1000.0))
            .collect();

        create_network(line_nodes(1..=20), edges)
    }

    /// 0 - 1 - 2 - 3 - 0 with unit edge lengths.
    pub fn create_cycle_network() -> RoadNetwork {
        create_network(
            line_nodes(0..4),
            vec![
                edge(0, 1, 1.0),
                edge(1, 2, 1.0),
                edge(2, 3, 1.0),
                edge(3, 0, 1.0),
            ],
        )
    }

    /// Two components: 0 - 1 and 2 - 3.
    pub fn create_disconnected_network() -> RoadNetwork {
        create_network(
            line_nodes(0..4),
            vec![edge(0, 1, 10.0), edge(2, 3, 10.0)],
        )
    }

    /// A one-way loop 0 -> 1 -> 2 -> 0 where going back costs a full loop.
    pub fn create_oneway_network() -> RoadNetwork {
        create_network(
            line_nodes(0..3),
            vec![
                oneway_edge(0, 1, 10.0),
                oneway_edge(1, 2, 10.0),
                oneway_edge(2, 0, 10.0),
            ],
        )
    }
}
