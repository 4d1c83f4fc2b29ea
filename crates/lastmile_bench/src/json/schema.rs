use lastmile_routing::road_network::RoadNetworkFile;
use schemars::schema_for;

use crate::{
    generation::{config::GenerationConfig, region::RegionFile},
    json::instance_file::InstanceFile,
    problem::solution::Solution,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Instance,
    Solution,
    Region,
    GenerationConfig,
    RoadNetwork,
}

pub fn generate_json_schema(kind: SchemaKind) -> Result<String, serde_json::Error> {
    let schema = match kind {
        SchemaKind::Instance => schema_for!(InstanceFile),
        SchemaKind::Solution => schema_for!(Solution),
        SchemaKind::Region => schema_for!(RegionFile),
        SchemaKind::GenerationConfig => schema_for!(GenerationConfig),
        SchemaKind::RoadNetwork => schema_for!(RoadNetworkFile),
    };

    serde_json::to_string_pretty(&schema)
}
