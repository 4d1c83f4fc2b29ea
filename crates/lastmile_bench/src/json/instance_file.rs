use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use lastmile_routing::point::Point;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    generation::{error::GenerationError, instance_builder::InstanceBuilder},
    problem::instance::{HubSites, Instance},
};

/// On-disk instance. The order of `deliveries` is the arrival order.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
#[serde(rename = "Instance")]
pub struct InstanceFile {
    pub name: String,

    /// GeoJSON geometry of the region the deliveries were drawn from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<serde_json::Value>")]
    pub region: Option<geojson::Geometry>,

    pub capacity: f64,
    pub deliveries: Vec<DeliveryFile>,

    /// Single depot of a routing instance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Point>,

    /// Several fixed depots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hubs: Option<Vec<Point>>,

    /// Candidate sites of a hub placement instance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hub_candidates: Option<Vec<Point>>,
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
pub struct DeliveryFile {
    pub id: String,
    pub point: Point,
    pub size: f64,
}

impl TryFrom<InstanceFile> for Instance {
    type Error = GenerationError;

    fn try_from(file: InstanceFile) -> Result<Self, Self::Error> {
        let mut builder = InstanceBuilder::default();
        builder.set_name(file.name).set_capacity(file.capacity);

        if let Some(region) = file.region {
            builder.set_region(region);
        }

        for delivery in file.deliveries {
            builder.add_delivery(delivery.id, delivery.point, delivery.size);
        }

        // Candidates win so that a hub placement file stays one even if it
        // also lists the depots of a previous run
        match (file.hub_candidates, file.hubs, file.origin) {
            (Some(candidates), _, _) => builder.set_hub_candidates(candidates),
            (None, Some(hubs), _) => builder.set_depots(hubs),
            (None, None, Some(origin)) => builder.set_origin(origin),
            (None, None, None) => return Err(GenerationError::NoDepot),
        };

        builder.build()
    }
}

impl From<&Instance> for InstanceFile {
    fn from(instance: &Instance) -> Self {
        let (origin, hubs, hub_candidates) = match instance.hubs() {
            HubSites::Fixed(points) if points.len() == 1 => (Some(points[0]), None, None),
            HubSites::Fixed(points) => (None, Some(points.clone()), None),
            HubSites::Candidates(points) => (None, None, Some(points.clone())),
        };

        InstanceFile {
            name: instance.name().to_owned(),
            region: instance.region().cloned(),
            capacity: instance.capacity(),
            deliveries: instance
                .deliveries()
                .iter()
                .map(|delivery| DeliveryFile {
                    id: delivery.id().to_owned(),
                    point: *delivery.point(),
                    size: delivery.size(),
                })
                .collect(),
            origin,
            hubs,
            hub_candidates,
        }
    }
}

pub fn load_instance<P: AsRef<Path>>(path: P) -> Result<Instance, anyhow::Error> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open instance {}", path.display()))?;
    let instance_file: InstanceFile = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse instance {}", path.display()))?;

    Instance::try_from(instance_file)
        .with_context(|| format!("Invalid instance {}", path.display()))
}

pub fn save_instance<P: AsRef<Path>>(path: P, instance: &Instance) -> Result<(), anyhow::Error> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &InstanceFile::from(instance))?;
    writer.flush()?;

    Ok(())
}
