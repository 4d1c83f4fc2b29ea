use std::{fs::File, io::BufReader, path::Path};

use anyhow::Context;
use geo::{BoundingRect, MultiPolygon, Rect, coord};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::error::GenerationError;

/// On-disk region: a GeoJSON boundary and the demand density over it.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone)]
#[serde(deny_unknown_fields, rename = "Region")]
pub struct RegionFile {
    pub name: String,

    /// GeoJSON Polygon or MultiPolygon
    #[schemars(with = "serde_json::Value")]
    pub boundary: geojson::Geometry,

    /// Density grid, a boundary without cells is sampled uniformly
    #[serde(default)]
    pub cells: Vec<DensityCellFile>,
}

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy)]
#[serde(deny_unknown_fields)]
pub struct DensityCellFile {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,

    /// Relative demand of the cell, for example its population
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DensityCell {
    pub bounds: Rect<f64>,
    pub weight: f64,
}

impl DensityCell {
    pub fn new(min_lat: f64, min_lng: f64, max_lat: f64, max_lng: f64, weight: f64) -> Self {
        DensityCell {
            bounds: Rect::new(
                coord! { x: min_lng, y: min_lat },
                coord! { x: max_lng, y: max_lat },
            ),
            weight,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Region {
    name: String,
    boundary: MultiPolygon<f64>,
    cells: Vec<DensityCell>,
}

impl Region {
    pub fn new(
        name: impl Into<String>,
        boundary: MultiPolygon<f64>,
        cells: Vec<DensityCell>,
    ) -> Result<Self, GenerationError> {
        let name = name.into();

        if let Some(cell) = cells
            .iter()
            .find(|cell| !cell.weight.is_finite() || cell.weight < 0.0)
        {
            return Err(GenerationError::InvalidRegion(format!(
                "cell weights must be non-negative, got {}",
                cell.weight
            )));
        }

        let cells = if cells.is_empty() {
            boundary
                .bounding_rect()
                .map(|bounds| vec![DensityCell { bounds, weight: 1.0 }])
                .unwrap_or_default()
        } else {
            cells
        };

        Ok(Region {
            name,
            boundary,
            cells,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open region {}", path.display()))?;
        let region_file: RegionFile = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse region {}", path.display()))?;

        Ok(Region::try_from(region_file)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn boundary(&self) -> &MultiPolygon<f64> {
        &self.boundary
    }

    pub fn cells(&self) -> &[DensityCell] {
        &self.cells
    }

    pub fn boundary_geojson(&self) -> geojson::Geometry {
        geojson::Geometry::new(geojson::Value::from(&self.boundary))
    }
}

impl TryFrom<RegionFile> for Region {
    type Error = GenerationError;

    fn try_from(file: RegionFile) -> Result<Self, Self::Error> {
        let geometry = geo_types::Geometry::<f64>::try_from(file.boundary)
            .map_err(|err| GenerationError::InvalidRegion(err.to_string()))?;

        let boundary = match geometry {
            geo_types::Geometry::Polygon(polygon) => MultiPolygon::new(vec![polygon]),
            geo_types::Geometry::MultiPolygon(multi_polygon) => multi_polygon,
            _ => {
                return Err(GenerationError::InvalidRegion(format!(
                    "boundary of {} must be a polygon",
                    file.name
                )));
            }
        };

        let cells = file
            .cells
            .iter()
            .map(|cell| {
                DensityCell::new(
                    cell.min_lat,
                    cell.min_lng,
                    cell.max_lat,
                    cell.max_lng,
                    cell.weight,
                )
            })
            .collect();

        Region::new(file.name, boundary, cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGION: &str = r#"{
        "name": "df-0",
        "boundary": {
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [0.1, 0.0], [0.1, 0.1], [0.0, 0.1], [0.0, 0.0]]]
        },
        "cells": [
            { "min_lat": 0.0, "min_lng": 0.0, "max_lat": 0.1, "max_lng": 0.05, "weight": 3.0 }
        ]
    }"#;

    #[test]
    fn test_parse_region_file() {
        let file: RegionFile = serde_json::from_str(REGION).unwrap();
        let region = Region::try_from(file).unwrap();

        assert_eq!(region.name(), "df-0");
        assert_eq!(region.boundary().0.len(), 1);
        assert_eq!(region.cells().len(), 1);
        assert_eq!(region.cells()[0].bounds.max().x, 0.05);
    }

    #[test]
    fn test_uniform_cell_without_density() {
        let mut file: RegionFile = serde_json::from_str(REGION).unwrap();
        file.cells.clear();

        let region = Region::try_from(file).unwrap();

        assert_eq!(region.cells().len(), 1);
        assert_eq!(region.cells()[0].weight, 1.0);
        assert_eq!(region.cells()[0].bounds.max().y, 0.1);
    }

    #[test]
    fn test_rejects_point_boundary() {
        let json = r#"{ "name": "p", "boundary": { "type": "Point", "coordinates": [0.0, 0.0] } }"#;
        let file: RegionFile = serde_json::from_str(json).unwrap();

        assert!(matches!(
            Region::try_from(file),
            Err(GenerationError::InvalidRegion(_))
        ));
    }

    #[test]
    fn test_rejects_negative_weight() {
        let mut file: RegionFile = serde_json::from_str(REGION).unwrap();
        file.cells[0].weight = -1.0;

        assert!(matches!(
            Region::try_from(file),
            Err(GenerationError::InvalidRegion(_))
        ));
    }
}
