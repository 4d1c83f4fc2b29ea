use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Point;

#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct Delivery {
    id: String,
    point: Point,
    size: f64,

    /// Position in the arrival stream, also the index in the instance
    arrival_index: usize,
}

impl Delivery {
    pub fn new(id: impl Into<String>, point: Point, size: f64, arrival_index: usize) -> Self {
        Delivery {
            id: id.into(),
            point,
            size,
            arrival_index,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn point(&self) -> &Point {
        &self.point
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn arrival_index(&self) -> usize {
        self.arrival_index
    }

    pub(crate) fn set_point(&mut self, point: Point) {
        self.point = point;
    }

    pub(crate) fn set_arrival_index(&mut self, arrival_index: usize) {
        self.arrival_index = arrival_index;
    }
}
