use std::{fmt::Display, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The three benchmark variants.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Task 1, full information capacitated routing from a fixed depot
    Cvrp,
    /// Task 2, deliveries assigned one at a time in arrival order
    Incremental,
    /// Task 3, hub placement shared by every instance, then routing
    HubPlacement,
}

impl Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TaskKind::Cvrp => "cvrp",
                TaskKind::Incremental => "incremental",
                TaskKind::HubPlacement => "hub_placement",
            }
        )
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "cvrp" | "task1" => Ok(TaskKind::Cvrp),
            "incremental" | "task2" => Ok(TaskKind::Incremental),
            "hub_placement" | "hub-placement" | "task3" => Ok(TaskKind::HubPlacement),
            _ => Err(format!("unknown task {}", value)),
        }
    }
}
