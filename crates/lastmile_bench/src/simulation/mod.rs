pub mod router;
pub mod simulator;

pub use crate::evaluation::incremental::{OpenRoute, Placement};
