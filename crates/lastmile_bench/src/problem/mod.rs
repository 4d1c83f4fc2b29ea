pub mod delivery;
pub mod instance;
pub mod solution;
pub mod task;

pub use lastmile_routing::point::Point;
