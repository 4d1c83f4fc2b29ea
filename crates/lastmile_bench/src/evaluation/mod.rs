pub mod cost;
pub mod cvrp;
pub mod error;
pub mod evaluator;
pub mod hub_placement;
pub mod incremental;
pub mod validator;
