pub mod config;
pub mod demand_sampler;
pub mod error;
pub mod instance_builder;
pub mod region;
