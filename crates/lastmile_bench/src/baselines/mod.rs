pub mod cluster;
pub mod greedy;
pub mod p_hub;
pub mod savings;
pub mod solver;
pub mod sweep;
pub mod task1;
