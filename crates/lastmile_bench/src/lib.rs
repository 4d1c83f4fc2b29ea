pub mod baselines;
pub mod evaluation;
pub mod generation;
pub mod json;
pub mod problem;
pub mod simulation;

#[cfg(test)]
pub(crate) mod test_utils;
