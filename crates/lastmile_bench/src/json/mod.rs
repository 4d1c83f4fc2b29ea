pub mod instance_file;
pub mod schema;
pub mod solution_file;
