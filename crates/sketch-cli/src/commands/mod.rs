pub mod generate;
pub mod version;
pub mod workload;
