pub mod config;
pub mod geodata;
pub mod loader;
pub mod output;
pub mod workload;
