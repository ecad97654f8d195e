pub mod cli;
pub mod utils;
pub mod workflow;
