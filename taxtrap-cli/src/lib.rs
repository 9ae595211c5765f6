pub mod amount;
pub mod cli;
pub mod config;
pub mod csv_loader;
pub mod render;
