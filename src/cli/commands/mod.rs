//! CLI command implementations.

mod catalog;
mod config;
mod doctor;
mod generate;
mod init;

pub use catalog::run_catalog;
pub use config::run_config;
pub use doctor::run_doctor;
pub use generate::run_generate;
pub use init::run_init;
