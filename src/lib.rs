// Library for tests to access modules

pub mod config;
pub mod error;
pub mod history_repo;
pub mod models;
pub mod routes;
pub mod sender;
pub mod signal;
pub mod sysinfo_repo;
pub mod telemetry;
pub mod version;
