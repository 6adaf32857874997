// Library for tests to access modules

pub mod config;
pub mod counter_repo;
pub mod counters;
pub mod models;
pub mod monitor;
pub mod routes;
pub mod version;
pub mod worker;
