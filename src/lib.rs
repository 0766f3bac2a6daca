pub mod bench;
pub mod compare;
pub mod config;
pub mod fetch;
pub mod geocode;
pub mod loader;
pub mod output;
pub mod rate_limit;
pub mod stats;
