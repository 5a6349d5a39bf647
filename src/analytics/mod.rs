pub mod activity;
pub mod aggregator;
pub mod dues;
pub mod forecast;
pub mod metrics;
pub mod rate;
