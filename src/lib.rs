//! Star-schema retail analytics warehouse builder.
//!
//! Takes three staged relations (retail transactions, FX observations, UK
//! holidays), rebuilds dimension, fact, and aggregate tables in an embedded
//! SQLite store, and returns a structured report of counts and quality
//! findings. Source-file parsing, dashboards, and the CLI live elsewhere.

pub mod builders;
pub mod config;
pub mod model;
pub mod pipeline;
pub mod quality;
pub mod report;
pub mod schema;
pub mod staging;
pub mod store;

pub use config::WarehouseConfig;
pub use pipeline::run_pipeline;
pub use report::RunReport;
pub use store::Warehouse;
