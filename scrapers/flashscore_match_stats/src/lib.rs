pub mod browser;
pub mod cleaning;
pub mod config;
pub mod error;
pub mod league;
pub mod links;
pub mod match_detail;
pub mod metrics;
pub mod pagination;
pub mod pipeline;
pub mod table;
pub mod training;
pub mod types;
pub mod utils;
pub mod worker_pool;
