pub mod accounts;
pub mod aggregate;
pub mod feedback;
pub mod initialize;
pub mod log;
pub mod migrate;
pub mod pool;
pub mod queries;
pub mod stats;
pub mod store;
