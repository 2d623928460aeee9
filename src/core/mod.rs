pub mod account;
pub mod feedback;
pub mod log;
pub mod reconcile;
pub mod report;
pub mod session;
pub mod watchdog;
