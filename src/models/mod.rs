pub mod account;
pub mod event_kind;
pub mod event_source;
pub mod feedback;
pub mod report_row;
pub mod session;
pub mod sleep_event;
