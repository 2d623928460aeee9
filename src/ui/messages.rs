//! User-facing status lines. Diagnostics go through `tracing` instead.

use crate::utils::colors::{BLUE, BOLD, GREEN, GREY, RESET, YELLOW};
use std::fmt;

const ICON_INFO: &str = "ℹ️";
const ICON_OK: &str = "✅";
const ICON_WARN: &str = "⚠️";

pub fn info<T: fmt::Display>(msg: T) {
    println!("{}{}{} {}{}", BLUE, BOLD, ICON_INFO, RESET, msg);
}

pub fn success<T: fmt::Display>(msg: T) {
    println!("{}{}{} {}{}", GREEN, BOLD, ICON_OK, RESET, msg);
}

pub fn warning<T: fmt::Display>(msg: T) {
    println!("{}{}{} {}{}", YELLOW, BOLD, ICON_WARN, RESET, msg);
}

/// Indented follow-up line under a status message.
pub fn detail<T: fmt::Display>(msg: T) {
    println!("   {}•{} {}", GREY, RESET, msg);
}
