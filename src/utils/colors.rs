/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const BLUE: &str = "\x1b[34m";
pub const CYAN: &str = "\x1b[36m";

/// Worked-minutes color:
/// \>0 → reset
/// \<0 → red (malformed event stream)
/// 0 → grey
pub fn color_for_total(value: i64) -> &'static str {
    if value < 0 {
        RED
    } else if value == 0 {
        GREY
    } else {
        RESET
    }
}
