//! Application module that shares a relative path with the crate's helper

use rust_log_context::Helper;

/// Log through `helper` and return the line of the log call
pub fn report(helper: &Helper) -> u32 {
    let line = line!() + 1;
    helper.info(&[&"from application code"]);
    line
}
