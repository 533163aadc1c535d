//! Exit codes of the `ultrawide` binary. Part of the public contract.
//!
//! `collect` exits from inside the collector: 0 on completion (even when the
//! results file could not be written), 1 when the results could not be
//! converted to JSON.

pub const SUCCESS: i32 = 0;
pub const CONFIG_ERROR: i32 = 2; // Bad options, unreadable input, usage errors
