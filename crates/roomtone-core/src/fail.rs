//! Fatal diagnostics
//!
//! Setup and usage errors are not recoverable: partial operation would
//! corrupt the measurement. They print a `FAIL:` line to stderr and abort.

use std::fmt;

/// Prefix of every fatal diagnostic line
pub const FAIL_PREFIX: &str = "FAIL: ";

/// Format a fatal diagnostic line (without trailing newline)
pub fn diagnostic(args: fmt::Arguments<'_>) -> String {
    format!("{}{}", FAIL_PREFIX, args)
}

/// Print a fatal diagnostic and abort the process
#[cold]
pub fn fatal(args: fmt::Arguments<'_>) -> ! {
    eprintln!("{}", diagnostic(args));
    std::process::abort()
}

/// Print `FAIL: <message>` to stderr and abort
///
/// ```ignore
/// fail!("Failed to open file {}", path.display());
/// ```
#[macro_export]
macro_rules! fail {
    ($($arg:tt)*) => {
        $crate::fail::fatal(format_args!($($arg)*))
    };
}
