//! Process-wide logging setup shared by the binaries.

/// Log output format and subscriber initialization.
pub mod logging;

pub use logging::{LogFormat, ParseLogFormatError};

/// Initialize process-wide logging.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init(format: LogFormat) {
    logging::init(format);
}
