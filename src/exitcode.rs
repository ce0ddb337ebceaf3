//! Standard exit codes (BSD sysexits.h compatible)

/// Successful termination
pub const OK: i32 = 0;

/// User declined a confirmation prompt
pub const CANCELLED: i32 = 1;

/// Command line usage error
pub const USAGE: i32 = 64;

/// Data format error (duplicate name, malformed document)
pub const DATAERR: i32 = 65;

/// Input/output error
pub const IOERR: i32 = 74;

/// Temporary failure: document changed underneath us, retry
pub const TEMPFAIL: i32 = 75;

/// Configuration error
pub const CONFIG: i32 = 78;
