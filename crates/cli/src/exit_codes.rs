//! CLI Exit Code Registry
//!
//! Single source of truth for `registrum` exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                           |
//! |------|---------------------------------------------------|
//! | 0    | Success, no field carries conflicting values      |
//! | 1    | At least one field is contested                   |
//! | 2    | CLI usage error (bad args)                        |
//! | 3    | Runtime error (unreadable file, bad dataset)      |
//! | 4    | Invalid alias config                              |

/// Success - every field agrees (or has a single source).
pub const EXIT_SUCCESS: u8 = 0;

/// Reconciled, but at least one field has conflicting values to review.
/// Like `diff(1)`, exit 1 means "sources differ."
pub const EXIT_CONTESTED: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Runtime error - input, dataset or output file could not be read or written.
pub const EXIT_RUNTIME: u8 = 3;

/// Alias config failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 4;
