//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | CLI usage error (bad args)                           |
//! | 3    | Config file unreadable or invalid                    |
//! | 4    | Data source failure (tab missing, unreadable)        |
//! | 5    | No column matches the amount candidates              |
//! | 6    | Access denied (unknown login, role or manager)       |
//! | 7    | Valid request, but no rows for this caller           |

use planfact_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Config file cannot be read, parsed or validated.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// The data provider could not deliver a tab.
pub const EXIT_DATA_SOURCE: u8 = 4;

/// The view cannot be computed: amount or key column missing.
pub const EXIT_COLUMN_NOT_FOUND: u8 = 5;

/// Unknown login, role, or manager selection.
pub const EXIT_ACCESS_DENIED: u8 = 6;

/// Informational: the caller is known but has no rows yet.
pub const EXIT_NO_DATA: u8 = 7;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::DataSource { .. } => EXIT_DATA_SOURCE,
        ReconError::ColumnNotFound { .. } => EXIT_COLUMN_NOT_FOUND,
    }
}
