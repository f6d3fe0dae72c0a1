//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — the weekly cron job
//! branches on them.
//!
//! # Exit Code Ranges
//!
//! | Range | Domain    | Description                                    |
//! |-------|-----------|------------------------------------------------|
//! | 0     | Universal | Success, population fully reconciled           |
//! | 1     | Universal | General error (unspecified)                    |
//! | 2     | Universal | CLI usage error (owned by clap)                |
//! | 3-9   | sync      | Reconciliation run codes                       |

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed and nothing needs operator action.
pub const EXIT_SUCCESS: u8 = 0;

// =============================================================================
// Sync (3-9)
// =============================================================================

/// The run succeeded and produced action items (payment refreshes,
/// unmatched paying members, cancellations). Not a failure; this is the
/// signal the weekly workflow branches on.
pub const EXIT_SYNC_ACTIONABLE: u8 = 3;

/// Config failed to parse or validate.
pub const EXIT_SYNC_INVALID_CONFIG: u8 = 4;

/// Runtime error: unreadable input file, missing mapped column,
/// unwritable output.
pub const EXIT_SYNC_RUNTIME: u8 = 5;
