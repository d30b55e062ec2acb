//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3       | Universal        | Reading or writing a file failed         |
//! | 4       | Universal        | Input file could not be parsed           |
//! | 60-69   | assign           | Label assignment codes                   |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use abgrid_assign::AssignError;

// =============================================================================
// Universal (0-4)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// File could not be opened, read or written.
pub const EXIT_IO: u8 = 3;

/// Input file opened but its contents could not be parsed as a table.
pub const EXIT_PARSE: u8 = 4;

// =============================================================================
// Assign (60-69)
// =============================================================================

/// Config file failed to parse or validate.
pub const EXIT_ASSIGN_INVALID_CONFIG: u8 = 60;

/// A required column is missing from an input table. No output is written.
pub const EXIT_ASSIGN_MISSING_COLUMN: u8 = 61;

/// Assignment failed for any other reason (serializing the result, etc.).
pub const EXIT_ASSIGN_RUNTIME: u8 = 62;

/// Map an engine error to its exit code.
pub fn assign_exit_code(err: &AssignError) -> u8 {
    match err {
        AssignError::ConfigParse(_) | AssignError::ConfigValidation(_) => {
            EXIT_ASSIGN_INVALID_CONFIG
        }
        AssignError::MissingColumn { .. } => EXIT_ASSIGN_MISSING_COLUMN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_to_assign_range() {
        assert_eq!(assign_exit_code(&AssignError::ConfigParse("x".into())), 60);
        assert_eq!(assign_exit_code(&AssignError::ConfigValidation("x".into())), 60);
        assert_eq!(
            assign_exit_code(&AssignError::MissingColumn {
                table: "clusters".into(),
                column: "NUMERO CENTRO COSTO".into(),
            }),
            61
        );
    }

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_IO,
            EXIT_PARSE,
            EXIT_ASSIGN_INVALID_CONFIG,
            EXIT_ASSIGN_MISSING_COLUMN,
            EXIT_ASSIGN_RUNTIME,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }
}
