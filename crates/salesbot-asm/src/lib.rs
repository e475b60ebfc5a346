//! salesbot-asm: Coordinate table patching for robot assembly programs.
//!
//! [`table`] renders and splices the table in memory (sans-IO);
//! [`file`] applies a patch to a program on disk with all-or-nothing
//! replacement.

pub mod file;
pub mod table;

pub use file::{PatchFileError, PatchSummary, patch_file, read_program};
pub use table::{
    BEGIN_SENTINEL, END_SENTINEL, Patched, TABLE_HEADER, TableError, patch_table, render_table,
};
