//! Coordinate table rendering and in-memory patching.
//!
//! The robot program carries a table of waypoints between two sentinel
//! comment lines:
//!
//! ```text
//! ;COORDINATE_TABLE_BEGIN
//! 	COORDINATE_TABLE:
//! 		DW 290 ; x
//! 		DW 580 ; y
//! 		DW 1 ; dest #1
//! ;COORDINATE_TABLE_END
//! ```
//!
//! Each waypoint occupies three `DW` lines: x, y and its identity number,
//! which the program uses as a destination index. Sentinels are matched
//! after trimming surrounding whitespace.
//!
//! The program is treated as opaque bytes. Lines are split with their
//! terminators attached, so every line outside the table is reproduced
//! byte for byte, including CRLF endings, a missing final newline and
//! text that is not UTF-8. This is a pure function with no I/O.

use std::fmt::Write;

use salesbot_route::Point;

/// Line opening the replaceable region.
pub const BEGIN_SENTINEL: &str = ";COORDINATE_TABLE_BEGIN";

/// Line closing the replaceable region.
pub const END_SENTINEL: &str = ";COORDINATE_TABLE_END";

/// Label emitted at the start of the table body.
pub const TABLE_HEADER: &str = "\tCOORDINATE_TABLE:";

/// Errors from a malformed or unpatchable program text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// No line matches the begin sentinel.
    #[error("begin sentinel `;COORDINATE_TABLE_BEGIN` not found")]
    MissingBeginSentinel,

    /// The begin sentinel was found but no end sentinel follows it.
    #[error("end sentinel `;COORDINATE_TABLE_END` not found after begin sentinel on line {begin_line}")]
    MissingEndSentinel {
        /// 1-based line number of the begin sentinel.
        begin_line: usize,
    },

    /// An end sentinel appears before any begin sentinel.
    #[error("end sentinel on line {line} appears before the begin sentinel")]
    EndBeforeBegin {
        /// 1-based line number of the stray end sentinel.
        line: usize,
    },

    /// A second begin sentinel appears, inside or after the table.
    #[error("second begin sentinel on line {line}; the table must appear exactly once")]
    DuplicateRegion {
        /// 1-based line number of the extra begin sentinel.
        line: usize,
    },

    /// The origin was passed as a table entry.
    #[error("the origin cannot be written as a table entry")]
    OriginEntry,
}

/// Result of patching a program text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patched {
    /// The complete new program.
    pub content: Vec<u8>,
    /// Number of old table body lines discarded.
    pub replaced_lines: usize,
    /// Number of waypoint entries written.
    pub entries: usize,
}

/// Render the table body: header line, then three lines per waypoint.
///
/// Every line, including the last, ends with `line_ending`.
#[must_use]
pub fn render_table(waypoints: &[Point], line_ending: &str) -> String {
    let mut out = String::new();
    let _ = write!(out, "{TABLE_HEADER}{line_ending}");
    for point in waypoints {
        let _ = write!(out, "\t\tDW {} ; x{line_ending}", point.x);
        let _ = write!(out, "\t\tDW {} ; y{line_ending}", point.y);
        let _ = write!(
            out,
            "\t\tDW {} ; dest #{}{line_ending}",
            point.number, point.number
        );
    }
    out
}

fn is_sentinel(line: &[u8], sentinel: &str) -> bool {
    line.trim_ascii() == sentinel.as_bytes()
}

/// Replace the table body in `source` with entries for `waypoints`.
///
/// Everything up to and including the begin sentinel, and everything
/// from the end sentinel on, is copied unchanged. New lines use the
/// begin sentinel's line ending.
///
/// # Errors
///
/// Returns a [`TableError`] if the sentinels are missing, out of order or
/// repeated, or if `waypoints` contains the origin. Nothing is produced
/// on error.
pub fn patch_table(source: &[u8], waypoints: &[Point]) -> Result<Patched, TableError> {
    if waypoints.iter().any(Point::is_origin) {
        return Err(TableError::OriginEntry);
    }

    let mut lines = source.split_inclusive(|&b| b == b'\n').enumerate();
    let mut content = Vec::with_capacity(source.len());

    // 1. Copy through the begin sentinel.
    let (begin_line, begin_text) = loop {
        let Some((idx, line)) = lines.next() else {
            return Err(TableError::MissingBeginSentinel);
        };
        if is_sentinel(line, END_SENTINEL) {
            return Err(TableError::EndBeforeBegin { line: idx + 1 });
        }
        content.extend_from_slice(line);
        if is_sentinel(line, BEGIN_SENTINEL) {
            break (idx + 1, line);
        }
    };

    let line_ending = if begin_text.ends_with(b"\r\n") {
        "\r\n"
    } else {
        if !begin_text.ends_with(b"\n") {
            content.push(b'\n');
        }
        "\n"
    };

    // 2. New table body.
    content.extend_from_slice(render_table(waypoints, line_ending).as_bytes());

    // 3. Skip the old body, keep the end sentinel.
    let mut replaced_lines = 0;
    loop {
        let Some((idx, line)) = lines.next() else {
            return Err(TableError::MissingEndSentinel { begin_line });
        };
        if is_sentinel(line, BEGIN_SENTINEL) {
            return Err(TableError::DuplicateRegion { line: idx + 1 });
        }
        if is_sentinel(line, END_SENTINEL) {
            content.extend_from_slice(line);
            break;
        }
        replaced_lines += 1;
    }

    // 4. Copy the remainder.
    for (idx, line) in lines {
        if is_sentinel(line, BEGIN_SENTINEL) {
            return Err(TableError::DuplicateRegion { line: idx + 1 });
        }
        content.extend_from_slice(line);
    }

    Ok(Patched {
        content,
        replaced_lines,
        entries: waypoints.len(),
    })
}
