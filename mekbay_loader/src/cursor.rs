//! Sequential line cursor over a unit sheet.
//!
//! The sheet grammar only ever needs one line at a time plus a short,
//! bounded lookahead for the title block, so the cursor is an explicit
//! position over a pre-split line list with `peek`/`next` operations.

/// Comment marker; lines starting with this are skipped where noted.
pub const COMMENT: &str = "#";

/// Generator stamps are tool metadata and never part of the record.
pub const GENERATOR: &str = "generator:";

/// Cursor over the trimmed lines of one sheet.
pub struct LineCursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> LineCursor<'a> {
    pub fn new(input: &'a str) -> LineCursor<'a> {
        LineCursor {
            lines: input.lines().map(str::trim).collect(),
            pos: 0,
        }
    }

    /// Next line, trimmed, comments included. `None` at end of input.
    pub fn next_line(&mut self) -> Option<&'a str> {
        let line = self.lines.get(self.pos).copied();
        if line.is_some() {
            self.pos += 1;
        }
        line
    }

    /// Look at the next line without consuming it.
    pub fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    /// Next non-comment line, or an empty string at end of input.
    ///
    /// The empty-string fallback means a sheet truncated mid-lookahead
    /// surfaces later as a malformed-header failure rather than a distinct
    /// I/O error.
    pub fn next_ignoring_comments(&mut self) -> &'a str {
        while let Some(line) = self.next_line() {
            if !line.starts_with(COMMENT) {
                return line;
            }
        }
        ""
    }
}

/// Case-insensitive prefix test that tolerates multi-byte text.
pub(crate) fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len()).is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Chassis and model names captured by the title-block lookahead.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TitleBlock {
    pub chassis: String,
    pub model: String,
}

/// Read the lines that follow a `version:` directive.
///
/// The next non-comment line is either a generator stamp (discarded, the
/// chassis follows it) or the chassis itself; the line after that is the
/// model.
pub fn read_title_block(cursor: &mut LineCursor<'_>) -> TitleBlock {
    let first = cursor.next_ignoring_comments();
    let chassis = if starts_with_ignore_case(first, GENERATOR) {
        cursor.next_ignoring_comments()
    } else {
        first
    };
    let model = cursor.next_ignoring_comments();
    TitleBlock {
        chassis: chassis.to_string(),
        model: model.to_string(),
    }
}
