//! Parser for the finder's positional result encoding (`"<id>|<x>|<y>"`).
//!
//! Finder output is untrusted: anything that does not parse degrades to the
//! zero result instead of failing.

use crate::ProbeResult;

/// Field separator of the finder encoding.
pub const FIELD_SEPARATOR: char = '|';

/// Parse a raw finder result.
///
/// - `"id|x|y"` with both coordinates non-negative decimal integers yields a
///   found result.
/// - `"id|x"` (or `"id|x|<garbage>"`) yields a partial result: usable `x`,
///   `y = 0`, not found.
/// - Anything else yields [`ProbeResult::NONE`].
pub fn parse(raw: &str) -> ProbeResult {
    let fields: Vec<&str> = raw.split(FIELD_SEPARATOR).collect();

    if fields.len() >= 3 {
        if let (Some(x), Some(y)) = (parse_coord(fields[1]), parse_coord(fields[2])) {
            return ProbeResult::found(x, y);
        }
    }
    if fields.len() >= 2 {
        if let Some(x) = parse_coord(fields[1]) {
            return ProbeResult::partial(x);
        }
    }
    ProbeResult::NONE
}

/// Encode a coordinate the way finders do. Used by in-process finders.
pub fn encode(id: u32, x: i32, y: i32) -> String {
    format!("{id}{FIELD_SEPARATOR}{x}{FIELD_SEPARATOR}{y}")
}

/// ASCII digits only: no sign, no whitespace, no empty field.
fn parse_coord(field: &str) -> Option<i32> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}
