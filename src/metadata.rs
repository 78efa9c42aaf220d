//! Dependency declarations from core metadata (`METADATA` / `PKG-INFO`).

/// Header that introduces one dependency in a metadata file.
pub const REQUIRES_DIST: &str = "Requires-Dist:";

/// Line boundaries recognised in metadata text: `\n`, `\r` (alone or in
/// `\r\n`) and the other Unicode line and paragraph separators.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Collect the value of every `Requires-Dist:` line, in file order.
///
/// Matching is case-sensitive and per line: folded continuation lines and
/// any other header are skipped. Values are trimmed but otherwise untouched,
/// so environment markers and extras stay in the returned string.
pub fn parse_requires_dist(text: &str) -> Vec<String> {
    text.split(is_line_break)
        .filter_map(|line| line.strip_prefix(REQUIRES_DIST))
        .map(|value| value.trim().to_string())
        .collect()
}
