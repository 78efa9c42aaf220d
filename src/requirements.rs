//! Dependency declarations from pip `requirements.txt` files.

use std::str::Utf8Error;

/// Collect every requirement line, trimmed, in file order.
///
/// Lines are split on `\n` only. A line is skipped when it is blank or when
/// its first byte is `#`; the comment check runs before trimming, so an
/// indented `#` line is kept. Only kept lines are decoded, so a comment in a
/// legacy encoding does not fail the file. Options such as `-r other.txt`
/// come back verbatim like any other line.
pub fn parse_requirements(data: &[u8]) -> Result<Vec<String>, Utf8Error> {
    data.split(|&b| b == b'\n')
        .filter(|raw| !raw.trim_ascii().is_empty() && !raw.starts_with(b"#"))
        .map(|raw| std::str::from_utf8(raw).map(|line| line.trim().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("flask>=2.0\n\n# comment\nrequests\n", &["flask>=2.0", "requests"])]
    #[case("  numpy==1.26  \n\t\n", &["numpy==1.26"])]
    #[case("   # indented comment\nattrs\n", &["# indented comment", "attrs"])]
    #[case("-r base.txt\n--index-url https://example.org\n", &["-r base.txt", "--index-url https://example.org"])]
    #[case("django\r\ncelery\r\n", &["django", "celery"])]
    #[case("", &[])]
    fn parses_requirement_lines(#[case] text: &str, #[case] expected: &[&str]) {
        assert_eq!(parse_requirements(text.as_bytes()).unwrap(), expected);
    }

    #[test]
    fn skipped_comment_lines_are_not_decoded() {
        let data = b"# Jos\xe9\nflask\n";
        assert_eq!(parse_requirements(data).unwrap(), vec!["flask"]);
    }

    #[test]
    fn kept_lines_must_be_utf8() {
        assert!(parse_requirements(b"flask\ncaf\xe9\n").is_err());
    }
}
