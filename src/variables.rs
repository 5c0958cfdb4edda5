/// Parse newline-delimited template variables.
///
/// Lines are trimmed and blank lines dropped; order is preserved.
pub fn parse_variables(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
