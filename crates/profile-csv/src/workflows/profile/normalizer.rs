/// Collapses every line break (`\r\n`, `\n` or `\r`) into one space and trims the result
/// so multi-line text fits in a single CSV cell.
pub(crate) fn flatten_text(value: &str) -> String {
    let mut flattened = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                flattened.push(' ');
            }
            '\n' => flattened.push(' '),
            other => flattened.push(other),
        }
    }

    flattened.trim().to_string()
}

/// Splits a display name on single spaces into (first, rest).
pub(crate) fn split_name(full_name: &str) -> (String, String) {
    let mut tokens = full_name.split(' ');
    let first = tokens.next().unwrap_or_default().to_string();
    let rest = tokens.collect::<Vec<_>>().join(" ");
    (first, rest)
}

/// Synthetic organization id for an experience slot: the last four digits of
/// `1000 + index`.
pub(crate) fn slot_code(index: usize) -> String {
    let code = (1000 + index).to_string();
    code[code.len() - 4..].to_string()
}
