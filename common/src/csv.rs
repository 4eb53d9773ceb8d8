//! Line-oriented CSV codec.
//!
//! `parse_line` tokenizes exactly one physical line. Quoted fields may contain
//! commas and `""` escapes, but a quoted field cannot span lines: callers split
//! the input on line breaks first, so multi-line quoted values are not
//! supported.

/// Splits one CSV line into its fields.
///
/// Always returns one token per comma-delimited position, so `"a,"` yields
/// `["a", ""]` and the empty line yields `[""]`. A `"` seen outside a quoted
/// section opens one, even in the middle of a field.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    cur.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                cur.push(ch);
            }
        } else {
            match ch {
                ',' => out.push(std::mem::take(&mut cur)),
                '"' => in_quotes = true,
                _ => cur.push(ch),
            }
        }
    }
    out.push(cur);
    out
}

/// Escapes one value for a CSV cell.
///
/// The value is wrapped in quotes, with inner quotes doubled, only when it
/// contains a quote, a comma, or a line break.
pub fn escape(value: &str) -> String {
    if value.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Escapes and joins a record with commas.
pub fn join_record<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| escape(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Splits text into non-empty logical lines, accepting `\n`, `\r\n` and `\r`.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    lines.push(&text[start..]);
    lines.into_iter().filter(|l| !l.is_empty()).collect()
}
