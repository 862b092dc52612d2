/// Primitive text utilities shared by the reader and the printers

/// Named character literals, `\newline` and friends
pub const CHARACTER_NAMES: [(&str, char); 4] = [
    ("newline", '\n'),
    ("return", '\r'),
    ("space", ' '),
    ("tab", '\t'),
];

/// Resolve the name after a backslash to its character
pub fn named_character(name: &str) -> Option<char> {
    if let Some(&(_, c)) = CHARACTER_NAMES.iter().find(|(n, _)| *n == name) {
        return Some(c);
    }
    let hex = name.strip_prefix('u')?;
    if hex.len() != 4 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

/// Format character literals so the reader accepts them back
pub fn format_character(c: char) -> String {
    match CHARACTER_NAMES.iter().find(|(_, named)| *named == c) {
        Some((name, _)) => format!("\\{}", name),
        None if (c as u32) <= 0xFFFF => format!("\\u{:04X}", c as u32),
        None => format!("\\{}", c),
    }
}

/// Shortest text that reads back as the same float; always has a `.` or exponent
pub fn format_float(f: f64) -> String {
    format!("{:?}", f)
}
