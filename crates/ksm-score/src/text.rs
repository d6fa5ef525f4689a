/// Decode the raw bytes of a `.ksc` file.
///
/// UTF-8 (with or without BOM) is taken as-is; anything else is read as Shift_JIS,
/// which older KSM builds wrote.
pub fn decode_score_file(raw: &[u8]) -> String {
    if let Some(rest) = raw.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(rest).into_owned();
    }

    if let Ok(s) = std::str::from_utf8(raw) {
        return s.to_string();
    }

    let (decoded, _, _) = encoding_rs::SHIFT_JIS.decode(raw);
    decoded.into_owned()
}

/// Non-blank lines of a decoded score file, with line endings removed.
pub fn score_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(|l| l.trim_end_matches('\r'))
        .filter(|l| !l.trim().is_empty())
}
