//! Byte-level helpers for generated text.
//!
//! Token pieces arrive as raw bytes and a multi-byte character may be split
//! across tokens, so output is accumulated as bytes and only turned into a
//! `String` once generation ends.

/// Convert raw generated bytes into a `String`, replacing every byte that does
/// not begin a well-formed UTF-8 sequence with `?`.
pub fn sanitize_utf8(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let len = match bytes[i] {
            b if b < 0x80 => 1,
            b if b & 0xE0 == 0xC0 => 2,
            b if b & 0xF0 == 0xE0 => 3,
            b if b & 0xF8 == 0xF0 => 4,
            _ => 0,
        };
        let valid = if len == 0 || i + len > bytes.len() {
            None
        } else {
            std::str::from_utf8(&bytes[i..i + len]).ok()
        };
        match valid {
            Some(s) => {
                out.push_str(s);
                i += len;
            }
            None => {
                out.push('?');
                i += 1;
            }
        }
    }
    out
}

/// Earliest byte offset at which any of `stop_words` occurs in `text`.
pub fn find_stop_word<S: AsRef<str>>(text: &[u8], stop_words: &[S]) -> Option<usize> {
    stop_words
        .iter()
        .map(AsRef::as_ref)
        .filter(|word| !word.is_empty())
        .filter_map(|word| find_bytes(text, word.as_bytes()))
        .min()
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
