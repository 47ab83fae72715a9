//! Encoding heuristic for toolchain output
//!
//! The toolchain gives no signal about the encoding of its output, and the
//! sub-tools it drives can legitimately mix UTF-8 with a legacy double-byte
//! regional encoding (GBK) within one run. Decoding is applied per complete
//! line so the result never depends on where the OS happened to cut a read.
//!
//! The heuristic never fails and never drops bytes:
//! 1. Strict UTF-8 when the bytes are valid as-is.
//! 2. GBK, accepted only when the decoded text actually contains a CJK
//!    character (a cheap sanity check against accepting garbage).
//! 3. Lossy UTF-8 as the last resort, replacement markers and all.

use tracing::debug;

/// Decode one line of raw toolchain output
///
/// Returns the decoded text and whether the heuristic fallback was used
/// (non-fatal, surfaced to logs only).
pub fn decode_line(bytes: &[u8]) -> (String, bool) {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return (text.to_string(), false);
    }

    let (text, _, had_errors) = encoding_rs::GBK.decode(bytes);
    if !had_errors && text.chars().any(is_cjk) {
        debug!("decoded output line as GBK");
        return (text.into_owned(), true);
    }

    debug!("ambiguous output encoding, falling back to lossy UTF-8");
    (String::from_utf8_lossy(bytes).into_owned(), true)
}

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c)
}
