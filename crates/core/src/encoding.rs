//! Character encoding detection for fetched pages.
//!
//! Source sites in the wild declare their encoding inconsistently: some in
//! the `Content-Type` header, some in a `<meta>` tag, some not at all. This
//! module inspects a bounded prefix of the raw body together with the
//! declared content type and picks an [`encoding_rs`] decoder, falling back
//! to UTF-8 when nothing can be determined.

use encoding_rs::{Encoding, UTF_8};

/// Maximum number of body bytes inspected when sniffing the encoding.
const SNIFF_LIMIT: usize = 1024;

/// Chooses a decoder for a page body.
///
/// Resolution order: byte-order mark, `charset` parameter of the declared
/// content type, `charset` declaration inside the sampled markup, UTF-8.
/// Only the first [`SNIFF_LIMIT`] bytes of `body` are inspected; the caller
/// decodes the full body from its actual start with the returned encoding.
pub fn resolve_encoding(body: &[u8], content_type: &str) -> &'static Encoding {
    let sample = &body[..body.len().min(SNIFF_LIMIT)];

    if let Some((encoding, _)) = Encoding::for_bom(sample) {
        return encoding;
    }
    if let Some(encoding) = header_charset(content_type) {
        return encoding;
    }
    if let Some(encoding) = meta_charset(sample) {
        return encoding;
    }
    UTF_8
}

/// Decodes a full page body using the encoding resolved from its prefix and
/// declared content type. Malformed sequences are replaced, never fatal.
pub fn decode_body(body: &[u8], content_type: &str) -> String {
    let encoding = resolve_encoding(body, content_type);
    let (text, _, _) = encoding.decode(body);
    text.into_owned()
}

/// Extracts the charset parameter from a MIME content-type string, e.g.
/// `text/html; charset=gb18030`.
fn header_charset(content_type: &str) -> Option<&'static Encoding> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Encoding::for_label(value.trim().trim_matches('"').as_bytes())
        } else {
            None
        }
    })
}

/// Scans the sampled markup for a `charset=` declaration, covering both
/// `<meta charset="...">` and the `http-equiv` content attribute form.
fn meta_charset(sample: &[u8]) -> Option<&'static Encoding> {
    let head = String::from_utf8_lossy(sample).to_ascii_lowercase();
    let position = head.find("charset=")?;
    let rest = &head[position + "charset=".len()..];
    let label: String = rest
        .trim_start_matches(['"', '\''])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    Encoding::for_label(label.as_bytes())
}
