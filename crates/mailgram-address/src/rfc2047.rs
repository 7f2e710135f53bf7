//! RFC 2047 encoded-word decoding and encoding.
//!
//! An encoded word looks like `=?charset?encoding?text?=` where the encoding
//! is `Q` (quoted-printable-like) or `B` (base64). Decoding is a pure function
//! over a single token; the address parser is responsible for concatenating
//! adjacent encoded words and for keeping the raw text when decoding fails.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use encoding_rs::{Encoding, UTF_8};

use crate::options::ParserOptions;

/// Result of decoding a single encoded word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedWord {
    /// The decoded text.
    pub text: String,
    /// The charset label the word declared, lowercased.
    pub charset: String,
}

/// Decodes one `=?charset?encoding?text?=` token.
///
/// Returns `None` when the token is not a well-formed encoded word or its
/// payload cannot be decoded; the caller passes the raw text through
/// unchanged in that case. An unknown charset label falls back to
/// `options.fallback_charset`.
#[must_use]
pub fn decode_word(word: &str, options: &ParserOptions) -> Option<DecodedWord> {
    let inner = word.strip_prefix("=?")?.strip_suffix("?=")?;
    let mut parts = inner.splitn(3, '?');
    let charset_label = parts.next()?;
    let encoding = parts.next()?;
    let payload = parts.next()?;
    if charset_label.is_empty() || encoding.is_empty() {
        return None;
    }
    // RFC 2231 language suffix, e.g. "us-ascii*en".
    let charset_label = charset_label.split('*').next()?;

    let bytes = match encoding {
        "B" | "b" => STANDARD.decode(payload).ok()?,
        "Q" | "q" => decode_q(payload)?,
        _ => return None,
    };

    let fallback = Encoding::for_label(options.fallback_charset.as_bytes()).unwrap_or(UTF_8);
    let declared = Encoding::for_label(charset_label.trim().as_bytes()).unwrap_or(fallback);

    let (text, had_errors) = declared.decode_without_bom_handling(&bytes);
    let text = if had_errors {
        let (text, still_bad) = fallback.decode_without_bom_handling(&bytes);
        if still_bad {
            return None;
        }
        text.into_owned()
    } else {
        text.into_owned()
    };

    Some(DecodedWord {
        text,
        charset: charset_label.to_ascii_lowercase(),
    })
}

/// Encodes display-name text as a single B-encoded encoded word.
///
/// The text is encoded with the requested charset when possible; unknown
/// labels and unmappable characters fall back to UTF-8. The emitted label is
/// the caller's own label, not the canonical encoding name, so a label
/// remembered from a decoded word survives a decode/encode round trip
/// (`iso-8859-1` stays `iso-8859-1` instead of becoming `windows-1252`).
#[must_use]
pub fn encode_word(text: &str, charset: &str) -> String {
    let (bytes, label) = match Encoding::for_label(charset.as_bytes()) {
        Some(encoding) => {
            let (bytes, _, had_errors) = encoding.encode(text);
            if had_errors {
                let (bytes, _, _) = UTF_8.encode(text);
                (bytes, String::from("utf-8"))
            } else {
                (bytes, charset.to_ascii_lowercase())
            }
        }
        None => {
            let (bytes, _, _) = UTF_8.encode(text);
            (bytes, String::from("utf-8"))
        }
    };
    format!("=?{label}?B?{}?=", STANDARD.encode(&bytes))
}

/// Decodes the Q transfer encoding: `_` is a space, `=XX` is a hex-encoded
/// byte (either hex case accepted). Malformed escapes return `None`.
fn decode_q(text: &str) -> Option<Vec<u8>> {
    let bytes = text.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'_' => {
                decoded.push(b' ');
                i += 1;
            }
            b'=' => {
                let hex = bytes.get(i + 1..i + 3)?;
                let hex = std::str::from_utf8(hex).ok()?;
                decoded.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            byte => {
                decoded.push(byte);
                i += 1;
            }
        }
    }
    Some(decoded)
}
