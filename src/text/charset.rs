//! Output character sets and conversion from UTF-8.
//!
//! Conversion never fails: characters the target cannot represent become
//! `?`, and invalid UTF-8 in the input is decoded lossily first.

use encoding_rs::{EncoderResult, Encoding, UTF_8};
use log::warn;

/// Labels understood as plain 7-bit ASCII. `encoding_rs` maps these to
/// windows-1252, which would let non-ASCII bytes through.
const ASCII_LABELS: &[&str] = &["ascii", "us-ascii", "ansi_x3.4-1968", "iso646-us", "646"];

/// Chunk size for encoder output.
const ENCODE_CHUNK: usize = 4096;

/// A target character set for rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Ascii,
    Legacy(&'static Encoding),
}

impl Charset {
    /// Look up a charset by name, e.g. `UTF-8`, `latin1` or `koi8-r`.
    pub fn for_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if ASCII_LABELS.iter().any(|l| l.eq_ignore_ascii_case(label)) {
            return Some(Charset::Ascii);
        }

        let encoding = Encoding::for_label(label.as_bytes())?;
        if let Some(output) = output_substitute(encoding) {
            warn!(
                "Conversion to {} is not supported. Writing {} instead.",
                encoding.name(),
                output.name()
            );
        }
        if encoding.output_encoding() == UTF_8 {
            Some(Charset::Utf8)
        } else {
            Some(Charset::Legacy(encoding))
        }
    }

    /// The charset of the current locale, from `LC_ALL`, `LC_CTYPE` or
    /// `LANG`.
    pub fn from_env() -> Self {
        let locale = ["LC_ALL", "LC_CTYPE", "LANG"]
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.is_empty());
        Self::from_locale(locale.as_deref())
    }

    /// The charset named by a locale string such as `de_DE.UTF-8@euro`.
    ///
    /// An unset locale, `C` and `POSIX` mean ASCII. A locale without a
    /// codeset is assumed to be ISO-8859-1; an unknown codeset falls back to
    /// ASCII.
    pub fn from_locale(locale: Option<&str>) -> Self {
        let locale = match locale {
            None | Some("C") | Some("POSIX") => return Charset::Ascii,
            Some(locale) => locale,
        };

        let Some((_, codeset)) = locale.split_once('.') else {
            warn!("Could not detect console encoding. Assuming ISO-8859-1");
            return Charset::Legacy(encoding_rs::WINDOWS_1252);
        };
        let codeset = codeset.split('@').next().unwrap_or(codeset);

        Self::for_label(codeset).unwrap_or_else(|| {
            warn!("Conversion to {codeset} is not supported. Using us-ascii as fall-back.");
            Charset::Ascii
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Ascii => "US-ASCII",
            Charset::Legacy(encoding) => encoding.name(),
        }
    }

    /// Whether every character of `text` has a representation.
    pub fn can_encode(&self, text: &str) -> bool {
        match self {
            Charset::Utf8 => true,
            Charset::Ascii => text.is_ascii(),
            Charset::Legacy(encoding) => {
                let mut encoder = encoding.new_encoder();
                let capacity = encoder
                    .max_buffer_length_from_utf8_without_replacement(text.len())
                    .unwrap_or(text.len() * 4 + 16);
                let mut out = vec![0u8; capacity];
                let (result, _, _) =
                    encoder.encode_from_utf8_without_replacement(text, &mut out, true);
                result == EncoderResult::InputEmpty
            }
        }
    }

    /// Convert UTF-8 `text` into this charset.
    pub fn encode(&self, text: &[u8]) -> Vec<u8> {
        let text = String::from_utf8_lossy(text);
        match self {
            Charset::Utf8 => text.into_owned().into_bytes(),
            Charset::Ascii => text
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect(),
            Charset::Legacy(encoding) => encode_legacy(encoding, &text),
        }
    }
}

/// The encoding written in place of `encoding`, for encodings that
/// `encoding_rs` can only decode (UTF-16, replacement).
fn output_substitute(encoding: &'static Encoding) -> Option<&'static Encoding> {
    let output = encoding.output_encoding();
    (output != encoding).then_some(output)
}

fn encode_legacy(encoding: &'static Encoding, text: &str) -> Vec<u8> {
    let mut encoder = encoding.new_encoder();
    let mut out = Vec::with_capacity(text.len());
    let mut chunk = vec![0u8; ENCODE_CHUNK];
    let mut rest = text;

    loop {
        let (result, read, written) =
            encoder.encode_from_utf8_without_replacement(rest, &mut chunk, true);
        out.extend_from_slice(&chunk[..written]);
        rest = &rest[read..];

        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::OutputFull => {}
            EncoderResult::Unmappable(_) => out.push(b'?'),
        }
    }

    out
}
