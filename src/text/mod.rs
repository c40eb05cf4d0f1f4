//! Rendering of OpenDocument text content as wrapped plain text.
//!
//! Rendering runs in three stages:
//!
//! 1. [`markup`]: an ordered battery of substitutions rewrites the XML in
//!    place, turning headings, paragraphs, whitespace elements and images
//!    into text and stripping everything else
//! 2. [`wrap`]: greedy word wrap with a two-space margin
//! 3. [`charset`]: conversion from UTF-8 into the output character set

mod charset;
mod lookalike;
mod markup;
mod wrap;

pub use charset::Charset;
pub use lookalike::{LOOK_ALIKES, LookAlike, SYMBOL_FONT, SubstMode};
pub use markup::{document_rules, format_document, underline};
pub use wrap::wrap;

use crate::buffer::GrowableBuffer;
use crate::error::Result;

/// Line width used when none is given.
pub const DEFAULT_WIDTH: usize = 65;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Which typographic characters become ASCII.
    pub subst: SubstMode,
    /// Character set of the rendered output.
    pub charset: Charset,
    /// Wrap width in characters, or `None` to leave lines alone.
    pub width: Option<usize>,
    /// Substitutions subject to `subst`.
    pub look_alikes: &'static [LookAlike],
    /// Substitutions applied regardless of `subst`.
    pub symbol_font: &'static [LookAlike],
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            subst: SubstMode::default(),
            charset: Charset::Utf8,
            width: Some(DEFAULT_WIDTH),
            look_alikes: LOOK_ALIKES,
            symbol_font: SYMBOL_FONT,
        }
    }
}

/// Render decoded `content.xml` into bytes in `opts.charset`.
pub fn render(mut xml: GrowableBuffer, opts: &FormatOptions) -> Result<Vec<u8>> {
    let substitutions = format_document(&mut xml, opts)?;
    log::debug!(
        "{substitutions} substitution(s), {} byte(s) of text",
        xml.len()
    );

    let text = wrap(xml.as_bytes(), opts.width);
    log::debug!("encoding output as {}", opts.charset.name());
    Ok(opts.charset.encode(text.as_bytes()))
}
