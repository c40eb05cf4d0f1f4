//! ASCII stand-ins for typographic characters.

use clap::ValueEnum;

use super::charset::Charset;

/// A character sequence and the ASCII text that replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookAlike {
    pub utf8: &'static str,
    pub ascii: &'static str,
}

const fn look_alike(utf8: &'static str, ascii: &'static str) -> LookAlike {
    LookAlike { utf8, ascii }
}

/// Typographic characters that have a well-known ASCII rendering.
pub static LOOK_ALIKES: &[LookAlike] = &[
    look_alike("\u{2018}", "`"),
    look_alike("\u{2019}", "'"),
    look_alike("\u{201C}", "``"),
    look_alike("\u{201D}", "''"),
    look_alike("\u{201E}", ",,"),
    look_alike("\u{2010}", "-"), // hyphen
    look_alike("\u{2011}", "-"), // non-breaking hyphen
    look_alike("\u{2012}", "-"), // figure dash
    look_alike("\u{2013}", "-"), // en dash
    look_alike("\u{2014}", "--"), // em dash
    look_alike("\u{2015}", "--"), // quotation dash
    look_alike("\u{2022}", "o"), // bullet
    look_alike("\u{2025}", ".."),
    look_alike("\u{2026}", "..."),
    look_alike("\u{2190}", "<-"),
    look_alike("\u{2192}", "->"),
    look_alike("\u{2194}", "<->"),
    look_alike("\u{20AC}", "EUR"),
];

/// Arrows from the Symbol font, which land in the private use area.
pub static SYMBOL_FONT: &[LookAlike] = &[
    look_alike("\u{F0AB}", "<->"),
    look_alike("\u{F0AC}", "<-"),
    look_alike("\u{F0AE}", "->"),
];

/// Which look-alikes get replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SubstMode {
    /// Leave every character alone.
    None,
    /// Only characters the output charset cannot represent.
    #[default]
    Some,
    /// Every character in the table.
    All,
}

/// Entries of `table` that should be replaced when writing in `charset`.
pub fn select<'t>(
    table: &'t [LookAlike],
    mode: SubstMode,
    charset: Charset,
) -> impl Iterator<Item = &'t LookAlike> {
    table.iter().filter(move |entry| match mode {
        SubstMode::None => false,
        SubstMode::Some => !charset.can_encode(entry.utf8),
        SubstMode::All => true,
    })
}
